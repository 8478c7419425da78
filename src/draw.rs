use log::error;
use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Paragraph, Tabs, Wrap};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::{App, MenuItem};
use crate::components::match_card::{MatchCard, schedule_line};
use crate::components::tier_board::{TierBoard, player_row, tag_color};
use crate::state::network::{ERROR_CHAR, LoadingState};
use crate::ui::layout::LayoutAreas;
use fantasy_api::Tag;

static TABS: &[&str; 4] = &["Match", "Players", "Tiers", "Lineup"];

const HELP_TEXT: &str = "\
Global
  1-4      switch tab           ?      help (Esc to leave)
  w        full screen          \"      toggle logs
  q        quit

Match
  j/k      move                 Enter  open match
  r        refresh fixtures

Players
  j/k      move                 f      cycle filter
  p        toggle preferred     l      toggle locked
  x        toggle excluded      c      clear local changes
  r        reload roster

Lineup
  j/k      field                h/l    change value
  g/Enter  generate teams       J/K    scroll teams";

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let result = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
        }

        let main = draw_error_line(f, layout.main, app);
        match app.state.active_tab {
            MenuItem::Match => draw_match(f, main, app),
            MenuItem::Players => draw_players(f, main, app),
            MenuItem::Tiers => draw_tiers(f, main, app),
            MenuItem::Lineup => draw_lineup(f, main, app),
            MenuItem::Help => draw_help(f, main),
        }

        if let Some(logs) = layout.logs {
            draw_logs(f, logs);
        }

        draw_loading_spinner(f, f.area(), app, loading);
    });

    if let Err(e) = result {
        error!("draw failed: {e}");
    }
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let tab_index = match app.state.active_tab {
        MenuItem::Match => 0,
        MenuItem::Players => 1,
        MenuItem::Tiers => 2,
        MenuItem::Lineup => 3,
        MenuItem::Help => 0,
    };

    let titles: Vec<Line> = TABS.iter().map(|t| Line::from(*t)).collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let help = Paragraph::new("Help: ? ")
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

/// Reserve the last row for the current error, if any. Returns the remaining area.
fn draw_error_line(f: &mut Frame, area: Rect, app: &App) -> Rect {
    let Some(err) = app.state.last_error.as_deref() else {
        return area;
    };
    let [rest, line] = Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(area);
    f.render_widget(
        Paragraph::new(format!(" {err}")).style(Style::default().fg(Color::Red)),
        line,
    );
    rest
}

fn draw_match(f: &mut Frame, area: Rect, app: &App) {
    let [card_area, list_area] =
        Layout::vertical([Constraint::Length(7), Constraint::Fill(1)]).areas(area);

    let open = app.state.roster.fixture();
    let shown = open.or_else(|| app.state.fixtures.selected_fixture());

    let card = default_border(Color::White).title(" Match ");
    let inner = card.inner(card_area);
    f.render_widget(card, card_area);
    match shown {
        Some(fixture) => f.render_widget(
            MatchCard { fixture, now: app.state.clock.now, blink: app.state.clock.blink },
            inner,
        ),
        None => draw_centered_hint(f, inner, "Loading fixtures..."),
    }

    let block = default_border(Color::DarkGray).title(" Upcoming ");
    let inner = block.inner(list_area);
    f.render_widget(block, list_area);

    let fixtures = &app.state.fixtures.fixtures;
    if fixtures.is_empty() {
        draw_centered_hint(f, inner, "No fixtures. Press r to refresh.");
        return;
    }

    let open_uid = open.map(|o| o.season_game_uid.as_str());
    let window = visible_window(app.state.fixtures.selected, fixtures.len(), inner.height);
    let lines: Vec<Line> = fixtures[window.clone()]
        .iter()
        .zip(window)
        .map(|(fixture, idx)| {
            let cursor = if idx == app.state.fixtures.selected { ">" } else { " " };
            let marker = if Some(fixture.season_game_uid.as_str()) == open_uid { "*" } else { " " };
            let text = format!(
                "{cursor}{marker} {:<24} {}",
                fixture.title(),
                schedule_line(fixture, app.state.clock.now)
            );
            let style = if idx == app.state.fixtures.selected {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::from(Span::styled(text, style))
        })
        .collect();
    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_players(f: &mut Frame, area: Rect, app: &App) {
    let roster = &app.state.roster;
    let title = match roster.fixture() {
        Some(fixture) => format!(" Players · {} ", fixture.title()),
        None => " Players ".to_string(),
    };
    let block = default_border(Color::White).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    if roster.roster.is_none() {
        let hint = if roster.is_loading() { "Loading players..." } else { "Open a match on the Match tab" };
        draw_centered_hint(f, inner, hint);
        return;
    }

    let [header, list_area] =
        Layout::vertical([Constraint::Length(2), Constraint::Fill(1)]).areas(inner);

    let counts = roster.counts();
    let mut summary: Vec<Span> = vec![Span::styled(
        format!("Filter: {}  ", roster.filter.label()),
        Style::default().fg(Color::Gray),
    )];
    for tag in Tag::ALL {
        summary.push(Span::styled(
            format!("{} {}  ", tag.label(), counts.count(tag)),
            Style::default().fg(tag_color(Some(tag))),
        ));
    }
    summary.push(Span::styled(
        format!("merge: {}", roster.selection.policy().label()),
        Style::default().fg(Color::DarkGray),
    ));
    f.render_widget(Paragraph::new(Line::from(summary)), header);

    let players = roster.visible_players();
    if players.is_empty() {
        draw_centered_hint(f, list_area, "No players match this filter");
        return;
    }

    let window = visible_window(roster.selected, players.len(), list_area.height);
    let lines: Vec<Line> = players[window.clone()]
        .iter()
        .zip(window)
        .map(|(player, idx)| {
            let tag = roster.selection.tag(&player.player_uid);
            let cursor = if idx == roster.selected { "> " } else { "  " };
            let mut style = Style::default().fg(tag_color(tag));
            if idx == roster.selected {
                style = style.add_modifier(Modifier::BOLD | Modifier::REVERSED);
            }
            Line::from(Span::styled(format!("{cursor}{}", player_row(player, tag)), style))
        })
        .collect();
    f.render_widget(Paragraph::new(lines), list_area);
}

fn draw_tiers(f: &mut Frame, area: Rect, app: &App) {
    let roster = &app.state.roster;
    if roster.roster.is_none() {
        let block = default_border(Color::White).title(" Tiers ");
        let inner = block.inner(area);
        f.render_widget(block, area);
        draw_centered_hint(f, inner, "Open a match to see popularity tiers");
        return;
    }
    f.render_widget(TierBoard { tiers: &roster.tiers, selection: &roster.selection }, area);
}

fn draw_lineup(f: &mut Frame, area: Rect, app: &App) {
    let [form_area, teams_area] =
        Layout::horizontal([Constraint::Length(44), Constraint::Fill(1)]).areas(area);

    let lineup = &app.state.lineup;
    let block = default_border(Color::White).title(" Lineup setting ");
    let inner = block.inner(form_area);
    f.render_widget(block, form_area);

    let mut lines: Vec<Line> = lineup
        .fields()
        .into_iter()
        .map(|field| {
            let selected = field == lineup.field;
            let cursor = if selected { ">" } else { " " };
            let style = if selected {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(format!("{cursor} {:<18}", field.label()), style),
                Span::styled(format!("< {} >", lineup.value_label(field)), style.fg(Color::Cyan)),
            ])
        })
        .collect();
    lines.push(Line::from(""));
    match &lineup.validation {
        Some(problem) => lines.push(Line::from(Span::styled(
            problem.clone(),
            Style::default().fg(Color::Red),
        ))),
        None => lines.push(Line::from(Span::styled(
            "g to generate",
            Style::default().fg(Color::DarkGray),
        ))),
    }
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);

    let block = default_border(Color::DarkGray).title(format!(" Teams ({}) ", lineup.teams.len()));
    let inner = block.inner(teams_area);
    f.render_widget(block, teams_area);

    if lineup.teams.is_empty() {
        draw_centered_hint(f, inner, "No teams generated yet");
        return;
    }

    let roster = &app.state.roster;
    let mut lines = Vec::new();
    for team in &lineup.teams {
        lines.push(Line::from(Span::styled(
            format!("Team {}", team.team_no),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for uid in &team.players {
            let role = if team.captain.as_deref() == Some(uid.as_str()) {
                " (C)"
            } else if team.vice_captain.as_deref() == Some(uid.as_str()) {
                " (VC)"
            } else {
                ""
            };
            lines.push(Line::from(format!("  {}{role}", roster.player_name(uid))));
        }
        lines.push(Line::from(""));
    }
    f.render_widget(Paragraph::new(lines).scroll((lineup.scroll_offset, 0)), inner);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let block = default_border(Color::DarkGray).title(" Help ");
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(Paragraph::new(HELP_TEXT), inner);
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let logs = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Cyan))
        .style_debug(Style::default().fg(Color::Gray))
        .style_trace(Style::default().fg(Color::DarkGray));
    f.render_widget(logs, area);
}

fn draw_centered_hint(f: &mut Frame, area: Rect, msg: &str) {
    f.render_widget(
        Paragraph::new(msg)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center),
        area,
    );
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(11), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}

/// Rows to show so the cursor stays on screen.
fn visible_window(selected: usize, len: usize, height: u16) -> std::ops::Range<usize> {
    let height = (height as usize).max(1);
    let start = selected.saturating_sub(height - 1).min(len.saturating_sub(height));
    start..(start + height).min(len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_follows_the_cursor() {
        assert_eq!(visible_window(0, 30, 10), 0..10);
        assert_eq!(visible_window(9, 30, 10), 0..10);
        assert_eq!(visible_window(10, 30, 10), 1..11);
        assert_eq!(visible_window(29, 30, 10), 20..30);
        assert_eq!(visible_window(2, 5, 10), 0..5);
        assert_eq!(visible_window(0, 0, 10), 0..0);
    }
}
