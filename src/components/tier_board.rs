use fantasy_api::tier::{Tier, Tiers};
use fantasy_api::{Player, SelectionState, Tag};
use tui::buffer::Buffer;
use tui::layout::{Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Paragraph, Widget};

pub fn tag_color(tag: Option<Tag>) -> Color {
    match tag {
        Some(Tag::Preferred) => Color::Green,
        Some(Tag::Locked) => Color::Yellow,
        Some(Tag::Excluded) => Color::Red,
        None => Color::White,
    }
}

/// `[P] Name  TEAM ROLE  72.4%`; untagged players get a blank badge.
pub fn player_row(player: &Player, tag: Option<Tag>) -> String {
    let badge = tag.map(|t| t.badge()).unwrap_or(' ');
    format!(
        "[{badge}] {}  {} {}  {:.1}%",
        player.full_name,
        player.team_abbr,
        player.position.abbrev(),
        player.selected_percentage
    )
}

/// Column heading with how many players in the tier carry each tag.
pub fn column_title(tier: Tier, tiers: &Tiers, selection: &SelectionState) -> String {
    let players = tiers.get(tier);
    let counts: Vec<String> = Tag::ALL
        .iter()
        .map(|tag| {
            let n = players
                .iter()
                .filter(|p| selection.tag(&p.player_uid) == Some(*tag))
                .count();
            format!("{}{n}", tag.badge())
        })
        .collect();
    format!(" {} {} · {} ", tier.label(), tier.range_label(), counts.join(" "))
}

/// Three popularity columns side by side.
pub struct TierBoard<'a> {
    pub tiers: &'a Tiers,
    pub selection: &'a SelectionState,
}

impl Widget for TierBoard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 12 || area.height < 3 {
            return;
        }

        let columns: [Rect; 3] = Layout::horizontal([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .areas(area);

        for (tier, column) in Tier::ALL.into_iter().zip(columns) {
            let block = Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(Span::styled(
                    column_title(tier, self.tiers, self.selection),
                    Style::default().add_modifier(Modifier::BOLD),
                ));

            let players = self.tiers.get(tier);
            let lines: Vec<Line> = if players.is_empty() {
                vec![Line::from(Span::styled("No players", Style::default().fg(Color::DarkGray)))]
            } else {
                players
                    .iter()
                    .map(|p| {
                        let tag = self.selection.tag(&p.player_uid);
                        Line::from(Span::styled(player_row(p, tag), Style::default().fg(tag_color(tag))))
                    })
                    .collect()
            };

            Paragraph::new(lines).block(block).render(column, buf);
        }
    }
}
