use chrono::{DateTime, Utc};
use fantasy_api::Fixture;
use fantasy_api::countdown::countdown;
use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Paragraph, Widget, Wrap};

/// Kickoff line: schedule plus live countdown.
pub fn schedule_line(fixture: &Fixture, now: DateTime<Utc>) -> String {
    let Some(start) = fixture.scheduled_at else {
        return "Start time TBA".to_string();
    };
    let left = countdown(now, start);
    if left.is_started() {
        format!("{} · {}", start.format("%Y-%m-%d %H:%M UTC"), left.label())
    } else {
        format!("{} · starts in {}", start.format("%Y-%m-%d %H:%M UTC"), left.label())
    }
}

pub fn score_line(fixture: &Fixture) -> Option<String> {
    let score = fixture.score.as_ref().filter(|s| !s.innings.is_empty())?;
    Some(score.innings.iter().map(|i| i.label()).collect::<Vec<_>>().join("  |  "))
}

/// Header for the open match; `blink` alternates the lineup-announced marker.
pub struct MatchCard<'a> {
    pub fixture: &'a Fixture,
    pub now: DateTime<Utc>,
    pub blink: bool,
}

impl Widget for MatchCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let fixture = self.fixture;
        let mut title = vec![Span::styled(
            fixture.title(),
            Style::default().add_modifier(Modifier::BOLD),
        )];
        if !fixture.league_name.is_empty() {
            title.push(Span::styled(
                format!("  {}", fixture.league_name),
                Style::default().fg(Color::DarkGray),
            ));
        }

        let mut lines = vec![
            Line::from(title),
            Line::from(Span::styled(
                schedule_line(fixture, self.now),
                Style::default().fg(Color::Cyan),
            )),
        ];

        if let Some(toss) = &fixture.toss {
            lines.push(Line::from(toss.summary()));
        }
        if let Some(score) = score_line(fixture) {
            lines.push(Line::from(Span::styled(score, Style::default().fg(Color::Yellow))));
        }
        if fixture.playing_announced {
            let (marker, color) = if self.blink { ('●', Color::Green) } else { ('○', Color::DarkGray) };
            lines.push(Line::from(vec![
                Span::styled(format!("{marker} "), Style::default().fg(color)),
                Span::raw("Lineups announced"),
            ]));
        }

        Paragraph::new(lines).wrap(Wrap { trim: true }).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use fantasy_api::{InningsScore, ScoreSummary};

    fn kickoff() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 20, 14, 0, 0).unwrap()
    }

    fn fixture() -> Fixture {
        Fixture {
            season_game_uid: "8812".into(),
            home: "AUS".into(),
            away: "IND".into(),
            scheduled_at: Some(kickoff()),
            ..Default::default()
        }
    }

    #[test]
    fn schedule_counts_down_then_reports_start() {
        let f = fixture();
        assert_eq!(
            schedule_line(&f, kickoff() - Duration::seconds(90)),
            "2026-10-20 14:00 UTC · starts in 00:01:30"
        );
        assert_eq!(schedule_line(&f, kickoff()), "2026-10-20 14:00 UTC · Match started");
        assert_eq!(
            schedule_line(&Fixture::default(), kickoff()),
            "Start time TBA"
        );
    }

    #[test]
    fn score_line_joins_innings() {
        let mut f = fixture();
        assert!(score_line(&f).is_none());
        f.score = Some(ScoreSummary {
            innings: vec![
                InningsScore { team_abbr: "AUS".into(), runs: 187, wickets: 4, overs: "20.0".into() },
                InningsScore { team_abbr: "IND".into(), runs: 40, wickets: 1, overs: "5.2".into() },
            ],
        });
        assert_eq!(score_line(&f).as_deref(), Some("AUS 187/4 (20.0)  |  IND 40/1 (5.2)"));
    }
}
