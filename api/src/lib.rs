pub mod client;
pub mod countdown;
pub mod lineup;
pub mod selection;
pub mod tier;
pub mod wire;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use selection::{MergePolicy, SelectionState, ServerSelection, Tag};

// ---------------------------------------------------------------------------
// Domain types: clean model, independent of the fantasy API wire format
// ---------------------------------------------------------------------------

/// Playing role as reported by the roster endpoint (`child_position`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "WK")]
    WicketKeeper,
    #[default]
    #[serde(rename = "BAT")]
    Batter,
    #[serde(rename = "AR")]
    AllRounder,
    #[serde(rename = "BOW")]
    Bowler,
}

impl Position {
    pub fn abbrev(&self) -> &'static str {
        match self {
            Position::WicketKeeper => "WK",
            Position::Batter => "BAT",
            Position::AllRounder => "AR",
            Position::Bowler => "BOW",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "WK" => Some(Position::WicketKeeper),
            "BAT" => Some(Position::Batter),
            "AR" => Some(Position::AllRounder),
            "BOW" => Some(Position::Bowler),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Player {
    pub player_uid: String,
    pub full_name: String,
    pub team_abbr: String,
    pub position: Position,
    /// Share of users who picked this player, in percent. Not clamped to 100.
    pub selected_percentage: f64,
    pub salary: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fixture {
    pub season_game_uid: String,
    pub league_id: String,
    pub home: String,
    pub away: String,
    pub league_name: String,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub toss: Option<Toss>,
    pub score: Option<ScoreSummary>,
    /// Lineups have been announced by the teams.
    pub playing_announced: bool,
}

impl Fixture {
    pub fn title(&self) -> String {
        format!("{} vs {}", self.home, self.away)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Toss {
    #[serde(default)]
    pub winner: String,
    /// "bat" or "bowl"
    #[serde(default)]
    pub decision: String,
}

impl Toss {
    pub fn summary(&self) -> String {
        let decision = match self.decision.to_ascii_lowercase().as_str() {
            "bat" | "batting" => "bat",
            "bowl" | "field" | "bowling" | "fielding" => "bowl",
            _ => return format!("{} won the toss", self.winner),
        };
        format!("{} won the toss and chose to {decision}", self.winner)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ScoreSummary {
    #[serde(default)]
    pub innings: Vec<InningsScore>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct InningsScore {
    #[serde(default)]
    pub team_abbr: String,
    #[serde(default)]
    pub runs: u16,
    #[serde(default)]
    pub wickets: u8,
    #[serde(default)]
    pub overs: String,
}

impl InningsScore {
    pub fn label(&self) -> String {
        format!("{} {}/{} ({})", self.team_abbr, self.runs, self.wickets, self.overs)
    }
}

/// Everything the lineup screens need for one match.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    pub fixture: Fixture,
    pub players: Vec<Player>,
    pub baseline: ServerSelection,
}

impl Roster {
    pub fn find_player(&self, player_uid: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.player_uid == player_uid)
    }
}

/// One team returned by the server-side generator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedTeam {
    pub team_no: u16,
    pub players: Vec<String>,
    pub captain: Option<String>,
    pub vice_captain: Option<String>,
}
