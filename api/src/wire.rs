//! Wire types for the fantasy API: serde shapes for requests and responses.
//! These map to the clean domain types in client.rs.
use crate::lineup::{LineupLogic, LineupSetting};
use crate::selection::SelectionLists;
use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Every endpoint answers `{"response_code": 200, "message": "", "data": {...}}`.
#[derive(Debug, Deserialize, Default)]
pub struct Envelope<T> {
    #[serde(default)]
    pub response_code: u16,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: T,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct FixturesRequest {
    pub sports_id: String,
    pub website_id: String,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct RosterRequest {
    pub season_game_uid: String,
    pub lineup_logic: LineupLogic,
    pub sports_id: String,
    pub website_id: String,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct SaveSelectionRequest {
    pub season_game_uid: String,
    pub website_id: String,
    pub sports_id: String,
    pub league_id: String,
    #[serde(flatten)]
    pub lists: SelectionLists,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct GenerateTeamsRequest {
    pub season_game_uid: String,
    pub website_id: String,
    pub sports_id: String,
    pub league_id: String,
    #[serde(flatten)]
    pub lists: SelectionLists,
    #[serde(flatten)]
    pub setting: LineupSetting,
}

// ---------------------------------------------------------------------------
// Lobby
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default)]
pub struct FixturesData {
    #[serde(default)]
    pub fixtures: Vec<WireFixture>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireFixture {
    #[serde(default, deserialize_with = "string_or_number")]
    pub season_game_uid: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub league_id: String,
    #[serde(default)]
    pub league_name: Option<String>,
    #[serde(default)]
    pub home: Option<String>,
    #[serde(default)]
    pub away: Option<String>,
    /// "2026-10-20 14:00:00", UTC
    #[serde(default)]
    pub season_scheduled_date: Option<String>,
    /// JSON object encoded as a string.
    #[serde(default)]
    pub toss_data: Option<String>,
    /// JSON object encoded as a string.
    #[serde(default)]
    pub score_data: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub playing_announce: String,
}

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default)]
pub struct RosterData {
    #[serde(default)]
    pub players: Vec<WirePlayer>,
    #[serde(default)]
    pub fixture_info: Option<WireFixture>,
    /// `{"p": [...], "l": [...], "e": [...]}` encoded as a string.
    #[serde(default)]
    pub selected_player: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WirePlayer {
    #[serde(deserialize_with = "string_or_number")]
    pub player_uid: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub team_abbr: Option<String>,
    #[serde(default)]
    pub child_position: Option<String>,
    #[serde(default, deserialize_with = "f64_or_string")]
    pub selected_percentage: f64,
    #[serde(default, deserialize_with = "f64_or_string")]
    pub salary: f64,
}

// ---------------------------------------------------------------------------
// Team generation
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default)]
pub struct GeneratedTeamsData {
    #[serde(default)]
    pub teams: Vec<WireTeam>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireTeam {
    #[serde(default)]
    pub team_no: u16,
    #[serde(default)]
    pub players: Vec<String>,
    #[serde(default)]
    pub c_id: Option<String>,
    #[serde(default)]
    pub vc_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Lenient scalars: the API sends ids and numbers both quoted and bare
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Str(String),
    Int(i64),
    Float(f64),
    Null,
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Scalar::deserialize(deserializer)? {
        Scalar::Str(s) => s,
        Scalar::Int(n) => n.to_string(),
        Scalar::Float(n) => n.to_string(),
        Scalar::Null => String::new(),
    })
}

/// Id list whose entries may be quoted or bare numbers. Nulls are skipped.
pub(crate) fn id_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let raw = Option::<Vec<Scalar>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .filter_map(|id| match id {
            Scalar::Str(s) => Some(s),
            Scalar::Int(n) => Some(n.to_string()),
            Scalar::Float(n) => Some(n.to_string()),
            Scalar::Null => None,
        })
        .collect())
}

fn f64_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(match Scalar::deserialize(deserializer)? {
        Scalar::Str(s) => s.trim().parse().unwrap_or_default(),
        Scalar::Int(n) => n as f64,
        Scalar::Float(n) => n,
        Scalar::Null => 0.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_accepts_quoted_and_bare_numbers() {
        let raw = r#"[
            {"player_uid": 101, "selected_percentage": "45.5", "salary": 9},
            {"player_uid": "102", "selected_percentage": 12.25, "salary": "8.5"},
            {"player_uid": "103", "selected_percentage": null}
        ]"#;
        let players: Vec<WirePlayer> = serde_json::from_str(raw).unwrap();
        assert_eq!(players[0].player_uid, "101");
        assert_eq!(players[0].selected_percentage, 45.5);
        assert_eq!(players[0].salary, 9.0);
        assert_eq!(players[1].salary, 8.5);
        assert_eq!(players[2].selected_percentage, 0.0);
    }

    #[test]
    fn save_request_flattens_lists() {
        let request = SaveSelectionRequest {
            season_game_uid: "g1".into(),
            website_id: "1".into(),
            sports_id: "7".into(),
            league_id: "3".into(),
            lists: SelectionLists {
                preferred_players: vec!["1".into()],
                locked_players: vec![],
                excluded_players: vec!["2".into()],
            },
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["season_game_uid"], "g1");
        assert_eq!(value["preferred_players"][0], "1");
        assert_eq!(value["excluded_players"][0], "2");
        assert!(value["locked_players"].as_array().unwrap().is_empty());
    }
}
