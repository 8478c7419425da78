use crate::lineup::{LineupLogic, LineupSetting};
use crate::selection::{SelectionLists, ServerSelection};
use crate::wire::{
    Envelope, FixturesData, FixturesRequest, GenerateTeamsRequest, GeneratedTeamsData,
    RosterData, RosterRequest, SaveSelectionRequest, WireFixture, WirePlayer, WireTeam,
};
use crate::{Fixture, GeneratedTeam, Player, Position, Roster, ScoreSummary, Toss};
use chrono::{DateTime, NaiveDateTime, Utc};
use log::{debug, warn};
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

pub const DEFAULT_BASE_URL: &str = "https://api.fantasy-xi.example/v1";
/// Cricket in the fantasy API's sport table.
pub const CRICKET_SPORTS_ID: &str = "7";

const FIXTURES_PATH: &str = "/lobby/get_fixtures";
const ROSTER_PATH: &str = "/lineup/get_roster";
const SAVE_SELECTION_PATH: &str = "/lineup/save_player_selection";
const GENERATE_TEAMS_PATH: &str = "/lineup/generate_teams";
const RESPONSE_OK: u16 = 200;
const SCHEDULE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Static header pair the API expects on every call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub session_key: String,
    pub module_access: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub credentials: Credentials,
    pub website_id: String,
    pub sports_id: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            credentials: Credentials::default(),
            website_id: "1".to_string(),
            sports_id: CRICKET_SPORTS_ID.to_string(),
        }
    }
}

/// Fantasy API client: rosters, saved selections and team generation.
#[derive(Debug, Clone)]
pub struct FantasyApi {
    client: Client,
    config: ApiConfig,
    timeout: Duration,
}

impl Default for FantasyApi {
    fn default() -> Self {
        Self::new(ApiConfig::default())
    }
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Api(reqwest::Error, String),
    Parsing(reqwest::Error, String),
    /// The envelope came back with a non-200 `response_code`.
    Rejected { code: u16, message: String, url: String },
    NotFound(String),
    Other(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Api(e, url) => write!(f, "API error for {url}: {e}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::Rejected { code, message, url } => {
                write!(f, "Request rejected ({code}) for {url}: {message}")
            }
            ApiError::NotFound(msg) => write!(f, "Not found: {msg}"),
            ApiError::Other(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl FantasyApi {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: Client::builder()
                .user_agent("xitui/0.1 (terminal lineup builder)")
                .build()
                .unwrap_or_default(),
            config,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Upcoming fixtures in the lobby, soonest first.
    pub async fn fetch_fixtures(&self) -> ApiResult<Vec<Fixture>> {
        let request = FixturesRequest {
            sports_id: self.config.sports_id.clone(),
            website_id: self.config.website_id.clone(),
        };
        let data: FixturesData = self.post(FIXTURES_PATH, &request).await?;
        let mut fixtures: Vec<Fixture> = data.fixtures.into_iter().map(map_fixture).collect();
        fixtures.sort_by_key(|f| f.scheduled_at.unwrap_or(DateTime::<Utc>::MAX_UTC));
        Ok(fixtures)
    }

    /// Roster for one match together with the selection saved last time.
    pub async fn fetch_roster(
        &self,
        season_game_uid: &str,
        lineup_logic: LineupLogic,
    ) -> ApiResult<Roster> {
        let request = RosterRequest {
            season_game_uid: season_game_uid.to_owned(),
            lineup_logic,
            sports_id: self.config.sports_id.clone(),
            website_id: self.config.website_id.clone(),
        };
        let data: RosterData = self.post(ROSTER_PATH, &request).await?;
        if data.players.is_empty() && data.fixture_info.is_none() {
            return Err(ApiError::NotFound(format!("no roster for match {season_game_uid}")));
        }
        Ok(map_roster(season_game_uid, data))
    }

    /// Persist the resolved selection. The response body carries nothing we use.
    pub async fn save_selection(&self, fixture: &Fixture, lists: &SelectionLists) -> ApiResult<()> {
        let request = SaveSelectionRequest {
            season_game_uid: fixture.season_game_uid.clone(),
            website_id: self.config.website_id.clone(),
            sports_id: self.config.sports_id.clone(),
            league_id: fixture.league_id.clone(),
            lists: lists.clone(),
        };
        let _: serde_json::Value = self.post(SAVE_SELECTION_PATH, &request).await?;
        Ok(())
    }

    /// Ask the server to build teams from the selection and settings.
    pub async fn generate_teams(
        &self,
        fixture: &Fixture,
        lists: &SelectionLists,
        setting: &LineupSetting,
    ) -> ApiResult<Vec<GeneratedTeam>> {
        setting
            .validate()
            .map_err(|e| ApiError::Other(format!("invalid lineup setting: {e}")))?;
        let request = GenerateTeamsRequest {
            season_game_uid: fixture.season_game_uid.clone(),
            website_id: self.config.website_id.clone(),
            sports_id: self.config.sports_id.clone(),
            league_id: fixture.league_id.clone(),
            lists: lists.clone(),
            setting: *setting,
        };
        let data: GeneratedTeamsData = self.post(GENERATE_TEAMS_PATH, &request).await?;
        Ok(data.teams.into_iter().map(map_team).collect())
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: Default + DeserializeOwned,
    {
        let url = format!("{}{path}", self.config.base_url.trim_end_matches('/'));
        debug!("POST {url}");
        let response = self
            .client
            .post(&url)
            .header("sessionkey", &self.config.credentials.session_key)
            .header("moduleaccess", &self.config.credentials.module_access)
            .timeout(self.timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.clone()))?;

        let envelope = response
            .error_for_status()
            .map_err(|e| ApiError::Api(e, url.clone()))?
            .json::<Envelope<T>>()
            .await
            .map_err(|e| ApiError::Parsing(e, url.clone()))?;

        if envelope.response_code != RESPONSE_OK {
            return Err(ApiError::Rejected {
                code: envelope.response_code,
                message: envelope.message,
                url,
            });
        }
        Ok(envelope.data)
    }
}

// ---------------------------------------------------------------------------
// Mapping: wire types → clean domain types
// ---------------------------------------------------------------------------

fn map_roster(season_game_uid: &str, data: RosterData) -> Roster {
    let mut fixture = data.fixture_info.map(map_fixture).unwrap_or_default();
    if fixture.season_game_uid.is_empty() {
        fixture.season_game_uid = season_game_uid.to_owned();
    }

    let baseline = data
        .selected_player
        .as_deref()
        .map(|raw| parse_embedded::<ServerSelection>("selected_player", raw).unwrap_or_default())
        .unwrap_or_default();

    Roster {
        fixture,
        players: data.players.into_iter().map(map_player).collect(),
        baseline,
    }
}

fn map_player(p: WirePlayer) -> Player {
    let position = p
        .child_position
        .as_deref()
        .and_then(Position::parse)
        .unwrap_or_else(|| {
            debug!("player {} has no usable position, defaulting to BAT", p.player_uid);
            Position::default()
        });
    Player {
        full_name: p.full_name.unwrap_or_else(|| p.player_uid.clone()),
        player_uid: p.player_uid,
        team_abbr: p.team_abbr.unwrap_or_default(),
        position,
        selected_percentage: p.selected_percentage,
        salary: p.salary,
    }
}

fn map_fixture(f: WireFixture) -> Fixture {
    let toss = f
        .toss_data
        .as_deref()
        .and_then(|raw| parse_embedded::<Toss>("toss_data", raw))
        .filter(|t| !t.winner.is_empty());
    let score = f
        .score_data
        .as_deref()
        .and_then(|raw| parse_embedded::<ScoreSummary>("score_data", raw))
        .filter(|s| !s.innings.is_empty());

    Fixture {
        scheduled_at: f.season_scheduled_date.as_deref().and_then(parse_schedule),
        season_game_uid: f.season_game_uid,
        league_id: f.league_id,
        home: f.home.unwrap_or_else(|| "TBA".into()),
        away: f.away.unwrap_or_else(|| "TBA".into()),
        league_name: f.league_name.unwrap_or_default(),
        toss,
        score,
        playing_announced: f.playing_announce == "1",
    }
}

fn map_team(t: WireTeam) -> GeneratedTeam {
    GeneratedTeam {
        team_no: t.team_no,
        players: t.players,
        captain: t.c_id.filter(|id| !id.is_empty()),
        vice_captain: t.vc_id.filter(|id| !id.is_empty()),
    }
}

/// Several fields carry JSON encoded inside a string. A blank field means
/// "nothing yet"; a malformed one is logged and treated the same way.
fn parse_embedded<T: DeserializeOwned>(field: &str, raw: &str) -> Option<T> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "null" {
        return None;
    }
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("ignoring malformed {field}: {e}");
            None
        }
    }
}

fn parse_schedule(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw.trim(), SCHEDULE_FORMAT)
        .map(|naive| naive.and_utc())
        .or_else(|_| DateTime::parse_from_rfc3339(raw.trim()).map(|dt| dt.with_timezone(&Utc)))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tag;
    use chrono::TimeZone;
    use mockito::Matcher;
    use serde_json::json;

    fn api_for(server: &mockito::ServerGuard) -> FantasyApi {
        FantasyApi::new(ApiConfig {
            base_url: server.url(),
            credentials: Credentials {
                session_key: "s3cret".into(),
                module_access: "lineup".into(),
            },
            website_id: "1".into(),
            sports_id: "7".into(),
        })
    }

    fn fixture() -> Fixture {
        Fixture {
            season_game_uid: "g42".into(),
            league_id: "9".into(),
            ..Default::default()
        }
    }

    #[test]
    fn schedule_parses_api_and_rfc3339_formats() {
        let expected = Utc.with_ymd_and_hms(2026, 10, 20, 14, 0, 0).unwrap();
        assert_eq!(parse_schedule("2026-10-20 14:00:00"), Some(expected));
        assert_eq!(parse_schedule("2026-10-20T19:30:00+05:30"), Some(expected));
        assert_eq!(parse_schedule("tomorrow"), None);
    }

    #[test]
    fn malformed_embedded_json_falls_back() {
        let wire = WireFixture {
            season_game_uid: "g1".into(),
            toss_data: Some("{not json".into()),
            score_data: Some(String::new()),
            ..Default::default()
        };
        let fixture = map_fixture(wire);
        assert!(fixture.toss.is_none());
        assert!(fixture.score.is_none());
        assert_eq!(fixture.home, "TBA");

        let roster = map_roster(
            "g1",
            RosterData {
                selected_player: Some("[broken".into()),
                ..Default::default()
            },
        );
        assert!(roster.baseline.is_empty());
        assert_eq!(roster.fixture.season_game_uid, "g1");
    }

    #[test]
    fn toss_and_score_parse_from_embedded_strings() {
        let wire = WireFixture {
            home: Some("IND".into()),
            away: Some("AUS".into()),
            toss_data: Some(r#"{"winner":"AUS","decision":"field"}"#.into()),
            score_data: Some(r#"{"innings":[{"team_abbr":"AUS","runs":187,"wickets":4,"overs":"20.0"}]}"#.into()),
            playing_announce: "1".into(),
            ..Default::default()
        };
        let fixture = map_fixture(wire);
        assert_eq!(fixture.title(), "IND vs AUS");
        assert_eq!(
            fixture.toss.as_ref().map(Toss::summary).as_deref(),
            Some("AUS won the toss and chose to bowl")
        );
        assert_eq!(fixture.score.unwrap().innings[0].label(), "AUS 187/4 (20.0)");
        assert!(fixture.playing_announced);
    }

    #[tokio::test]
    async fn fetch_roster_sends_credentials_and_maps_baseline() {
        let mut server = mockito::Server::new_async().await;
        let body = json!({
            "response_code": 200,
            "data": {
                "players": [
                    {"player_uid": "1", "full_name": "A Batter", "team_abbr": "IND",
                     "child_position": "BAT", "selected_percentage": "71.2", "salary": 9.5},
                    {"player_uid": 2, "full_name": "A Keeper", "team_abbr": "AUS",
                     "child_position": "wk", "selected_percentage": 12, "salary": "8"}
                ],
                "fixture_info": {"season_game_uid": "g42", "league_id": 9,
                                 "home": "IND", "away": "AUS",
                                 "season_scheduled_date": "2026-10-20 14:00:00"},
                "selected_player": "{\"p\":[\"1\"],\"l\":[],\"e\":[\"2\"]}"
            }
        });
        let mock = server
            .mock("POST", ROSTER_PATH)
            .match_header("sessionkey", "s3cret")
            .match_header("moduleaccess", "lineup")
            .match_body(Matcher::PartialJson(json!({
                "season_game_uid": "g42",
                "lineup_logic": 3,
                "sports_id": "7",
                "website_id": "1"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await;

        let roster = api_for(&server)
            .fetch_roster("g42", LineupLogic::ChooseYourOwn)
            .await
            .expect("roster should load");
        mock.assert_async().await;

        assert_eq!(roster.players.len(), 2);
        assert_eq!(roster.players[0].selected_percentage, 71.2);
        assert_eq!(roster.players[1].player_uid, "2");
        assert_eq!(roster.players[1].position, Position::WicketKeeper);
        assert_eq!(roster.fixture.league_id, "9");
        assert!(roster.fixture.scheduled_at.is_some());
        assert_eq!(roster.baseline.tag_of("1"), Some(Tag::Preferred));
        assert_eq!(roster.baseline.tag_of("2"), Some(Tag::Excluded));
    }

    #[tokio::test]
    async fn save_selection_posts_resolved_lists() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", SAVE_SELECTION_PATH)
            .match_body(Matcher::PartialJson(json!({
                "season_game_uid": "g42",
                "league_id": "9",
                "locked_players": ["3"],
                "preferred_players": ["1", "2"],
                "excluded_players": []
            })))
            .with_status(200)
            .with_body(r#"{"response_code":200,"message":"saved","data":{}}"#)
            .create_async()
            .await;

        let lists = SelectionLists {
            preferred_players: vec!["1".into(), "2".into()],
            locked_players: vec!["3".into()],
            excluded_players: vec![],
        };
        api_for(&server)
            .save_selection(&fixture(), &lists)
            .await
            .expect("save should succeed");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_200_envelope_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", SAVE_SELECTION_PATH)
            .with_status(200)
            .with_body(r#"{"response_code":500,"message":"session expired"}"#)
            .create_async()
            .await;

        let err = api_for(&server)
            .save_selection(&fixture(), &SelectionLists::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Rejected { code: 500, .. }), "got {err}");
        assert!(err.to_string().contains("session expired"));
    }

    #[tokio::test]
    async fn http_error_status_maps_to_api_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", FIXTURES_PATH)
            .with_status(503)
            .create_async()
            .await;

        let err = api_for(&server).fetch_fixtures().await.unwrap_err();
        assert!(matches!(err, ApiError::Api(..)), "got {err}");
    }

    #[tokio::test]
    async fn fixtures_are_sorted_by_start_time() {
        let mut server = mockito::Server::new_async().await;
        let body = json!({
            "response_code": 200,
            "data": {"fixtures": [
                {"season_game_uid": "late", "season_scheduled_date": "2026-10-22 10:00:00"},
                {"season_game_uid": "unscheduled"},
                {"season_game_uid": "early", "season_scheduled_date": "2026-10-20 10:00:00"}
            ]}
        });
        let _mock = server
            .mock("POST", FIXTURES_PATH)
            .with_status(200)
            .with_body(body.to_string())
            .create_async()
            .await;

        let fixtures = api_for(&server).fetch_fixtures().await.unwrap();
        let ids: Vec<&str> = fixtures.iter().map(|f| f.season_game_uid.as_str()).collect();
        assert_eq!(ids, vec!["early", "late", "unscheduled"]);
    }

    #[tokio::test]
    async fn generate_teams_rejects_invalid_settings_before_sending() {
        let server = mockito::Server::new_async().await;
        let setting = LineupSetting { teams_count: 0, ..LineupSetting::new() };
        let err = api_for(&server)
            .generate_teams(&fixture(), &SelectionLists::default(), &setting)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Other(_)));
    }

    #[tokio::test]
    async fn generate_teams_maps_captains() {
        let mut server = mockito::Server::new_async().await;
        let body = json!({
            "response_code": 200,
            "data": {"teams": [
                {"team_no": 1, "players": ["1", "2"], "c_id": "1", "vc_id": ""}
            ]}
        });
        let mock = server
            .mock("POST", GENERATE_TEAMS_PATH)
            .match_body(Matcher::PartialJson(json!({"teams_count": 2, "active_index": 0, "distribution": 2})))
            .with_status(200)
            .with_body(body.to_string())
            .create_async()
            .await;

        let setting = LineupSetting { teams_count: 2, ..LineupSetting::new() };
        let teams = api_for(&server)
            .generate_teams(&fixture(), &SelectionLists::default(), &setting)
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].captain.as_deref(), Some("1"));
        assert_eq!(teams[0].vice_captain, None);
    }
}
