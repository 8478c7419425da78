use crate::state::network::LoadingState;
use crossterm::event::KeyEvent;
use fantasy_api::lineup::{LineupLogic, LineupSetting};
use fantasy_api::selection::SelectionLists;
use fantasy_api::{Fixture, GeneratedTeam, Roster};

#[derive(Debug, Clone)]
pub enum NetworkRequest {
    LoadFixtures,
    /// `generation` identifies the load; a later load supersedes it.
    LoadRoster {
        generation: u64,
        season_game_uid: String,
        lineup_logic: LineupLogic,
    },
    SaveSelection { fixture: Fixture, lists: SelectionLists },
    GenerateTeams {
        fixture: Fixture,
        lists: SelectionLists,
        setting: LineupSetting,
    },
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    FixturesLoaded { fixtures: Vec<Fixture> },
    RosterLoaded { generation: u64, roster: Roster },
    RosterFailed { generation: u64, message: String },
    TeamsGenerated { teams: Vec<GeneratedTeam> },
    Error { message: String },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
    /// Once a second from the ticker: countdown and announcement blink.
    Tick,
}
