use crate::state::app_settings::AppSettings;
use crate::state::app_state::AppState;
use crate::state::messages::NetworkRequest;
use chrono::{DateTime, Utc};
use fantasy_api::{Fixture, GeneratedTeam, Roster, Tag};
use log::{debug, error};

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Match,
    Players,
    Tiers,
    Lineup,
    Help,
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
}

impl App {
    pub fn new(settings: AppSettings) -> Self {
        let app = Self {
            state: AppState::new(settings.merge_policy),
            settings,
        };

        if let Some(level) = app.settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }

        app
    }

    // -----------------------------------------------------------------------
    // Network response handlers: called from main_ui_loop
    // -----------------------------------------------------------------------

    /// Returns the roster load to start when no match is open yet.
    pub fn on_fixtures_loaded(&mut self, fixtures: Vec<Fixture>) -> Option<NetworkRequest> {
        self.state.fixtures.load(fixtures);
        if self.state.roster.roster.is_some() || self.state.roster.is_loading() {
            return None;
        }

        let uid = self
            .settings
            .season_game_uid
            .clone()
            .or_else(|| self.state.fixtures.selected_fixture().map(|f| f.season_game_uid.clone()))?;
        Some(self.request_roster(&uid))
    }

    pub fn on_roster_loaded(&mut self, generation: u64, roster: Roster) {
        let previous = self.state.roster.fixture().map(|f| f.season_game_uid.clone());
        let season_game_uid = roster.fixture.season_game_uid.clone();
        if !self.state.roster.load(generation, roster) {
            return;
        }
        self.state.last_error = None;
        if previous.as_deref() != Some(season_game_uid.as_str()) {
            self.state.lineup.teams.clear();
            self.state.lineup.scroll_offset = 0;
        }
    }

    pub fn on_roster_failed(&mut self, generation: u64, message: String) {
        if !self.state.roster.fail(generation) {
            debug!("ignoring failure of superseded roster load: {message}");
            return;
        }
        error!("roster load failed: {message}");
        self.state.last_error = Some("Could not load players for this match.".to_string());
    }

    pub fn on_teams_generated(&mut self, teams: Vec<GeneratedTeam>) {
        self.state.last_error = None;
        self.state.lineup.teams = teams;
        self.state.lineup.scroll_offset = 0;
    }

    pub fn on_error(&mut self, message: String) {
        self.state.last_error = Some(message);
    }

    pub fn on_tick(&mut self, now: DateTime<Utc>) {
        self.state.clock.advance(now);
    }

    // -----------------------------------------------------------------------
    // Requests built from user actions
    // -----------------------------------------------------------------------

    pub fn request_roster(&mut self, season_game_uid: &str) -> NetworkRequest {
        let generation = self.state.roster.begin_load(season_game_uid);
        NetworkRequest::LoadRoster {
            generation,
            season_game_uid: season_game_uid.to_owned(),
            lineup_logic: self.state.lineup.setting.lineup_logic,
        }
    }

    /// Open the match under the cursor on the Match tab.
    pub fn open_selected_fixture(&mut self) -> Option<NetworkRequest> {
        let uid = self.state.fixtures.selected_fixture()?.season_game_uid.clone();
        self.update_tab(MenuItem::Players);
        Some(self.request_roster(&uid))
    }

    /// Toggle a tag on the highlighted player; returns the save to debounce.
    pub fn toggle_selected_player(&mut self, tag: Tag) -> Option<NetworkRequest> {
        if !self.state.roster.toggle_selected(tag) {
            return None;
        }
        self.save_request()
    }

    pub fn clear_selection(&mut self) -> Option<NetworkRequest> {
        if !self.state.roster.clear_local() {
            return None;
        }
        self.save_request()
    }

    pub fn save_request(&self) -> Option<NetworkRequest> {
        let fixture = self.state.roster.fixture()?.clone();
        Some(NetworkRequest::SaveSelection {
            fixture,
            lists: self.state.roster.selection.payload(),
        })
    }

    pub fn generate_request(&mut self) -> Option<NetworkRequest> {
        let setting = self.state.lineup.setting;
        if let Err(e) = setting.validate() {
            self.state.lineup.validation = Some(e.to_string());
            return None;
        }
        let Some(fixture) = self.state.roster.fixture().cloned() else {
            self.state.last_error = Some("Open a match before generating teams".to_string());
            return None;
        };
        self.state.lineup.validation = None;
        Some(NetworkRequest::GenerateTeams {
            fixture,
            lists: self.state.roster.selection.payload(),
            setting,
        })
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) {
        if self.state.active_tab == next {
            return;
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }
}
