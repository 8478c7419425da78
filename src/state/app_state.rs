use crate::app::MenuItem;
use crate::state::network::RequestGeneration;
use chrono::{DateTime, Utc};
use fantasy_api::lineup::{LineupSetting, PLAYERS_PER_TEAM};
use fantasy_api::selection::{DisplaySets, SelectionFilter};
use fantasy_api::tier::{Tier, Tiers, classify};
use fantasy_api::{Fixture, GeneratedTeam, MergePolicy, Player, Roster, SelectionState, Tag};
use log::debug;

// ---------------------------------------------------------------------------
// Clock: advanced by the ticker, read by the match header
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct ClockState {
    pub now: DateTime<Utc>,
    /// Flips every tick; drives the "lineups announced" flicker.
    pub blink: bool,
}

impl Default for ClockState {
    fn default() -> Self {
        Self { now: Utc::now(), blink: false }
    }
}

impl ClockState {
    pub fn advance(&mut self, now: DateTime<Utc>) {
        self.now = now;
        self.blink = !self.blink;
    }
}

// ---------------------------------------------------------------------------
// Lobby fixtures
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct FixturesState {
    pub fixtures: Vec<Fixture>,
    pub selected: usize,
}

impl FixturesState {
    /// Replace the list, keeping the cursor on the same match when it survives.
    pub fn load(&mut self, fixtures: Vec<Fixture>) {
        let previous = self.selected_fixture().map(|f| f.season_game_uid.clone());
        self.fixtures = fixtures;
        self.selected = previous
            .and_then(|uid| self.fixtures.iter().position(|f| f.season_game_uid == uid))
            .unwrap_or(0)
            .min(self.fixtures.len().saturating_sub(1));
    }

    pub fn selected_fixture(&self) -> Option<&Fixture> {
        self.fixtures.get(self.selected)
    }

    pub fn navigate_down(&mut self) {
        if self.selected + 1 < self.fixtures.len() {
            self.selected += 1;
        }
    }

    pub fn navigate_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }
}

// ---------------------------------------------------------------------------
// Roster + player selection
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct RosterState {
    pub roster: Option<Roster>,
    pub selection: SelectionState,
    /// Recomputed from the full roster on every load.
    pub tiers: Tiers,
    pub filter: SelectionFilter,
    /// Index into `visible_players()`.
    pub selected: usize,
    pub generation: RequestGeneration,
    /// Match of the load currently in flight, if any.
    pub loading_uid: Option<String>,
}

impl RosterState {
    pub fn new(policy: MergePolicy) -> Self {
        Self { selection: SelectionState::new(policy), ..Self::default() }
    }

    pub fn begin_load(&mut self, season_game_uid: &str) -> u64 {
        self.loading_uid = Some(season_game_uid.to_owned());
        self.generation.next()
    }

    pub fn is_loading(&self) -> bool {
        self.loading_uid.is_some()
    }

    /// Apply a loaded roster. Returns false and changes nothing when a newer
    /// load has been started since this one.
    pub fn load(&mut self, generation: u64, roster: Roster) -> bool {
        if !self.generation.is_current(generation) {
            debug!(
                "dropping stale roster (generation {generation}, current {})",
                self.generation.current()
            );
            return false;
        }
        self.loading_uid = None;

        let same_match = self
            .roster
            .as_ref()
            .is_some_and(|r| r.fixture.season_game_uid == roster.fixture.season_game_uid);
        if same_match {
            self.selection.set_baseline(roster.baseline.clone());
        } else {
            self.selection = SelectionState::with_baseline(roster.baseline.clone(), self.selection.policy());
            self.filter = SelectionFilter::All;
            self.selected = 0;
        }

        self.tiers = classify(&roster.players);
        self.roster = Some(roster);
        self.clamp_cursor();
        true
    }

    /// Returns false when `generation` is stale.
    pub fn fail(&mut self, generation: u64) -> bool {
        if !self.generation.is_current(generation) {
            return false;
        }
        self.loading_uid = None;
        true
    }

    pub fn fixture(&self) -> Option<&Fixture> {
        self.roster.as_ref().map(|r| &r.fixture)
    }

    pub fn visible_players(&self) -> Vec<&Player> {
        let Some(roster) = &self.roster else {
            return Vec::new();
        };
        roster
            .players
            .iter()
            .filter(|p| self.filter.matches(self.selection.tag(&p.player_uid)))
            .collect()
    }

    pub fn selected_player(&self) -> Option<&Player> {
        self.visible_players().get(self.selected).copied()
    }

    /// Flip `tag` on the highlighted player. Returns true when something changed.
    pub fn toggle_selected(&mut self, tag: Tag) -> bool {
        let Some(uid) = self.selected_player().map(|p| p.player_uid.clone()) else {
            return false;
        };
        let now = self.selection.toggle(&uid, tag);
        debug!("player {uid} is now {}", now.map(|t| t.label()).unwrap_or("untagged"));
        // The player may have left the filtered view.
        self.clamp_cursor();
        true
    }

    pub fn clear_local(&mut self) -> bool {
        if self.roster.is_none() || self.selection.local().is_empty() {
            return false;
        }
        self.selection.clear_local();
        self.clamp_cursor();
        true
    }

    pub fn cycle_filter(&mut self) {
        self.filter = self.filter.next();
        self.selected = 0;
    }

    pub fn navigate_down(&mut self) {
        if self.selected + 1 < self.visible_players().len() {
            self.selected += 1;
        }
    }

    pub fn navigate_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn counts(&self) -> DisplaySets {
        self.selection.display_sets()
    }

    pub fn player_name(&self, player_uid: &str) -> String {
        self.roster
            .as_ref()
            .and_then(|r| r.find_player(player_uid))
            .map(|p| p.full_name.clone())
            .unwrap_or_else(|| player_uid.to_string())
    }

    fn clamp_cursor(&mut self) {
        let len = self.visible_players().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }
}

// ---------------------------------------------------------------------------
// Lineup settings + generated teams
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineupField {
    #[default]
    TeamsCount,
    Logic,
    Distribution,
    CvcPool,
    TopPicks,
    MiddlePicks,
    LowerPicks,
}

impl LineupField {
    pub fn label(&self) -> &'static str {
        match self {
            LineupField::TeamsCount => "Teams",
            LineupField::Logic => "Lineup logic",
            LineupField::Distribution => "Distribution",
            LineupField::CvcPool => "C/VC pool",
            LineupField::TopPicks => "Top tier picks",
            LineupField::MiddlePicks => "Middle tier picks",
            LineupField::LowerPicks => "Lower tier picks",
        }
    }

    fn tier(&self) -> Option<Tier> {
        match self {
            LineupField::TopPicks => Some(Tier::Top),
            LineupField::MiddlePicks => Some(Tier::Middle),
            LineupField::LowerPicks => Some(Tier::Lower),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct LineupState {
    pub setting: LineupSetting,
    pub field: LineupField,
    pub teams: Vec<GeneratedTeam>,
    pub validation: Option<String>,
    pub scroll_offset: u16,
}

impl LineupState {
    /// Editable fields; tier picks only show up for choose-your-own.
    pub fn fields(&self) -> Vec<LineupField> {
        let mut fields = vec![
            LineupField::TeamsCount,
            LineupField::Logic,
            LineupField::Distribution,
            LineupField::CvcPool,
        ];
        if self.setting.uses_tier_picks() {
            fields.extend([LineupField::TopPicks, LineupField::MiddlePicks, LineupField::LowerPicks]);
        }
        fields
    }

    pub fn next_field(&mut self) {
        let fields = self.fields();
        let idx = fields.iter().position(|f| *f == self.field).unwrap_or(0);
        self.field = fields[(idx + 1) % fields.len()];
    }

    pub fn prev_field(&mut self) {
        let fields = self.fields();
        let idx = fields.iter().position(|f| *f == self.field).unwrap_or(0);
        self.field = fields[(idx + fields.len() - 1) % fields.len()];
    }

    pub fn increase(&mut self) {
        match self.field {
            LineupField::TeamsCount => self.setting.next_teams_count(),
            LineupField::Logic => self.setting.next_logic(),
            LineupField::Distribution => self.setting.next_distribution(),
            LineupField::CvcPool => self.setting.cvc_pool = self.setting.cvc_pool.toggled(),
            field => {
                if let Some(tier) = field.tier() {
                    self.setting.tier_picks.increment(tier);
                }
            }
        }
        self.after_edit();
    }

    pub fn decrease(&mut self) {
        match self.field {
            LineupField::TeamsCount => self.setting.prev_teams_count(),
            LineupField::Logic => self.setting.prev_logic(),
            LineupField::Distribution => self.setting.prev_distribution(),
            LineupField::CvcPool => self.setting.cvc_pool = self.setting.cvc_pool.toggled(),
            field => {
                if let Some(tier) = field.tier() {
                    self.setting.tier_picks.decrement(tier);
                }
            }
        }
        self.after_edit();
    }

    pub fn value_label(&self, field: LineupField) -> String {
        let setting = &self.setting;
        match field {
            LineupField::TeamsCount => setting.teams_count.to_string(),
            LineupField::Logic => setting.lineup_logic.label().to_string(),
            LineupField::Distribution => {
                format!("{} ({})", setting.distribution.label(), setting.distribution.value())
            }
            LineupField::CvcPool => setting.cvc_pool.label().to_string(),
            other => other
                .tier()
                .map(|tier| format!("{} / {PLAYERS_PER_TEAM}", setting.tier_picks.get(tier)))
                .unwrap_or_default(),
        }
    }

    /// Re-check after every edit so the screen shows problems as they appear.
    fn after_edit(&mut self) {
        if !self.fields().contains(&self.field) {
            self.field = LineupField::Logic;
        }
        self.validation = self.setting.validate().err().map(|e| e.to_string());
    }
}

// ---------------------------------------------------------------------------
// Root app state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    pub last_error: Option<String>,
    pub fixtures: FixturesState,
    pub roster: RosterState,
    pub lineup: LineupState,
    pub clock: ClockState,
}

impl AppState {
    pub fn new(policy: MergePolicy) -> Self {
        Self { roster: RosterState::new(policy), ..Self::default() }
    }
}
