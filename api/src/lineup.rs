use crate::tier::Tier;
use serde::{Serialize, Serializer};
use std::fmt;

pub const MIN_TEAMS: u8 = 1;
pub const MAX_TEAMS: u8 = 20;
/// Players in a cricket XI; tier picks must add up to this.
pub const PLAYERS_PER_TEAM: u8 = 11;

/// Team generation strategy (`activeIndex` on the wire).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineupLogic {
    #[default]
    Smart,
    Popular,
    Differential,
    ChooseYourOwn,
}

impl LineupLogic {
    pub const ALL: [LineupLogic; 4] = [
        LineupLogic::Smart,
        LineupLogic::Popular,
        LineupLogic::Differential,
        LineupLogic::ChooseYourOwn,
    ];

    pub fn index(&self) -> u8 {
        match self {
            LineupLogic::Smart => 0,
            LineupLogic::Popular => 1,
            LineupLogic::Differential => 2,
            LineupLogic::ChooseYourOwn => 3,
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.index() == index)
    }

    pub fn label(&self) -> &'static str {
        match self {
            LineupLogic::Smart => "Smart",
            LineupLogic::Popular => "Popular picks",
            LineupLogic::Differential => "Differentials",
            LineupLogic::ChooseYourOwn => "Choose your own",
        }
    }
}

impl Serialize for LineupLogic {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.index())
    }
}

/// How evenly players are spread across generated teams (1, 2 or 3).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Distribution {
    Low,
    #[default]
    Medium,
    High,
}

impl Distribution {
    pub fn value(&self) -> u8 {
        match self {
            Distribution::Low => 1,
            Distribution::Medium => 2,
            Distribution::High => 3,
        }
    }

    pub fn from_value(value: u8) -> Result<Self, SettingError> {
        match value {
            1 => Ok(Distribution::Low),
            2 => Ok(Distribution::Medium),
            3 => Ok(Distribution::High),
            other => Err(SettingError::Distribution(other)),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Distribution::Low => "Low",
            Distribution::Medium => "Medium",
            Distribution::High => "High",
        }
    }
}

impl Serialize for Distribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.value())
    }
}

/// Which players may be picked as captain / vice-captain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CvcPool {
    #[default]
    AllPlayers,
    SelectedOnly,
}

impl CvcPool {
    pub fn label(&self) -> &'static str {
        match self {
            CvcPool::AllPlayers => "All players",
            CvcPool::SelectedOnly => "Preferred + locked only",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            CvcPool::AllPlayers => CvcPool::SelectedOnly,
            CvcPool::SelectedOnly => CvcPool::AllPlayers,
        }
    }
}

/// Target player count per popularity tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TierPicks {
    pub top: u8,
    pub middle: u8,
    pub lower: u8,
}

impl Default for TierPicks {
    fn default() -> Self {
        Self { top: 4, middle: 4, lower: 3 }
    }
}

impl TierPicks {
    pub fn total(&self) -> u8 {
        self.top + self.middle + self.lower
    }

    pub fn get(&self, tier: Tier) -> u8 {
        match tier {
            Tier::Top => self.top,
            Tier::Middle => self.middle,
            Tier::Lower => self.lower,
        }
    }

    fn get_mut(&mut self, tier: Tier) -> &mut u8 {
        match tier {
            Tier::Top => &mut self.top,
            Tier::Middle => &mut self.middle,
            Tier::Lower => &mut self.lower,
        }
    }

    pub fn increment(&mut self, tier: Tier) {
        let slot = self.get_mut(tier);
        *slot = slot.saturating_add(1).min(PLAYERS_PER_TEAM);
    }

    pub fn decrement(&mut self, tier: Tier) {
        let slot = self.get_mut(tier);
        *slot = slot.saturating_sub(1);
    }
}

/// Knobs for a team generation request. Passed by value between screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineupSetting {
    pub teams_count: u8,
    #[serde(rename = "active_index")]
    pub lineup_logic: LineupLogic,
    pub distribution: Distribution,
    pub cvc_pool: CvcPool,
    pub tier_picks: TierPicks,
}

impl Default for LineupSetting {
    fn default() -> Self {
        Self {
            teams_count: MIN_TEAMS,
            lineup_logic: LineupLogic::default(),
            distribution: Distribution::default(),
            cvc_pool: CvcPool::default(),
            tier_picks: TierPicks::default(),
        }
    }
}

impl LineupSetting {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> Result<(), SettingError> {
        if !(MIN_TEAMS..=MAX_TEAMS).contains(&self.teams_count) {
            return Err(SettingError::TeamsCount(self.teams_count));
        }
        if self.lineup_logic == LineupLogic::ChooseYourOwn
            && self.tier_picks.total() != PLAYERS_PER_TEAM
        {
            return Err(SettingError::TierPicks(self.tier_picks.total()));
        }
        Ok(())
    }

    pub fn next_teams_count(&mut self) {
        self.teams_count = self.teams_count.saturating_add(1).clamp(MIN_TEAMS, MAX_TEAMS);
    }

    pub fn prev_teams_count(&mut self) {
        self.teams_count = self.teams_count.saturating_sub(1).clamp(MIN_TEAMS, MAX_TEAMS);
    }

    pub fn next_logic(&mut self) {
        let next = (self.lineup_logic.index() + 1) % LineupLogic::ALL.len() as u8;
        self.lineup_logic = LineupLogic::from_index(next).unwrap_or_default();
    }

    pub fn prev_logic(&mut self) {
        let count = LineupLogic::ALL.len() as u8;
        let prev = (self.lineup_logic.index() + count - 1) % count;
        self.lineup_logic = LineupLogic::from_index(prev).unwrap_or_default();
    }

    pub fn next_distribution(&mut self) {
        self.distribution = match self.distribution {
            Distribution::Low => Distribution::Medium,
            Distribution::Medium | Distribution::High => Distribution::High,
        };
    }

    pub fn prev_distribution(&mut self) {
        self.distribution = match self.distribution {
            Distribution::High => Distribution::Medium,
            Distribution::Medium | Distribution::Low => Distribution::Low,
        };
    }

    pub fn uses_tier_picks(&self) -> bool {
        self.lineup_logic == LineupLogic::ChooseYourOwn
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingError {
    TeamsCount(u8),
    Distribution(u8),
    TierPicks(u8),
}

impl fmt::Display for SettingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingError::TeamsCount(n) => {
                write!(f, "teams count {n} outside {MIN_TEAMS}..={MAX_TEAMS}")
            }
            SettingError::Distribution(n) => write!(f, "distribution {n} must be 1, 2 or 3"),
            SettingError::TierPicks(n) => {
                write!(f, "tier picks add up to {n}, need {PLAYERS_PER_TEAM}")
            }
        }
    }
}

impl std::error::Error for SettingError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_setting_is_valid() {
        assert_eq!(LineupSetting::new().validate(), Ok(()));
    }

    #[test]
    fn teams_count_is_bounded() {
        let mut setting = LineupSetting { teams_count: 0, ..LineupSetting::new() };
        assert_eq!(setting.validate(), Err(SettingError::TeamsCount(0)));

        setting.teams_count = MAX_TEAMS;
        setting.next_teams_count();
        assert_eq!(setting.teams_count, MAX_TEAMS);

        setting.teams_count = MIN_TEAMS;
        setting.prev_teams_count();
        assert_eq!(setting.teams_count, MIN_TEAMS);
    }

    #[test]
    fn distribution_only_accepts_one_to_three() {
        assert_eq!(Distribution::from_value(1), Ok(Distribution::Low));
        assert_eq!(Distribution::from_value(3), Ok(Distribution::High));
        assert_eq!(Distribution::from_value(0), Err(SettingError::Distribution(0)));
        assert_eq!(Distribution::from_value(4), Err(SettingError::Distribution(4)));

        let mut setting = LineupSetting::new();
        setting.next_distribution();
        setting.next_distribution();
        assert_eq!(setting.distribution, Distribution::High);
        for _ in 0..4 {
            setting.prev_distribution();
        }
        assert_eq!(setting.distribution, Distribution::Low);
    }

    #[test]
    fn choose_your_own_needs_a_full_eleven() {
        let mut setting = LineupSetting {
            lineup_logic: LineupLogic::ChooseYourOwn,
            ..LineupSetting::new()
        };
        assert_eq!(setting.validate(), Ok(()));

        setting.tier_picks.increment(Tier::Top);
        assert_eq!(setting.validate(), Err(SettingError::TierPicks(12)));

        setting.lineup_logic = LineupLogic::Popular;
        assert_eq!(setting.validate(), Ok(()), "tier picks only matter for choose-your-own");
    }

    #[test]
    fn logic_cycles_through_every_index() {
        let mut setting = LineupSetting::new();
        let mut seen = Vec::new();
        for _ in 0..LineupLogic::ALL.len() {
            seen.push(setting.lineup_logic.index());
            setting.next_logic();
        }
        assert_eq!(seen, vec![0, 1, 2, 3]);
        assert_eq!(setting.lineup_logic, LineupLogic::Smart);
        setting.prev_logic();
        assert_eq!(setting.lineup_logic, LineupLogic::ChooseYourOwn);
    }

    #[test]
    fn serializes_numeric_knobs_for_the_request() {
        let setting = LineupSetting {
            teams_count: 5,
            lineup_logic: LineupLogic::Differential,
            distribution: Distribution::High,
            cvc_pool: CvcPool::SelectedOnly,
            tier_picks: TierPicks::default(),
        };
        let value = serde_json::to_value(setting).unwrap();
        assert_eq!(value["teams_count"], 5);
        assert_eq!(value["active_index"], 2);
        assert_eq!(value["distribution"], 3);
        assert_eq!(value["cvc_pool"], "selected_only");
        assert_eq!(value["tier_picks"]["lower"], 3);
    }
}
