//! Popularity tiers for the "choose your own" lineup flow.

use crate::Player;
use std::cmp::Ordering;

/// Lower bound (inclusive) of the top tier, in selection percent.
pub const TOP_TIER_MIN: f64 = 66.66;
/// Lower bound (inclusive) of the middle tier, in selection percent.
pub const MIDDLE_TIER_MIN: f64 = 33.33;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Top,
    Middle,
    Lower,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Top, Tier::Middle, Tier::Lower];

    pub fn of(selected_percentage: f64) -> Self {
        if selected_percentage >= TOP_TIER_MIN {
            Tier::Top
        } else if selected_percentage >= MIDDLE_TIER_MIN {
            Tier::Middle
        } else {
            Tier::Lower
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tier::Top => "Top",
            Tier::Middle => "Middle",
            Tier::Lower => "Lower",
        }
    }

    pub fn range_label(&self) -> &'static str {
        match self {
            Tier::Top => ">= 66.66%",
            Tier::Middle => "33.33% - 66.66%",
            Tier::Lower => "< 33.33%",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tiers {
    pub top: Vec<Player>,
    pub middle: Vec<Player>,
    pub lower: Vec<Player>,
}

impl Tiers {
    pub fn get(&self, tier: Tier) -> &[Player] {
        match tier {
            Tier::Top => &self.top,
            Tier::Middle => &self.middle,
            Tier::Lower => &self.lower,
        }
    }

    pub fn len(&self) -> usize {
        self.top.len() + self.middle.len() + self.lower.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Split a roster into tiers by `selected_percentage`, each tier sorted
/// highest first. Every player lands in exactly one tier.
pub fn classify(players: &[Player]) -> Tiers {
    let mut tiers = Tiers::default();
    for player in players {
        match Tier::of(player.selected_percentage) {
            Tier::Top => tiers.top.push(player.clone()),
            Tier::Middle => tiers.middle.push(player.clone()),
            Tier::Lower => tiers.lower.push(player.clone()),
        }
    }
    for bucket in [&mut tiers.top, &mut tiers.middle, &mut tiers.lower] {
        bucket.sort_by(by_selection_desc);
    }
    tiers
}

fn by_selection_desc(a: &Player, b: &Player) -> Ordering {
    b.selected_percentage
        .total_cmp(&a.selected_percentage)
        .then_with(|| a.player_uid.cmp(&b.player_uid))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(uid: &str, pct: f64) -> Player {
        Player {
            player_uid: uid.into(),
            selected_percentage: pct,
            ..Default::default()
        }
    }

    fn pcts(players: &[Player]) -> Vec<f64> {
        players.iter().map(|p| p.selected_percentage).collect()
    }

    #[test]
    fn ten_player_roster_splits_into_three_tiers() {
        let values = [90.0, 80.0, 70.0, 65.0, 50.0, 40.0, 30.0, 20.0, 10.0, 5.0];
        let roster: Vec<Player> = values
            .iter()
            .enumerate()
            .map(|(i, v)| player(&i.to_string(), *v))
            .collect();

        let tiers = classify(&roster);
        assert_eq!(pcts(&tiers.top), vec![90.0, 80.0, 70.0]);
        assert_eq!(pcts(&tiers.middle), vec![65.0, 50.0, 40.0]);
        assert_eq!(pcts(&tiers.lower), vec![30.0, 20.0, 10.0, 5.0]);
        assert_eq!(tiers.len(), roster.len());
    }

    #[test]
    fn boundaries_belong_to_the_tier_above() {
        assert_eq!(Tier::of(66.66), Tier::Top);
        assert_eq!(Tier::of(66.659), Tier::Middle);
        assert_eq!(Tier::of(33.33), Tier::Middle);
        assert_eq!(Tier::of(33.329), Tier::Lower);
        assert_eq!(Tier::of(0.0), Tier::Lower);
    }

    #[test]
    fn values_above_one_hundred_stay_in_top() {
        let tiers = classify(&[player("a", 120.0), player("b", 99.0)]);
        assert_eq!(pcts(&tiers.top), vec![120.0, 99.0]);
    }

    #[test]
    fn buckets_are_sorted_descending_regardless_of_input_order() {
        let roster = vec![
            player("a", 35.0),
            player("b", 60.0),
            player("c", 12.0),
            player("d", 44.0),
            player("e", 31.0),
        ];
        let tiers = classify(&roster);
        assert_eq!(pcts(&tiers.middle), vec![60.0, 44.0, 35.0]);
        assert_eq!(pcts(&tiers.lower), vec![31.0, 12.0]);
        assert!(tiers.top.is_empty());
    }

    #[test]
    fn empty_roster_gives_empty_tiers() {
        assert!(classify(&[]).is_empty());
    }
}
