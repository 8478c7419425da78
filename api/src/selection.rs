//! Player tagging for the lineup builder.
//!
//! A player can be preferred, locked or excluded. Tags the user sets in this
//! session live in [`LocalToggles`]; the previously saved selection comes back
//! from the server as a [`ServerSelection`] baseline. [`SelectionState`] keeps
//! both and resolves them into one tag per player with an explicit
//! [`MergePolicy`].

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tag {
    Preferred,
    Locked,
    Excluded,
}

impl Tag {
    pub const ALL: [Tag; 3] = [Tag::Preferred, Tag::Locked, Tag::Excluded];

    pub fn label(&self) -> &'static str {
        match self {
            Tag::Preferred => "Preferred",
            Tag::Locked => "Locked",
            Tag::Excluded => "Excluded",
        }
    }

    pub fn badge(&self) -> char {
        match self {
            Tag::Preferred => 'P',
            Tag::Locked => 'L',
            Tag::Excluded => 'X',
        }
    }
}

/// Selection previously saved on the server, as embedded in the roster
/// response (`selected_player`: `{"p": [...], "l": [...], "e": [...]}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSelection {
    #[serde(rename = "p", default, deserialize_with = "crate::wire::id_list")]
    pub preferred: Vec<String>,
    #[serde(rename = "l", default, deserialize_with = "crate::wire::id_list")]
    pub locked: Vec<String>,
    #[serde(rename = "e", default, deserialize_with = "crate::wire::id_list")]
    pub excluded: Vec<String>,
}

impl ServerSelection {
    pub fn from_embedded(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn ids(&self, tag: Tag) -> &[String] {
        match tag {
            Tag::Preferred => &self.preferred,
            Tag::Locked => &self.locked,
            Tag::Excluded => &self.excluded,
        }
    }

    /// First list containing `player_uid`, checked preferred, locked, excluded.
    pub fn tag_of(&self, player_uid: &str) -> Option<Tag> {
        Tag::ALL
            .into_iter()
            .find(|tag| self.ids(*tag).iter().any(|id| id == player_uid))
    }

    pub fn is_empty(&self) -> bool {
        self.preferred.is_empty() && self.locked.is_empty() && self.excluded.is_empty()
    }
}

/// How a local decision and the server baseline combine when they disagree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergePolicy {
    /// Anything the user touched this session wins, including an explicit clear.
    #[default]
    LocalWins,
    /// A tag present in the baseline stands; local decisions only fill gaps.
    ServerWins,
}

impl MergePolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "local" | "local-wins" | "local_wins" => Some(MergePolicy::LocalWins),
            "server" | "server-wins" | "server_wins" => Some(MergePolicy::ServerWins),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MergePolicy::LocalWins => "local wins",
            MergePolicy::ServerWins => "server wins",
        }
    }
}

/// Tags set during this session. One slot per player, so a player can never
/// carry two local tags. An entry with no tag records an explicit clear.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalToggles {
    entries: BTreeMap<String, LocalEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LocalEntry {
    tag: Option<Tag>,
    /// Slot to put back when `tag` is turned off again. `None` when there is
    /// nothing to put back.
    previous: Option<Option<Tag>>,
}

impl LocalToggles {
    /// `None` if the player was never touched locally.
    pub fn entry(&self, player_uid: &str) -> Option<Option<Tag>> {
        self.entries.get(player_uid).map(|e| e.tag)
    }

    pub fn tag(&self, player_uid: &str) -> Option<Tag> {
        self.entry(player_uid).flatten()
    }

    pub fn set(&mut self, player_uid: &str, tag: Option<Tag>) {
        self.entries
            .insert(player_uid.to_owned(), LocalEntry { tag, previous: None });
    }

    /// Turn `tag` on, remembering the current slot for [`Self::turn_off`].
    pub fn turn_on(&mut self, player_uid: &str, tag: Tag) {
        let previous = self.entry(player_uid);
        self.entries
            .insert(player_uid.to_owned(), LocalEntry { tag: Some(tag), previous });
    }

    /// Undo the last [`Self::turn_on`]. With nothing to put back the player
    /// becomes untouched and the baseline shows through.
    pub fn turn_off(&mut self, player_uid: &str) {
        match self.entries.get(player_uid).and_then(|e| e.previous) {
            Some(previous) => self.set(player_uid, previous),
            None => self.remove(player_uid),
        }
    }

    /// Forget the local decision; the baseline shows through again.
    pub fn remove(&mut self, player_uid: &str) {
        self.entries.remove(player_uid);
    }

    /// Players currently toggled on for `tag`.
    pub fn on(&self, tag: Tag) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(move |(_, e)| e.tag == Some(tag))
            .map(|(uid, _)| uid.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<Tag>)> {
        self.entries.iter().map(|(uid, e)| (uid.as_str(), e.tag))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Per-category id sets used for counts and list filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplaySets {
    pub preferred: BTreeSet<String>,
    pub locked: BTreeSet<String>,
    pub excluded: BTreeSet<String>,
}

impl DisplaySets {
    pub fn set(&self, tag: Tag) -> &BTreeSet<String> {
        match tag {
            Tag::Preferred => &self.preferred,
            Tag::Locked => &self.locked,
            Tag::Excluded => &self.excluded,
        }
    }

    fn set_mut(&mut self, tag: Tag) -> &mut BTreeSet<String> {
        match tag {
            Tag::Preferred => &mut self.preferred,
            Tag::Locked => &mut self.locked,
            Tag::Excluded => &mut self.excluded,
        }
    }

    pub fn contains(&self, tag: Tag, player_uid: &str) -> bool {
        self.set(tag).contains(player_uid)
    }

    pub fn count(&self, tag: Tag) -> usize {
        self.set(tag).len()
    }
}

/// The web client's display merge: per category, the union of server ids and
/// locally toggled-on ids. Nothing is reconciled, so a player locked on the
/// server and excluded locally lands in both `locked` and `excluded`.
/// [`SelectionState::display_sets`] is the resolved alternative.
pub fn union_display_sets(baseline: &ServerSelection, local: &LocalToggles) -> DisplaySets {
    let mut sets = DisplaySets::default();
    for tag in Tag::ALL {
        let target = sets.set_mut(tag);
        target.extend(baseline.ids(tag).iter().cloned());
        target.extend(local.on(tag).map(str::to_owned));
    }
    sets
}

/// Resolved id lists in the shape the save endpoint expects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectionLists {
    pub preferred_players: Vec<String>,
    pub locked_players: Vec<String>,
    pub excluded_players: Vec<String>,
}

impl SelectionLists {
    pub fn total(&self) -> usize {
        self.preferred_players.len() + self.locked_players.len() + self.excluded_players.len()
    }
}

/// List filter on the Players screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectionFilter {
    #[default]
    All,
    Preferred,
    Locked,
    Excluded,
    Untagged,
}

impl SelectionFilter {
    pub fn matches(&self, tag: Option<Tag>) -> bool {
        match self {
            SelectionFilter::All => true,
            SelectionFilter::Preferred => tag == Some(Tag::Preferred),
            SelectionFilter::Locked => tag == Some(Tag::Locked),
            SelectionFilter::Excluded => tag == Some(Tag::Excluded),
            SelectionFilter::Untagged => tag.is_none(),
        }
    }

    pub fn next(self) -> Self {
        match self {
            SelectionFilter::All => SelectionFilter::Preferred,
            SelectionFilter::Preferred => SelectionFilter::Locked,
            SelectionFilter::Locked => SelectionFilter::Excluded,
            SelectionFilter::Excluded => SelectionFilter::Untagged,
            SelectionFilter::Untagged => SelectionFilter::All,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SelectionFilter::All => "All",
            SelectionFilter::Preferred => "Preferred",
            SelectionFilter::Locked => "Locked",
            SelectionFilter::Excluded => "Excluded",
            SelectionFilter::Untagged => "Untagged",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    baseline: ServerSelection,
    local: LocalToggles,
    policy: MergePolicy,
}

impl SelectionState {
    pub fn new(policy: MergePolicy) -> Self {
        Self { policy, ..Self::default() }
    }

    pub fn with_baseline(baseline: ServerSelection, policy: MergePolicy) -> Self {
        Self { baseline, local: LocalToggles::default(), policy }
    }

    /// Swap in a freshly fetched baseline. Local toggles survive, so a
    /// baseline that resolves late does not wipe what the user already did.
    pub fn set_baseline(&mut self, baseline: ServerSelection) {
        self.baseline = baseline;
    }

    pub fn baseline(&self) -> &ServerSelection {
        &self.baseline
    }

    pub fn local(&self) -> &LocalToggles {
        &self.local
    }

    pub fn policy(&self) -> MergePolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: MergePolicy) {
        self.policy = policy;
    }

    pub fn toggle_preferred(&mut self, player_uid: &str) -> Option<Tag> {
        self.toggle(player_uid, Tag::Preferred)
    }

    pub fn toggle_lock(&mut self, player_uid: &str) -> Option<Tag> {
        self.toggle(player_uid, Tag::Locked)
    }

    pub fn toggle_exclude(&mut self, player_uid: &str) -> Option<Tag> {
        self.toggle(player_uid, Tag::Excluded)
    }

    /// Flip `tag` for the player and return the player's resolved tag.
    ///
    /// The flip starts from the player's local tag, or the baseline tag if the
    /// player was not touched yet. Turning a tag on replaces whatever other
    /// tag the player had; turning it off again puts that tag back, so two
    /// flips in a row always leave the player as they were. Turning off a
    /// tag that only the baseline carries records an explicit clear.
    pub fn toggle(&mut self, player_uid: &str, tag: Tag) -> Option<Tag> {
        let local = self.local.entry(player_uid);
        let current = local.unwrap_or_else(|| self.baseline.tag_of(player_uid));
        if current != Some(tag) {
            self.local.turn_on(player_uid, tag);
        } else if local.is_some() {
            self.local.turn_off(player_uid);
            if self.local.entry(player_uid).is_none() && self.baseline.tag_of(player_uid) == Some(tag) {
                self.local.set(player_uid, None);
            }
        } else {
            self.local.set(player_uid, None);
        }
        self.tag(player_uid)
    }

    /// Drop every local decision; the baseline shows through again.
    pub fn clear_local(&mut self) {
        self.local.clear();
    }

    /// Resolved tag for a single player under the current policy.
    pub fn tag(&self, player_uid: &str) -> Option<Tag> {
        let server = self.baseline.tag_of(player_uid);
        match (self.policy, self.local.entry(player_uid)) {
            (_, None) => server,
            (MergePolicy::LocalWins, Some(local)) => local,
            (MergePolicy::ServerWins, Some(local)) => server.or(local),
        }
    }

    /// One authoritative tag per player under the current policy.
    pub fn resolve(&self) -> BTreeMap<String, Tag> {
        let mut resolved = BTreeMap::new();
        for tag in Tag::ALL {
            for uid in self.baseline.ids(tag) {
                resolved.entry(uid.clone()).or_insert(tag);
            }
        }

        for (uid, local) in self.local.iter() {
            match (self.policy, local) {
                (MergePolicy::LocalWins, Some(tag)) => {
                    resolved.insert(uid.to_owned(), tag);
                }
                (MergePolicy::LocalWins, None) => {
                    resolved.remove(uid);
                }
                (MergePolicy::ServerWins, Some(tag)) => {
                    resolved.entry(uid.to_owned()).or_insert(tag);
                }
                (MergePolicy::ServerWins, None) => {}
            }
        }
        resolved
    }

    /// Disjoint display sets built from [`Self::resolve`].
    pub fn display_sets(&self) -> DisplaySets {
        let mut sets = DisplaySets::default();
        for (uid, tag) in self.resolve() {
            sets.set_mut(tag).insert(uid);
        }
        sets
    }

    /// The legacy union merge over this state's baseline and local toggles.
    pub fn union_display_sets(&self) -> DisplaySets {
        union_display_sets(&self.baseline, &self.local)
    }

    /// Lists to persist. Ordered by player uid.
    pub fn payload(&self) -> SelectionLists {
        let mut lists = SelectionLists::default();
        for (uid, tag) in self.resolve() {
            match tag {
                Tag::Preferred => lists.preferred_players.push(uid),
                Tag::Locked => lists.locked_players.push(uid),
                Tag::Excluded => lists.excluded_players.push(uid),
            }
        }
        lists
    }
}
