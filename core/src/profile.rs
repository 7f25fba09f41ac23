//! Persistent player profile.
//!
//! Everything that must survive a session lives here: unlock state, pity
//! counters, and the recent zone-seed visit history consulted by the
//! reward-dampening rule. Collections use ordered containers so serialized
//! profiles are byte-stable across runs.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

/// Kills-since-last-drop counters, one per pity-tracked rarity.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PityCounters {
    /// Kills since the last rare-or-better drop.
    pub kills_since_rare: u32,
    /// Kills since the last legendary-or-better drop.
    pub kills_since_legendary: u32,
    /// Kills since the last unique drop.
    pub kills_since_unique: u32,
}

/// Persistent cross-session player state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Player level used by enemy level policies and item levels.
    #[serde(default = "default_level")]
    pub level: u32,
    /// Luck stat feeding the drop-chance bonus.
    #[serde(default)]
    pub luck: u32,
    /// Deepest zone the player has ever reached.
    #[serde(default)]
    pub highest_zone: u32,
    /// Portal identifier to unlocked flag.
    #[serde(default)]
    pub portals_unlocked: BTreeMap<String, bool>,
    /// One-time milestone unlocks already granted.
    #[serde(default)]
    pub unlocks_granted: BTreeSet<String>,
    /// Depths already visited, for first-visit milestone gating.
    #[serde(default)]
    pub depth_history: BTreeSet<u32>,
    /// Pity counters.
    #[serde(default)]
    pub pity: PityCounters,
    /// Recent zone-seed visits, oldest first, bounded by the history limit.
    #[serde(default)]
    pub seed_history: VecDeque<u64>,
}

fn default_level() -> u32 {
    1
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            level: default_level(),
            luck: 0,
            highest_zone: 0,
            portals_unlocked: BTreeMap::new(),
            unlocks_granted: BTreeSet::new(),
            depth_history: BTreeSet::new(),
            pity: PityCounters::default(),
            seed_history: VecDeque::new(),
        }
    }
}

impl Profile {
    /// Records a zone-seed visit, evicting the oldest beyond `limit`.
    pub fn record_seed_visit(&mut self, seed: u64, limit: usize) {
        self.seed_history.push_back(seed);
        while self.seed_history.len() > limit {
            let _ = self.seed_history.pop_front();
        }
    }

    /// Number of retained visits to the given zone seed.
    #[must_use]
    pub fn seed_visits(&self, seed: u64) -> u32 {
        self.seed_history.iter().filter(|&&s| s == seed).count() as u32
    }

    /// Whether the named portal is currently unlocked.
    #[must_use]
    pub fn portal_unlocked(&self, portal: &str) -> bool {
        self.portals_unlocked.get(portal).copied().unwrap_or(false)
    }
}
