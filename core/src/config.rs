//! Campaign configuration surface.
//!
//! Tiers, portals, and the economy tunables are plain data loaded from TOML
//! by the adapter; [`CampaignConfig::default_campaign`] provides the shipped
//! three-tier campaign so the kernel is runnable without external files.

use serde::{Deserialize, Serialize};

use crate::TierId;

/// Weighted entry in a tier's modifier pool.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModifierDef {
    /// Modifier identifier surfaced in [`crate::Zone::mods`].
    pub id: String,
    /// Relative selection weight; non-positive weights are never selected.
    pub weight: f64,
}

/// One-time milestone granted while descending through a tier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnlockDef {
    /// Unlock identifier recorded in the profile.
    pub id: String,
    /// Minimum depth at which the unlock may fire.
    pub min_depth: u32,
    /// Per-zone-entry chance in `[0,1]` once the depth gate is met.
    pub chance: f64,
}

/// Configuration of one contiguous depth band.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TierConfig {
    /// Identifier referenced by portals and tier transitions.
    pub id: TierId,
    /// Display name used by announcements.
    pub name: String,
    /// First depth covered by the tier, one-based inclusive.
    pub zone_start: u32,
    /// Last depth covered; `None` makes the tier open-ended.
    pub zone_end: Option<u32>,
    /// Boss cadence override; falls back to `zones`, then to 5.
    pub boss_every: Option<u32>,
    /// Nominal zone count of the tier.
    pub zones: Option<u32>,
    /// Regular enemy type pool.
    pub enemy_types: Vec<String>,
    /// Elite enemy type pool.
    pub elite_types: Vec<String>,
    /// Boss type; boss zones in a tier without one fail generation.
    pub boss_type: Option<String>,
    /// Weighted zone-modifier pool.
    #[serde(default)]
    pub modifiers: Vec<ModifierDef>,
    /// Milestone unlocks evaluated on zone entry.
    #[serde(default)]
    pub unlocks: Vec<UnlockDef>,
    /// Backdrop colour as a `#rrggbb` string.
    pub backdrop: String,
}

impl TierConfig {
    /// Boss cadence for the tier: `boss_every`, else `zones`, else 5.
    #[must_use]
    pub fn boss_cadence(&self) -> u32 {
        self.boss_every.or(self.zones).unwrap_or(5).max(1)
    }
}

/// Hub portal definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PortalDef {
    /// Portal identifier recorded in the profile on unlock.
    pub id: String,
    /// Tier the portal leads into.
    pub tier_id: TierId,
    /// Display name used by announcements.
    pub name: String,
    /// Depth the portal drops the player at.
    pub start_zone: u32,
    /// Whether the portal is available before any unlock.
    #[serde(default)]
    pub unlocked: bool,
}

/// Currency payouts per kill class.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EconomyConfig {
    /// Cells granted per regular kill.
    pub cells_per_kill: u32,
    /// Scrap granted per regular kill.
    pub scrap_per_kill: u32,
    /// Multiplier applied to both currencies for elite kills.
    pub elite_multiplier: u32,
    /// Multiplier applied to both currencies for boss kills.
    pub boss_multiplier: u32,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            cells_per_kill: 3,
            scrap_per_kill: 5,
            elite_multiplier: 3,
            boss_multiplier: 10,
        }
    }
}

/// Drop-chance and pity tunables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LootConfig {
    /// Base drop chance per regular kill.
    pub base_drop_chance: f64,
    /// Drop chance replacing the base for elite kills.
    pub elite_drop_chance: f64,
    /// Drop chance replacing the base for boss kills.
    pub boss_drop_chance: f64,
    /// Multiplicative bonus per point of luck.
    pub luck_bonus_per_point: f64,
    /// Kills without a rare-or-better drop before the rare floor kicks in.
    pub rare_pity: u32,
    /// Kills without a legendary-or-better drop before the legendary floor.
    pub legendary_pity: u32,
    /// Kills without a unique drop before the unique floor.
    pub unique_pity: u32,
}

impl Default for LootConfig {
    fn default() -> Self {
        Self {
            base_drop_chance: 0.03,
            elite_drop_chance: 0.25,
            boss_drop_chance: 1.0,
            luck_bonus_per_point: 0.02,
            rare_pity: 30,
            legendary_pity: 150,
            unique_pity: 400,
        }
    }
}

/// Seed-reuse dampening tunables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AntiExploitConfig {
    /// Zone-seed visits tolerated before rewards are dampened.
    pub max_seed_reuse: u32,
    /// Floor of the dampening multiplier.
    pub min_drop_multiplier: f64,
    /// Number of recent zone-seed visits retained in the profile.
    pub seed_history_limit: usize,
}

impl Default for AntiExploitConfig {
    fn default() -> Self {
        Self {
            max_seed_reuse: 3,
            min_drop_multiplier: 0.1,
            seed_history_limit: 24,
        }
    }
}

/// Complete campaign definition consumed by the kernel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CampaignConfig {
    /// Depth bands in ascending `zone_start` order.
    pub tiers: Vec<TierConfig>,
    /// Hub portals into the tiers.
    pub portals: Vec<PortalDef>,
    /// Currency payouts.
    #[serde(default)]
    pub economy: EconomyConfig,
    /// Drop-chance and pity tunables.
    #[serde(default)]
    pub loot: LootConfig,
    /// Seed-reuse dampening tunables.
    #[serde(default)]
    pub anti_exploit: AntiExploitConfig,
}

impl CampaignConfig {
    /// Finds the tier covering the given depth: the last tier whose band
    /// starts at or before it. A depth in a gap between declared bands
    /// therefore resolves to the tier below it rather than to nothing.
    #[must_use]
    pub fn tier_for_depth(&self, depth: u32) -> Option<&TierConfig> {
        self.tiers
            .iter()
            .filter(|tier| tier.zone_start <= depth)
            .last()
    }

    /// Finds a tier by identifier.
    #[must_use]
    pub fn tier(&self, id: &TierId) -> Option<&TierConfig> {
        self.tiers.iter().find(|tier| &tier.id == id)
    }

    /// The shipped three-tier campaign.
    #[must_use]
    pub fn default_campaign() -> Self {
        let tier1 = TierId::new("tier1");
        let tier2 = TierId::new("tier2");
        let tier3 = TierId::new("tier3");
        Self {
            tiers: vec![
                TierConfig {
                    id: tier1.clone(),
                    name: "Shattered Belt".to_owned(),
                    zone_start: 1,
                    zone_end: Some(10),
                    boss_every: Some(5),
                    zones: Some(10),
                    enemy_types: vec!["drone".to_owned(), "stinger".to_owned()],
                    elite_types: vec!["warden".to_owned()],
                    boss_type: Some("dreadnought".to_owned()),
                    modifiers: vec![
                        ModifierDef {
                            id: "swift".to_owned(),
                            weight: 3.0,
                        },
                        ModifierDef {
                            id: "veiled".to_owned(),
                            weight: 2.0,
                        },
                    ],
                    unlocks: vec![UnlockDef {
                        id: "forge_bay".to_owned(),
                        min_depth: 6,
                        chance: 0.2,
                    }],
                    backdrop: "#050510".to_owned(),
                },
                TierConfig {
                    id: tier2.clone(),
                    name: "Ember Reach".to_owned(),
                    zone_start: 11,
                    zone_end: Some(25),
                    boss_every: Some(5),
                    zones: Some(15),
                    enemy_types: vec![
                        "raider".to_owned(),
                        "stinger".to_owned(),
                        "cinder_drone".to_owned(),
                    ],
                    elite_types: vec!["warden".to_owned(), "pyre_knight".to_owned()],
                    boss_type: Some("ember_colossus".to_owned()),
                    modifiers: vec![
                        ModifierDef {
                            id: "swift".to_owned(),
                            weight: 3.0,
                        },
                        ModifierDef {
                            id: "volatile".to_owned(),
                            weight: 2.0,
                        },
                        ModifierDef {
                            id: "armored".to_owned(),
                            weight: 1.0,
                        },
                    ],
                    unlocks: vec![UnlockDef {
                        id: "relic_vault".to_owned(),
                        min_depth: 16,
                        chance: 0.15,
                    }],
                    backdrop: "#140806".to_owned(),
                },
                TierConfig {
                    id: tier3.clone(),
                    name: "Null Expanse".to_owned(),
                    zone_start: 26,
                    zone_end: None,
                    boss_every: Some(5),
                    zones: None,
                    enemy_types: vec![
                        "raider".to_owned(),
                        "void_maw".to_owned(),
                        "phase_drone".to_owned(),
                    ],
                    elite_types: vec!["pyre_knight".to_owned(), "null_herald".to_owned()],
                    boss_type: Some("null_sovereign".to_owned()),
                    modifiers: vec![
                        ModifierDef {
                            id: "veiled".to_owned(),
                            weight: 2.0,
                        },
                        ModifierDef {
                            id: "volatile".to_owned(),
                            weight: 2.0,
                        },
                        ModifierDef {
                            id: "armored".to_owned(),
                            weight: 2.0,
                        },
                    ],
                    unlocks: Vec::new(),
                    backdrop: "#02030a".to_owned(),
                },
            ],
            portals: vec![
                PortalDef {
                    id: "portal_tier1".to_owned(),
                    tier_id: tier1,
                    name: "Belt Gate".to_owned(),
                    start_zone: 1,
                    unlocked: true,
                },
                PortalDef {
                    id: "portal_tier2".to_owned(),
                    tier_id: tier2,
                    name: "Ember Gate".to_owned(),
                    start_zone: 11,
                    unlocked: false,
                },
                PortalDef {
                    id: "portal_tier3".to_owned(),
                    tier_id: tier3,
                    name: "Null Gate".to_owned(),
                    start_zone: 26,
                    unlocked: false,
                },
            ],
            economy: EconomyConfig::default(),
            loot: LootConfig::default(),
            anti_exploit: AntiExploitConfig::default(),
        }
    }
}
