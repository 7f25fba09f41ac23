#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Starbreak simulation kernel.
//!
//! This crate defines the vocabulary that connects the authoritative world,
//! the pure systems, and the external collaborators: the generated [`Zone`]
//! data model, the tier/campaign configuration surface, the persistent
//! [`Profile`], the [`Event`] values the world broadcasts each frame, and the
//! [`Hooks`] capability set through which the world reaches the entity
//! factory, damage resolver, and announcement sink. Collaborators receive
//! read-mostly views; all mutation flows through the world.

mod config;
mod profile;
mod zone;

pub use config::{
    AntiExploitConfig, CampaignConfig, EconomyConfig, LootConfig, ModifierDef, PortalDef,
    TierConfig, UnlockDef,
};
pub use profile::{PityCounters, Profile};
pub use zone::{
    Decoration, NebulaWisp, Obstacle, ObstacleKind, Parallax, PatrolHint, Portal,
    PortalDestination, PortalKind, SpawnDescriptor, SpawnSlot, Star, StarLayer, WispLayer, Zone,
};

use serde::{Deserialize, Serialize};

/// Identifier of a tier configuration bundle.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TierId(String);

impl TierId {
    /// Creates a tier identifier from the provided text.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Retrieves the textual representation of the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Unique identifier assigned to a live enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Position in world units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Position {
    /// Horizontal world coordinate.
    pub x: f32,
    /// Vertical world coordinate.
    pub y: f32,
}

impl Position {
    /// Creates a new position from world coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another position.
    #[must_use]
    pub fn distance_to(self, other: Position) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Classification of a kill for reward and scaling purposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KillClass {
    /// Regular enemy from the tier pool.
    Normal,
    /// Elite enemy with boosted stats and guaranteed-floor loot.
    Elite,
    /// Zone boss.
    Boss,
}

/// Item rarity ladder tracked by the pity counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rarity {
    /// Baseline drop quality.
    Common,
    /// Slightly improved drop quality.
    Uncommon,
    /// Pity-tracked mid rarity.
    Rare,
    /// High rarity between rare and legendary.
    Epic,
    /// Pity-tracked top rarity below unique.
    Legendary,
    /// Pity-tracked apex rarity.
    Unique,
}

/// Combat stats produced by the external entity factory.
///
/// The kernel scales and tags these values; the formulas that produce them
/// belong to the collaborator.
#[derive(Clone, Debug, PartialEq)]
pub struct EntityStats {
    /// Current hit points.
    pub hp: f32,
    /// Maximum hit points.
    pub max_hp: f32,
    /// Damage dealt per attack.
    pub damage: f32,
    /// Experience granted on death.
    pub xp: u32,
    /// Collision radius in world units.
    pub size: f32,
    /// Peak movement speed in world units per second.
    pub speed: f32,
    /// Display name used by announcements.
    pub name: String,
}

/// Payload describing a confirmed death, routed into the reward economy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KillData {
    /// Experience carried by the dead enemy.
    pub xp: u32,
    /// World position where the enemy died.
    pub x: f32,
    /// World position where the enemy died.
    pub y: f32,
    /// Classification of the kill.
    pub class: KillClass,
}

/// AI behaviour state of a live enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AiState {
    /// Idling around the home point following the patrol hint.
    Patrol,
    /// Engaged with the player.
    Aggro,
    /// Heading back to the home point after disengaging.
    Return,
}

/// Patrol movement flavour assigned at spawn time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatrolKind {
    /// Orbit the home point at the patrol radius.
    Circle,
    /// Oscillate horizontally through the home point.
    Line,
    /// Drift randomly, staying within the patrol radius.
    Wander,
}

/// Live simulated enemy occupying the world.
///
/// Created by the world when a spawn descriptor activates and destroyed on
/// death or distance despawn; the descriptor survives and records the outcome.
#[derive(Clone, Debug)]
pub struct Enemy {
    /// Unique identifier for cross-referencing with spawn descriptors.
    pub id: EnemyId,
    /// Enemy type tag drawn from the tier pool.
    pub type_tag: String,
    /// Display name from the entity factory.
    pub name: String,
    /// Horizontal world position.
    pub x: f32,
    /// Vertical world position.
    pub y: f32,
    /// Horizontal velocity.
    pub vx: f32,
    /// Vertical velocity.
    pub vy: f32,
    /// Current hit points.
    pub hp: f32,
    /// Maximum hit points.
    pub max_hp: f32,
    /// Damage per attack.
    pub damage: f32,
    /// Experience granted on death.
    pub xp: u32,
    /// Collision radius.
    pub size: f32,
    /// Peak movement speed.
    pub speed: f32,
    /// Resolved level after the spawn-time level policy.
    pub level: u32,
    /// Reward classification.
    pub class: KillClass,
    /// Current AI behaviour state.
    pub ai: AiState,
    /// Home point the enemy leashes and returns to.
    pub home_x: f32,
    /// Home point the enemy leashes and returns to.
    pub home_y: f32,
    /// Patrol flavour while idle.
    pub patrol: PatrolKind,
    /// Patrol orbit radius.
    pub patrol_radius: f32,
    /// Current patrol phase angle.
    pub patrol_angle: f32,
    /// Orbit direction, `1.0` or `-1.0`.
    pub patrol_dir: f32,
    /// Distance at which the enemy notices the player.
    pub aggro_range: f32,
    /// Distance within which the enemy's attacks land; mirrors the aggro
    /// range unless a spawn overrides it.
    pub attack_range: f32,
    /// Distance from the player at which engagement breaks.
    pub disengage_range: f32,
    /// Distance from home beyond which the enemy force-returns.
    pub leash_range: f32,
    /// Distance from home at which a returning enemy settles.
    pub return_threshold: f32,
    /// Back-reference to the spawn descriptor that produced this enemy.
    pub spawn_slot: SpawnSlot,
}

impl Enemy {
    /// Current position of the enemy.
    #[must_use]
    pub const fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }
}

/// Read/write body of the player ship as seen by the kernel.
///
/// Movement and aiming are owned by the external input layer; the kernel
/// repositions the body on zone loads and resolves obstacle contacts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerBody {
    /// Horizontal world position.
    pub x: f32,
    /// Vertical world position.
    pub y: f32,
    /// Horizontal velocity.
    pub vx: f32,
    /// Vertical velocity.
    pub vy: f32,
    /// Collision radius.
    pub radius: f32,
}

impl PlayerBody {
    /// Creates a player body at the origin with the provided radius.
    #[must_use]
    pub const fn new(radius: f32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            radius,
        }
    }

    /// Current position of the body.
    #[must_use]
    pub const fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }
}

/// Capability set injected into every world call that reaches collaborators.
///
/// Replaces runtime module lookup with compile-time-checked dependencies: the
/// entity factory, the damage resolver, the player hull, and the announcement
/// sink are the only ways the kernel touches code it does not own.
pub trait Hooks {
    /// Produces base combat stats for a new enemy of the given type.
    fn spawn_entity(&mut self, type_tag: &str, x: f32, y: f32, class: KillClass) -> EntityStats;

    /// Applies damage to a live enemy, returning kill data when it dies.
    fn damage_enemy(&mut self, enemy: &mut Enemy, amount: f32, is_crit: bool) -> Option<KillData>;

    /// Routes direct damage (mine detonations) to the player hull.
    fn player_take_damage(&mut self, amount: f32);

    /// Fire-and-forget announcement; must never block the simulation step.
    fn show_announcement(&mut self, text: &str);
}

/// Events broadcast by the world after each lifecycle operation.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// A zone finished loading and the player was repositioned.
    ZoneLoaded {
        /// One-based depth of the loaded zone.
        depth: u32,
        /// Whether the zone is a boss arena.
        boss_zone: bool,
    },
    /// The active tier changed while descending.
    TierTransition {
        /// Tier that became active.
        tier: TierId,
    },
    /// A hub portal became permanently available.
    PortalUnlocked {
        /// Identifier of the unlocked portal.
        portal: String,
    },
    /// A one-time depth milestone fired.
    MilestoneUnlocked {
        /// Identifier of the granted unlock.
        unlock: String,
    },
    /// A spawn descriptor activated into a live enemy.
    EnemySpawned {
        /// Identifier of the new enemy.
        enemy: EnemyId,
        /// Reward classification.
        class: KillClass,
    },
    /// A live enemy was removed by the distance-despawn rule.
    EnemyDespawned {
        /// Identifier of the removed enemy.
        enemy: EnemyId,
    },
    /// A live enemy died and its spawn descriptor was marked killed.
    EnemyKilled {
        /// Identifier of the dead enemy.
        enemy: EnemyId,
        /// Reward classification.
        class: KillClass,
    },
    /// The zone boss died; victory and hub portals were injected.
    BossDefeated {
        /// Depth of the boss zone.
        depth: u32,
    },
    /// The player reached the zone exit.
    ExitReached {
        /// Depth the player is advancing to.
        next_depth: u32,
    },
    /// The player stepped into a portal.
    PortalEntered {
        /// Routing target of the portal.
        destination: PortalDestination,
    },
    /// A mine obstacle detonated on player contact.
    MineDetonated {
        /// Detonation point.
        x: f32,
        /// Detonation point.
        y: f32,
        /// Direct damage dealt to the player.
        damage: f32,
    },
    /// An item pickup dropped from a kill.
    ItemDropped {
        /// Lowest rarity the external item generator may roll.
        rarity_floor: Rarity,
        /// Item level carried by the pickup.
        ilvl: u32,
    },
    /// The player returned to the hub through a portal.
    ReturnedToHub,
}

#[cfg(test)]
mod tests {
    use super::{Position, Rarity, TierId};
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn distance_matches_expectation() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(3.0, 4.0);
        assert!((a.distance_to(b) - 5.0).abs() < f32::EPSILON);
        assert!((b.distance_to(a) - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn rarity_ordering_follows_ladder() {
        assert!(Rarity::Common < Rarity::Rare);
        assert!(Rarity::Rare < Rarity::Legendary);
        assert!(Rarity::Legendary < Rarity::Unique);
    }

    #[test]
    fn tier_id_round_trips_through_bincode() {
        assert_round_trip(&TierId::new("tier1"));
    }

    #[test]
    fn rarity_round_trips_through_bincode() {
        assert_round_trip(&Rarity::Legendary);
    }
}
