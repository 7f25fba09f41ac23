//! Generated zone data model.
//!
//! A zone is immutable once generated except for the per-spawn lifecycle
//! flags, obstacle `destroyed` flags, and boss-death portal injection; the
//! geometry itself never changes after generation.

use serde::{Deserialize, Serialize};

use crate::{EnemyId, PatrolKind, Position, TierId};

/// Persistent record of a potential encounter location and its lifecycle.
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnDescriptor {
    /// World position the enemy spawns at and leashes to.
    pub position: Position,
    /// Enemy type tag drawn from the tier pool.
    pub type_tag: String,
    /// Optional patrol behaviour hint applied at activation.
    pub patrol: Option<PatrolHint>,
    /// Permanently set once the spawned enemy dies.
    pub killed: bool,
    /// Whether a live enemy currently backs this descriptor.
    pub active: bool,
    /// Identifier of the live enemy while active.
    pub enemy: Option<EnemyId>,
}

impl SpawnDescriptor {
    /// Creates a dormant descriptor at the provided position.
    #[must_use]
    pub fn new(position: Position, type_tag: impl Into<String>, patrol: Option<PatrolHint>) -> Self {
        Self {
            position,
            type_tag: type_tag.into(),
            patrol,
            killed: false,
            active: false,
            enemy: None,
        }
    }

    /// Clears the live-enemy association without marking the spawn killed.
    pub fn deactivate(&mut self) {
        self.active = false;
        self.enemy = None;
    }
}

/// Patrol behaviour hint attached to a spawn descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatrolHint {
    /// Patrol movement flavour.
    pub kind: PatrolKind,
    /// Patrol orbit radius in world units.
    pub radius: f32,
}

/// Identifies which spawn descriptor of the active zone backs a live enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpawnSlot {
    /// Index into [`Zone::enemy_spawns`].
    Enemy(usize),
    /// Index into [`Zone::elite_spawns`].
    Elite(usize),
    /// The zone's single boss spawn.
    Boss,
}

/// Obstacle flavour; mines carry their contact damage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ObstacleKind {
    /// Large solid rock.
    Asteroid,
    /// Small solid wreckage shard.
    Debris,
    /// Detonates on player contact, then stays permanently inert.
    Mine {
        /// Direct damage dealt to the player on detonation.
        damage: f32,
    },
    /// Solid station ruin column.
    Pillar,
}

/// Circular obstacle placed during zone generation.
#[derive(Clone, Debug, PartialEq)]
pub struct Obstacle {
    /// Obstacle flavour.
    pub kind: ObstacleKind,
    /// Centre position.
    pub position: Position,
    /// Collision radius.
    pub radius: f32,
    /// Set when a mine detonates or the obstacle is shot down.
    pub destroyed: bool,
}

impl Obstacle {
    /// Whether the obstacle blocks movement (mines trigger instead of block).
    #[must_use]
    pub const fn is_solid(&self) -> bool {
        !matches!(self.kind, ObstacleKind::Mine { .. })
    }
}

/// Non-colliding visual scatter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Decoration {
    /// World position.
    pub position: Position,
    /// Render scale multiplier.
    pub scale: f32,
    /// Render opacity in `[0,1]`.
    pub alpha: f32,
}

/// Routing target of a portal.
#[derive(Clone, Debug, PartialEq)]
pub enum PortalDestination {
    /// Advance to the next zone index.
    NextZone,
    /// Return to the hub.
    Hub,
    /// Jump to a specific one-based depth.
    Depth(u32),
    /// Enter the first zone of a specific tier.
    Tier(TierId),
}

/// Visual category of a portal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PortalKind {
    /// Granted by a boss kill; advances depth.
    Victory,
    /// Returns to the hub.
    Hub,
    /// Ordinary routing portal placed by generation.
    Standard,
}

/// Traversable portal within a zone.
#[derive(Clone, Debug, PartialEq)]
pub struct Portal {
    /// World position.
    pub position: Position,
    /// Routing target.
    pub destination: PortalDestination,
    /// Visual category.
    pub kind: PortalKind,
}

/// Single star in a parallax layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Star {
    /// Layer-space position.
    pub x: f32,
    /// Layer-space position.
    pub y: f32,
    /// Render size.
    pub size: f32,
    /// Base brightness in `[0,1]`.
    pub brightness: f32,
    /// Whether the star twinkles.
    pub twinkle: bool,
}

/// Star-field parallax layer.
#[derive(Clone, Debug, PartialEq)]
pub struct StarLayer {
    /// Backdrop colour as a `#rrggbb` string.
    pub color: String,
    /// Camera scroll multiplier.
    pub scroll_speed: f32,
    /// Stars scattered across the layer.
    pub stars: Vec<Star>,
}

/// Nebula wisp in the foreground parallax layer.
#[derive(Clone, Debug, PartialEq)]
pub struct NebulaWisp {
    /// Layer-space position.
    pub x: f32,
    /// Layer-space position.
    pub y: f32,
    /// Ellipse width.
    pub width: f32,
    /// Ellipse height.
    pub height: f32,
    /// Ellipse rotation in radians.
    pub rotation: f32,
    /// Render opacity in `[0,1]`.
    pub alpha: f32,
    /// Fill colour as a `#rrggbb` string.
    pub color: String,
}

/// Foreground wisp parallax layer.
#[derive(Clone, Debug, PartialEq)]
pub struct WispLayer {
    /// Camera scroll multiplier.
    pub scroll_speed: f32,
    /// Wisps scattered across the layer.
    pub wisps: Vec<NebulaWisp>,
}

/// Parallax background and foreground descriptions for the render layer.
#[derive(Clone, Debug, PartialEq)]
pub struct Parallax {
    /// Deep star field.
    pub background: StarLayer,
    /// Mid-distance star field.
    pub midground: StarLayer,
    /// Foreground nebula wisps.
    pub foreground: WispLayer,
}

/// Generated content for one depth value.
#[derive(Clone, Debug, PartialEq)]
pub struct Zone {
    /// Playable width in world units.
    pub width: f32,
    /// Playable height in world units.
    pub height: f32,
    /// One-based depth of the zone.
    pub depth: u32,
    /// Player entry point.
    pub spawn: Position,
    /// Exit point; `None` for boss zones, which grant portals instead.
    pub exit: Option<Position>,
    /// Ordered regular-enemy spawn descriptors.
    pub enemy_spawns: Vec<SpawnDescriptor>,
    /// Ordered elite spawn descriptors.
    pub elite_spawns: Vec<SpawnDescriptor>,
    /// Boss spawn descriptor for boss zones.
    pub boss_spawn: Option<SpawnDescriptor>,
    /// Typed circular obstacles.
    pub obstacles: Vec<Obstacle>,
    /// Non-colliding visual scatter.
    pub decorations: Vec<Decoration>,
    /// Traversable portals; boss deaths inject victory and hub portals.
    pub portals: Vec<Portal>,
    /// Parallax layer descriptions.
    pub parallax: Parallax,
    /// Identifiers of the modifiers active in this zone.
    pub mods: Vec<String>,
}

impl Zone {
    /// Whether the zone is a boss arena (no standard exit).
    #[must_use]
    pub const fn is_boss_zone(&self) -> bool {
        self.boss_spawn.is_some()
    }

    /// Looks up the spawn descriptor referenced by a slot, if it exists.
    #[must_use]
    pub fn spawn_at(&self, slot: SpawnSlot) -> Option<&SpawnDescriptor> {
        match slot {
            SpawnSlot::Enemy(index) => self.enemy_spawns.get(index),
            SpawnSlot::Elite(index) => self.elite_spawns.get(index),
            SpawnSlot::Boss => self.boss_spawn.as_ref(),
        }
    }

    /// Mutable variant of [`Zone::spawn_at`].
    #[must_use]
    pub fn spawn_at_mut(&mut self, slot: SpawnSlot) -> Option<&mut SpawnDescriptor> {
        match slot {
            SpawnSlot::Enemy(index) => self.enemy_spawns.get_mut(index),
            SpawnSlot::Elite(index) => self.elite_spawns.get_mut(index),
            SpawnSlot::Boss => self.boss_spawn.as_mut(),
        }
    }
}
