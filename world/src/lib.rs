#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world lifecycle manager.
//!
//! Owns the active zone, the live enemies, and the persistent profile, and
//! advances them frame by frame. All randomness flows through seed streams
//! derived from the act seed, so a campaign replays identically from its
//! seed text. External collaborators reach in only through [`Hooks`] and the
//! read-only [`query`] functions; everything else is driven by [`World`]
//! methods.

mod ai;

use log::{debug, error, info, warn};
use starbreak_core::{
    AiState, CampaignConfig, Enemy, EnemyId, Event, Hooks, KillClass, KillData, PatrolHint,
    PatrolKind, PlayerBody, Portal, PortalDestination, PortalKind, Position, Profile,
    SpawnDescriptor, SpawnSlot, TierConfig, TierId, Zone,
};
use starbreak_rng::{Seed, SeedStream};
use starbreak_system_depth_rules as depth_rules;
use starbreak_system_loot::{record_zone_entry, resolve_kill};
pub use starbreak_system_loot::{ItemPickup, KillRewards};
use starbreak_system_spatial_index::{Collider, ColliderBody, SpatialGrid};
use starbreak_system_zone_generation::{generate, generate_boss};
use thiserror::Error;

/// Distance at which a dormant spawn activates.
pub const SPAWN_RADIUS: f32 = 600.0;
/// Distance beyond which a live enemy is eligible for despawn.
pub const DESPAWN_RADIUS: f32 = 1200.0;
/// Boss spawns activate at this multiple of [`SPAWN_RADIUS`].
pub const BOSS_SPAWN_FACTOR: f32 = 1.5;
/// Exit contact distance.
pub const EXIT_CONTACT: f32 = 50.0;
/// Portal contact distance.
pub const PORTAL_CONTACT: f32 = 60.0;
/// Velocity restitution applied on solid obstacle contact.
pub const RESTITUTION: f32 = 0.8;
/// Mine splash radius.
pub const MINE_SPLASH_RADIUS: f32 = 100.0;
/// Fraction of mine damage applied to splashed enemies.
pub const MINE_SPLASH_FACTOR: f32 = 0.6;
/// Upper bound on a single frame step, in seconds.
pub const MAX_DT: f32 = 0.05;

const GRID_CELL_SIZE: f32 = 128.0;

/// How a campaign run begins.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Entry {
    /// Through a hub portal, at its configured start depth.
    Portal(String),
    /// Directly at a one-based depth.
    Depth(u32),
}

/// Errors surfaced by [`World::start`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorldError {
    /// The named portal is not part of the campaign.
    #[error("unknown portal {0:?}")]
    UnknownPortal(String),
    /// The named portal exists but has not been unlocked.
    #[error("portal {0:?} is locked")]
    PortalLocked(String),
    /// No zone could be installed for the requested entry.
    #[error("no zone available at depth {0}")]
    ZoneUnavailable(u32),
}

/// Authoritative simulation state.
pub struct World {
    campaign: CampaignConfig,
    profile: Profile,
    act_seed: Seed,
    zone_seed: Seed,
    zone_index: u32,
    zone: Option<Zone>,
    current_tier: Option<TierId>,
    enemies: Vec<Enemy>,
    next_enemy_id: u32,
    grid: SpatialGrid,
    spawn_stream: SeedStream,
    loot_stream: SeedStream,
}

fn resolve_tier(campaign: &CampaignConfig, depth: u32) -> Option<&TierConfig> {
    campaign.tier_for_depth(depth)
}

fn level_for_class(class: KillClass, player_level: u32, stream: &mut SeedStream) -> u32 {
    match class {
        KillClass::Normal => {
            let penalty = 1 + stream.next_below(2);
            player_level.saturating_sub(penalty).max(1)
        }
        KillClass::Elite => player_level.max(1),
        KillClass::Boss => player_level.max(1) + stream.next_below(6),
    }
}

fn level_scale(class: KillClass) -> f32 {
    match class {
        KillClass::Normal | KillClass::Elite => 1.10,
        KillClass::Boss => 1.15,
    }
}

fn instantiate(
    id: EnemyId,
    descriptor: &SpawnDescriptor,
    slot: SpawnSlot,
    class: KillClass,
    player_level: u32,
    stream: &mut SeedStream,
    hooks: &mut dyn Hooks,
) -> Enemy {
    let stats = hooks.spawn_entity(
        &descriptor.type_tag,
        descriptor.position.x,
        descriptor.position.y,
        class,
    );
    let level = level_for_class(class, player_level, stream);
    let factor = level_scale(class).powi(level as i32 - 1);

    let (patrol, patrol_radius) = match descriptor.patrol {
        Some(PatrolHint { kind, radius }) => (kind, radius),
        None => match class {
            KillClass::Normal => (PatrolKind::Wander, 110.0),
            KillClass::Elite => (PatrolKind::Circle, 140.0),
            KillClass::Boss => (PatrolKind::Circle, 220.0),
        },
    };
    // Engagement envelope; attack range mirrors aggro range, and the leash
    // is wide enough that a full patrol orbit never trips it.
    let aggro_range = match class {
        KillClass::Normal => 420.0,
        KillClass::Elite => 520.0,
        KillClass::Boss => 750.0,
    };
    let (disengage_mult, leash_mult, leash_radius_mult, return_floor) = match class {
        KillClass::Boss => (1.5, 2.0, 6.0, 60.0),
        _ => (1.65, 2.2, 5.0, 40.0),
    };
    let patrol_angle = stream.next_range(0.0, std::f32::consts::TAU);
    let patrol_dir = if class == KillClass::Boss {
        1.0
    } else if stream.chance(0.5) {
        1.0
    } else {
        -1.0
    };

    Enemy {
        id,
        type_tag: descriptor.type_tag.clone(),
        name: stats.name,
        x: descriptor.position.x,
        y: descriptor.position.y,
        vx: 0.0,
        vy: 0.0,
        hp: stats.hp * factor,
        max_hp: stats.max_hp * factor,
        damage: stats.damage * factor,
        xp: (stats.xp as f32 * factor) as u32,
        size: stats.size,
        speed: stats.speed,
        level,
        class,
        ai: AiState::Patrol,
        home_x: descriptor.position.x,
        home_y: descriptor.position.y,
        patrol,
        patrol_radius,
        patrol_angle,
        patrol_dir,
        aggro_range,
        attack_range: aggro_range,
        disengage_range: aggro_range * disengage_mult,
        leash_range: (aggro_range * leash_mult).max(patrol_radius * leash_radius_mult),
        return_threshold: (stats.size * 1.2).max(return_floor),
        spawn_slot: slot,
    }
}

impl World {
    /// Creates an idle world; nothing is installed until [`World::start`].
    #[must_use]
    pub fn new(campaign: CampaignConfig, profile: Profile) -> Self {
        Self {
            campaign,
            profile,
            act_seed: Seed::from_raw(0),
            zone_seed: Seed::from_raw(0),
            zone_index: 0,
            zone: None,
            current_tier: None,
            enemies: Vec::new(),
            next_enemy_id: 0,
            grid: SpatialGrid::new(GRID_CELL_SIZE),
            spawn_stream: Seed::from_raw(0).stream(),
            loot_stream: Seed::from_raw(0).stream(),
        }
    }

    /// Begins a campaign run from seed text and an entry point.
    pub fn start(
        &mut self,
        entry: Entry,
        seed_text: &str,
        player: &mut PlayerBody,
        hooks: &mut dyn Hooks,
        out: &mut Vec<Event>,
    ) -> Result<(), WorldError> {
        let depth = match entry {
            Entry::Depth(depth) => depth.max(1),
            Entry::Portal(id) => {
                let portal = self
                    .campaign
                    .portals
                    .iter()
                    .find(|def| def.id == id)
                    .ok_or_else(|| WorldError::UnknownPortal(id.clone()))?;
                if !portal.unlocked && !self.profile.portal_unlocked(&id) {
                    return Err(WorldError::PortalLocked(id));
                }
                portal.start_zone
            }
        };
        self.act_seed = Seed::from_text(seed_text);
        self.current_tier = None;
        self.zone = None;
        self.load_zone(depth, player, hooks, out);
        if self.zone.is_none() {
            return Err(WorldError::ZoneUnavailable(depth));
        }
        Ok(())
    }

    /// Generates and installs the zone at `index`.
    ///
    /// On generation failure the previous zone stays installed and the
    /// failure is logged.
    pub fn load_zone(
        &mut self,
        index: u32,
        player: &mut PlayerBody,
        hooks: &mut dyn Hooks,
        out: &mut Vec<Event>,
    ) {
        let Some(tier) = resolve_tier(&self.campaign, index) else {
            error!("no tier covers depth {index}");
            return;
        };
        let zone_seed = self.act_seed.combine(u64::from(index));
        let mods = depth_rules::sample_active(index, tier, zone_seed);
        let is_boss = index % tier.boss_cadence() == 0;
        let generated = if is_boss {
            generate_boss(tier, zone_seed, index, mods)
        } else {
            generate(tier, zone_seed, index, mods)
        };
        let zone = match generated {
            Ok(zone) => zone,
            Err(err) => {
                error!("zone {index} generation failed: {err}");
                return;
            }
        };

        if self.current_tier.as_ref() != Some(&tier.id) {
            self.current_tier = Some(tier.id.clone());
            out.push(Event::TierTransition {
                tier: tier.id.clone(),
            });
            hooks.show_announcement(&format!("Entering {}", tier.name));
            for portal in &self.campaign.portals {
                if portal.tier_id == tier.id
                    && !portal.unlocked
                    && !self.profile.portal_unlocked(&portal.id)
                {
                    let _ = self
                        .profile
                        .portals_unlocked
                        .insert(portal.id.clone(), true);
                    out.push(Event::PortalUnlocked {
                        portal: portal.id.clone(),
                    });
                    hooks.show_announcement(&format!("{} unlocked", portal.name));
                }
            }
        }

        player.x = zone.spawn.x;
        player.y = zone.spawn.y;
        player.vx = 0.0;
        player.vy = 0.0;

        self.enemies.clear();
        self.grid.clear();
        self.zone_index = index;
        self.zone_seed = zone_seed;
        self.profile.highest_zone = self.profile.highest_zone.max(index);
        self.spawn_stream = zone_seed.labeled("spawns").stream();
        self.loot_stream = zone_seed.labeled("loot").stream();
        record_zone_entry(&mut self.profile, zone_seed, &self.campaign.anti_exploit);

        let mut unlock_stream = zone_seed.labeled("unlock").stream();
        if let Some(unlock) =
            depth_rules::maybe_unlock(index, tier, &mut self.profile, &mut unlock_stream)
        {
            out.push(Event::MilestoneUnlocked {
                unlock: unlock.clone(),
            });
            hooks.show_announcement(&format!("Discovered: {unlock}"));
        }
        depth_rules::record_depth(&mut self.profile, index);

        info!(
            "zone {index} loaded (boss: {is_boss}, mods: {:?})",
            zone.mods
        );
        out.push(Event::ZoneLoaded {
            depth: index,
            boss_zone: is_boss,
        });
        self.zone = Some(zone);
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// Order within a frame: proximity spawn/despawn, AI, obstacle and mine
    /// resolution, exit/portal transitions, spatial rebuild. A zone
    /// transition cancels the remainder of the frame.
    pub fn update(
        &mut self,
        dt: f32,
        player: &mut PlayerBody,
        hooks: &mut dyn Hooks,
        out: &mut Vec<Event>,
    ) {
        if self.zone.is_none() {
            return;
        }
        let dt = dt.clamp(0.0, MAX_DT);

        self.process_spawns(player, hooks, out);
        for enemy in &mut self.enemies {
            ai::step(enemy, player, dt);
        }
        self.resolve_obstacles(player, hooks, out);
        if self.resolve_transitions(player, hooks, out) {
            return;
        }
        self.rebuild_grid();
    }

    /// Concludes an externally resolved kill: marks the spawn killed,
    /// removes the enemy, pays out rewards, and handles boss defeat.
    ///
    /// Returns `None` when the enemy is no longer live.
    pub fn on_enemy_killed(
        &mut self,
        enemy: EnemyId,
        kill: KillData,
        hooks: &mut dyn Hooks,
        out: &mut Vec<Event>,
    ) -> Option<KillRewards> {
        let Some(index) = self.enemies.iter().position(|e| e.id == enemy) else {
            debug!("kill reported for unknown enemy {}", enemy.get());
            return None;
        };
        let dead = self.enemies.remove(index);
        if let Some(zone) = self.zone.as_mut() {
            if let Some(descriptor) = zone.spawn_at_mut(dead.spawn_slot) {
                descriptor.killed = true;
                descriptor.deactivate();
            }
        }
        out.push(Event::EnemyKilled {
            enemy,
            class: dead.class,
        });

        let luck = self.profile.luck;
        let rewards = resolve_kill(
            &self.campaign.economy,
            &self.campaign.loot,
            &self.campaign.anti_exploit,
            &mut self.profile,
            kill,
            luck,
            self.zone_seed,
            &mut self.loot_stream,
        );
        if let Some(pickup) = rewards.pickup {
            out.push(Event::ItemDropped {
                rarity_floor: pickup.rarity_floor,
                ilvl: pickup.ilvl,
            });
        }

        if dead.class == KillClass::Boss {
            if let Some(zone) = self.zone.as_mut() {
                let centre = Position::new(zone.width * 0.5, zone.height * 0.5);
                zone.portals.push(Portal {
                    position: centre,
                    destination: PortalDestination::NextZone,
                    kind: PortalKind::Victory,
                });
                zone.portals.push(Portal {
                    position: Position::new(centre.x + 140.0, centre.y),
                    destination: PortalDestination::Hub,
                    kind: PortalKind::Hub,
                });
            }
            out.push(Event::BossDefeated {
                depth: self.zone_index,
            });
            hooks.show_announcement(&format!("{} defeated", dead.name));
        }
        Some(rewards)
    }

    fn process_spawns(
        &mut self,
        player: &mut PlayerBody,
        hooks: &mut dyn Hooks,
        out: &mut Vec<Event>,
    ) {
        let Some(zone) = self.zone.as_mut() else {
            return;
        };
        let player_pos = player.position();
        let slots: Vec<(SpawnSlot, KillClass)> = (0..zone.enemy_spawns.len())
            .map(|i| (SpawnSlot::Enemy(i), KillClass::Normal))
            .chain((0..zone.elite_spawns.len()).map(|i| (SpawnSlot::Elite(i), KillClass::Elite)))
            .chain(zone.boss_spawn.iter().map(|_| (SpawnSlot::Boss, KillClass::Boss)))
            .collect();

        for (slot, class) in slots {
            let Some(descriptor) = zone.spawn_at_mut(slot) else {
                continue;
            };
            if descriptor.killed {
                continue;
            }
            if descriptor.active {
                let live = descriptor
                    .enemy
                    .map(|id| self.enemies.iter().any(|e| e.id == id))
                    .unwrap_or(false);
                if !live {
                    debug!("spawn {slot:?} lost its enemy, deactivating");
                    descriptor.deactivate();
                }
                continue;
            }
            let radius = match class {
                KillClass::Boss => SPAWN_RADIUS * BOSS_SPAWN_FACTOR,
                _ => SPAWN_RADIUS,
            };
            if descriptor.position.distance_to(player_pos) < radius {
                let id = EnemyId::new(self.next_enemy_id);
                self.next_enemy_id += 1;
                let enemy = instantiate(
                    id,
                    descriptor,
                    slot,
                    class,
                    self.profile.level,
                    &mut self.spawn_stream,
                    hooks,
                );
                descriptor.active = true;
                descriptor.enemy = Some(id);
                self.enemies.push(enemy);
                out.push(Event::EnemySpawned { enemy: id, class });
            }
        }

        // Distance despawn; an engaged enemy walks home before it can vanish.
        let mut removed = Vec::new();
        for enemy in &mut self.enemies {
            if enemy.position().distance_to(player_pos) <= DESPAWN_RADIUS {
                continue;
            }
            match enemy.ai {
                AiState::Aggro => enemy.ai = AiState::Return,
                AiState::Patrol => removed.push(enemy.id),
                AiState::Return => {
                    let home_dist =
                        (enemy.home_x - enemy.x).hypot(enemy.home_y - enemy.y);
                    if home_dist <= enemy.return_threshold {
                        removed.push(enemy.id);
                    }
                }
            }
        }
        for id in removed {
            if let Some(index) = self.enemies.iter().position(|e| e.id == id) {
                let enemy = self.enemies.remove(index);
                if let Some(descriptor) = zone.spawn_at_mut(enemy.spawn_slot) {
                    descriptor.deactivate();
                }
                out.push(Event::EnemyDespawned { enemy: id });
            }
        }
    }

    fn resolve_obstacles(
        &mut self,
        player: &mut PlayerBody,
        hooks: &mut dyn Hooks,
        out: &mut Vec<Event>,
    ) {
        let Some(zone) = self.zone.as_mut() else {
            return;
        };
        let mut detonations = Vec::new();
        for (index, obstacle) in zone.obstacles.iter_mut().enumerate() {
            if obstacle.destroyed {
                continue;
            }
            let dx = player.x - obstacle.position.x;
            let dy = player.y - obstacle.position.y;
            let dist = dx.hypot(dy);
            let contact = obstacle.radius + player.radius;
            if dist >= contact {
                continue;
            }
            if obstacle.is_solid() {
                let (nx, ny) = if dist > f32::EPSILON {
                    (dx / dist, dy / dist)
                } else {
                    (1.0, 0.0)
                };
                let penetration = contact - dist;
                player.x += nx * penetration;
                player.y += ny * penetration;
                // Damp the inward component; contacts scrub speed, they
                // never fling the ship back out.
                let inward = player.vx * nx + player.vy * ny;
                if inward < 0.0 {
                    player.vx -= RESTITUTION * inward * nx;
                    player.vy -= RESTITUTION * inward * ny;
                }
            } else {
                obstacle.destroyed = true;
                detonations.push((index, obstacle.position));
            }
        }

        let mut kills = Vec::new();
        for (index, position) in detonations {
            let damage = match zone.obstacles[index].kind {
                starbreak_core::ObstacleKind::Mine { damage } => damage,
                _ => continue,
            };
            hooks.player_take_damage(damage);
            out.push(Event::MineDetonated {
                x: position.x,
                y: position.y,
                damage,
            });
            let splash = damage * MINE_SPLASH_FACTOR;
            for enemy in &mut self.enemies {
                if enemy.position().distance_to(position) <= MINE_SPLASH_RADIUS {
                    if let Some(kill) = hooks.damage_enemy(enemy, splash, false) {
                        kills.push((enemy.id, kill));
                    }
                }
            }
        }
        for (id, kill) in kills {
            let _ = self.on_enemy_killed(id, kill, hooks, out);
        }
    }

    fn resolve_transitions(
        &mut self,
        player: &mut PlayerBody,
        hooks: &mut dyn Hooks,
        out: &mut Vec<Event>,
    ) -> bool {
        let player_pos = player.position();
        let (exit, entered) = match self.zone.as_ref() {
            Some(zone) => (
                zone.exit,
                zone.portals
                    .iter()
                    .find(|portal| portal.position.distance_to(player_pos) < PORTAL_CONTACT)
                    .map(|portal| portal.destination.clone()),
            ),
            None => return false,
        };

        if let Some(exit) = exit {
            if exit.distance_to(player_pos) < EXIT_CONTACT {
                let next = self.zone_index + 1;
                self.profile.highest_zone = self.profile.highest_zone.max(next);
                out.push(Event::ExitReached { next_depth: next });
                self.load_zone(next, player, hooks, out);
                return true;
            }
        }

        let Some(destination) = entered else {
            return false;
        };
        out.push(Event::PortalEntered {
            destination: destination.clone(),
        });
        match destination {
            PortalDestination::NextZone => {
                self.load_zone(self.zone_index + 1, player, hooks, out);
            }
            PortalDestination::Hub => {
                self.zone = None;
                self.enemies.clear();
                self.grid.clear();
                out.push(Event::ReturnedToHub);
            }
            PortalDestination::Depth(depth) => {
                self.load_zone(depth.max(1), player, hooks, out);
            }
            PortalDestination::Tier(id) => match self.campaign.tier(&id) {
                Some(tier) => {
                    let start = tier.zone_start;
                    self.load_zone(start, player, hooks, out);
                }
                None => warn!("portal leads to unknown tier {:?}", id.as_str()),
            },
        }
        true
    }

    fn rebuild_grid(&mut self) {
        self.grid.clear();
        for enemy in &self.enemies {
            self.grid.insert(Collider {
                body: ColliderBody::Enemy(enemy.id),
                x: enemy.x,
                y: enemy.y,
                radius: enemy.size,
            });
        }
        if let Some(zone) = self.zone.as_ref() {
            for (index, obstacle) in zone.obstacles.iter().enumerate() {
                if !obstacle.destroyed {
                    self.grid.insert(Collider {
                        body: ColliderBody::Obstacle(index),
                        x: obstacle.position.x,
                        y: obstacle.position.y,
                        radius: obstacle.radius,
                    });
                }
            }
        }
    }
}

/// Read-only views over the world for collaborators and tests.
pub mod query {
    use super::World;
    use starbreak_core::{Enemy, Profile, TierConfig, Zone};
    use starbreak_system_spatial_index::SpatialGrid;

    /// The installed zone, if any.
    #[must_use]
    pub fn active_zone(world: &World) -> Option<&Zone> {
        world.zone.as_ref()
    }

    /// Current one-based depth.
    #[must_use]
    pub fn zone_index(world: &World) -> u32 {
        world.zone_index
    }

    /// Tier descriptor covering the current depth.
    #[must_use]
    pub fn active_tier(world: &World) -> Option<&TierConfig> {
        super::resolve_tier(&world.campaign, world.zone_index)
    }

    /// Live enemies in frame order.
    #[must_use]
    pub fn enemies(world: &World) -> &[Enemy] {
        &world.enemies
    }

    /// Spatial grid as of the last completed frame.
    #[must_use]
    pub fn grid(world: &World) -> &SpatialGrid {
        &world.grid
    }

    /// Persistent profile state.
    #[must_use]
    pub fn profile(world: &World) -> &Profile {
        &world.profile
    }
}
