#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure zone generator.
//!
//! Both entry points expand a zone seed into a complete [`Zone`] with a fixed
//! draw order over the `"gen"` stream of the seed:
//!
//! 1. dimensions
//! 2. player spawn point
//! 3. exit point (standard zones only)
//! 4. enemy spawns
//! 5. elite spawns
//! 6. obstacles
//! 7. decorations
//! 8. parallax layers
//!
//! Reordering, inserting, or removing draws changes every zone produced from
//! existing seeds, so any edit here is a save-compatibility change.

use starbreak_core::{
    Decoration, NebulaWisp, Obstacle, ObstacleKind, Parallax, PatrolHint, PatrolKind, Position,
    SpawnDescriptor, Star, StarLayer, TierConfig, WispLayer, Zone,
};
use starbreak_rng::{Seed, SeedStream};
use thiserror::Error;

/// Zone generation failure; the caller must keep the previous zone installed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenerationError {
    /// The tier defines no regular enemy types.
    #[error("tier {tier} has no enemy types")]
    MissingEnemyPool {
        /// Offending tier identifier.
        tier: String,
    },
    /// A boss zone was requested for a tier without a boss type.
    #[error("tier {tier} has no boss type")]
    MissingBossType {
        /// Offending tier identifier.
        tier: String,
    },
}

const WISP_COLORS: [&str; 3] = ["#3a2a5a", "#1f3a4a", "#4a2a3a"];

/// Generates a standard zone.
pub fn generate(
    tier: &TierConfig,
    zone_seed: Seed,
    depth: u32,
    mods: Vec<String>,
) -> Result<Zone, GenerationError> {
    if tier.enemy_types.is_empty() {
        return Err(GenerationError::MissingEnemyPool {
            tier: tier.id.as_str().to_owned(),
        });
    }
    let mut stream = zone_seed.labeled("gen").stream();

    let width = stream.next_range(2200.0, 3000.0) + (depth.min(40) as f32) * 10.0;
    let height = stream.next_range(1600.0, 2200.0) + (depth.min(40) as f32) * 8.0;

    let spawn = Position::new(
        stream.next_range(150.0, 350.0),
        stream.next_range(height * 0.35, height * 0.65),
    );
    let exit = Position::new(
        width - stream.next_range(150.0, 350.0),
        stream.next_range(height * 0.25, height * 0.75),
    );

    let enemy_count = 6 + stream.next_below(4) + (depth / 4).min(8);
    let enemy_spawns = roll_spawns(
        &mut stream,
        enemy_count as usize,
        &tier.enemy_types,
        width,
        height,
        spawn,
    );

    let elite_count = if tier.elite_types.is_empty() {
        0
    } else {
        (depth / 5).min(3) as usize
    };
    let elite_spawns = roll_spawns(
        &mut stream,
        elite_count,
        &tier.elite_types,
        width,
        height,
        spawn,
    );

    let obstacle_count = (8 + stream.next_below(7)) as usize;
    let obstacles = roll_obstacles(
        &mut stream,
        obstacle_count,
        depth,
        width,
        height,
        &[spawn, exit],
    );

    let decorations = roll_decorations(&mut stream, width, height);
    let parallax = roll_parallax(&mut stream, tier, width, height);

    Ok(Zone {
        width,
        height,
        depth,
        spawn,
        exit: Some(exit),
        enemy_spawns,
        elite_spawns,
        boss_spawn: None,
        obstacles,
        decorations,
        portals: Vec::new(),
        parallax,
        mods,
    })
}

/// Generates a boss arena: no exit, a single boss spawn at the arena point,
/// a reduced obstacle field, same parallax pipeline.
pub fn generate_boss(
    tier: &TierConfig,
    zone_seed: Seed,
    depth: u32,
    mods: Vec<String>,
) -> Result<Zone, GenerationError> {
    let boss_type = tier
        .boss_type
        .as_ref()
        .ok_or_else(|| GenerationError::MissingBossType {
            tier: tier.id.as_str().to_owned(),
        })?;
    let mut stream = zone_seed.labeled("gen").stream();

    let width = stream.next_range(1600.0, 2000.0);
    let height = stream.next_range(1400.0, 1800.0);

    let spawn = Position::new(
        stream.next_range(150.0, 300.0),
        height * 0.5 + stream.next_range(-80.0, 80.0),
    );
    let arena = Position::new(
        width * 0.72 + stream.next_range(-60.0, 60.0),
        height * 0.5 + stream.next_range(-60.0, 60.0),
    );
    let boss_spawn = SpawnDescriptor::new(arena, boss_type.clone(), None);

    // The arena centre stays clear; boss-death portals are placed there.
    let centre = Position::new(width * 0.5, height * 0.5);
    let obstacle_count = (3 + stream.next_below(3)) as usize;
    let obstacles = roll_obstacles(
        &mut stream,
        obstacle_count,
        depth,
        width,
        height,
        &[spawn, arena, centre],
    );

    let decorations = roll_decorations(&mut stream, width, height);
    let parallax = roll_parallax(&mut stream, tier, width, height);

    Ok(Zone {
        width,
        height,
        depth,
        spawn,
        exit: None,
        enemy_spawns: Vec::new(),
        elite_spawns: Vec::new(),
        boss_spawn: Some(boss_spawn),
        obstacles,
        decorations,
        portals: Vec::new(),
        parallax,
        mods,
    })
}

fn roll_spawns(
    stream: &mut SeedStream,
    count: usize,
    pool: &[String],
    width: f32,
    height: f32,
    player_spawn: Position,
) -> Vec<SpawnDescriptor> {
    let mut spawns = Vec::with_capacity(count);
    for _ in 0..count {
        let mut position = Position::new(
            stream.next_range(200.0, width - 200.0),
            stream.next_range(150.0, height - 150.0),
        );
        // Keep encounters off the player's entry point.
        if position.distance_to(player_spawn) < 400.0 {
            position.x = (position.x + width * 0.5) % (width - 200.0) + 100.0;
        }
        let type_tag = pool[stream.next_below(pool.len() as u32) as usize].clone();
        let patrol = if stream.chance(0.8) {
            let kind = match stream.next_below(3) {
                0 => PatrolKind::Circle,
                1 => PatrolKind::Line,
                _ => PatrolKind::Wander,
            };
            Some(PatrolHint {
                kind,
                radius: stream.next_range(60.0, 140.0),
            })
        } else {
            None
        };
        spawns.push(SpawnDescriptor::new(position, type_tag, patrol));
    }
    spawns
}

fn roll_obstacles(
    stream: &mut SeedStream,
    count: usize,
    depth: u32,
    width: f32,
    height: f32,
    keep_clear: &[Position],
) -> Vec<Obstacle> {
    let mut obstacles = Vec::with_capacity(count);
    for _ in 0..count {
        let mut position = Position::new(
            stream.next_range(100.0, width - 100.0),
            stream.next_range(100.0, height - 100.0),
        );
        for _ in 0..8 {
            if keep_clear.iter().all(|p| position.distance_to(*p) >= 250.0) {
                break;
            }
            position.x = (position.x + width * 0.37) % (width - 200.0) + 100.0;
            position.y = (position.y + height * 0.23) % (height - 200.0) + 100.0;
        }
        let roll = stream.next_unit();
        let (kind, radius) = if roll < 0.5 {
            (ObstacleKind::Asteroid, stream.next_range(35.0, 90.0))
        } else if roll < 0.75 {
            (ObstacleKind::Debris, stream.next_range(15.0, 30.0))
        } else if roll < 0.9 && depth >= 3 {
            (
                ObstacleKind::Mine {
                    damage: 10.0 + depth as f32,
                },
                stream.next_range(12.0, 18.0),
            )
        } else {
            (ObstacleKind::Pillar, stream.next_range(25.0, 55.0))
        };
        obstacles.push(Obstacle {
            kind,
            position,
            radius,
            destroyed: false,
        });
    }
    obstacles
}

fn roll_decorations(stream: &mut SeedStream, width: f32, height: f32) -> Vec<Decoration> {
    let count = (10 + stream.next_below(11)) as usize;
    let mut decorations = Vec::with_capacity(count);
    for _ in 0..count {
        decorations.push(Decoration {
            position: Position::new(
                stream.next_range(0.0, width),
                stream.next_range(0.0, height),
            ),
            scale: stream.next_range(0.4, 1.6),
            alpha: stream.next_range(0.2, 0.8),
        });
    }
    decorations
}

fn roll_star_layer(
    stream: &mut SeedStream,
    color: &str,
    scroll_speed: f32,
    count: usize,
    width: f32,
    height: f32,
) -> StarLayer {
    let mut stars = Vec::with_capacity(count);
    for _ in 0..count {
        stars.push(Star {
            x: stream.next_range(0.0, width),
            y: stream.next_range(0.0, height),
            size: stream.next_range(0.5, 2.5),
            brightness: stream.next_range(0.3, 1.0),
            twinkle: stream.chance(0.25),
        });
    }
    StarLayer {
        color: color.to_owned(),
        scroll_speed,
        stars,
    }
}

fn roll_parallax(stream: &mut SeedStream, tier: &TierConfig, width: f32, height: f32) -> Parallax {
    let background = roll_star_layer(stream, &tier.backdrop, 0.1, 60, width, height);
    let midground = roll_star_layer(stream, &tier.backdrop, 0.3, 40, width, height);

    let wisp_count = (4 + stream.next_below(4)) as usize;
    let mut wisps = Vec::with_capacity(wisp_count);
    for _ in 0..wisp_count {
        let color = WISP_COLORS[stream.next_below(WISP_COLORS.len() as u32) as usize];
        wisps.push(NebulaWisp {
            x: stream.next_range(0.0, width),
            y: stream.next_range(0.0, height),
            width: stream.next_range(180.0, 420.0),
            height: stream.next_range(90.0, 220.0),
            rotation: stream.next_range(0.0, std::f32::consts::PI),
            alpha: stream.next_range(0.05, 0.2),
            color: color.to_owned(),
        });
    }
    Parallax {
        background,
        midground,
        foreground: WispLayer {
            scroll_speed: 0.6,
            wisps,
        },
    }
}
