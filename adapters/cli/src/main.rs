#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless simulation harness.
//!
//! Runs a campaign with an autopilot pilot: fly toward the current goal
//! (exit, boss, or victory portal), shoot whatever comes close, absorb
//! contacts, and keep going for the requested number of frames. Useful for
//! soak-testing determinism and for eyeballing the economy from a terminal.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec2;
use log::{error, info};
use starbreak_core::{
    CampaignConfig, Enemy, EntityStats, Event, Hooks, KillClass, KillData, PlayerBody, PortalKind,
    Profile,
};
use starbreak_world::{query, Entry, World};

const FRAME_DT: f32 = 1.0 / 60.0;
const PILOT_SPEED: f32 = 260.0;
const WEAPON_RANGE: f32 = 220.0;
const WEAPON_DPS: f32 = 90.0;

#[derive(Parser)]
#[command(name = "starbreak", about = "Headless Starbreak campaign runner")]
struct Args {
    /// Campaign seed text.
    #[arg(long, default_value = "act1_1000")]
    seed: String,

    /// Start directly at a depth instead of through a portal.
    #[arg(long, conflicts_with = "portal")]
    depth: Option<u32>,

    /// Hub portal to enter through.
    #[arg(long, default_value = "portal_tier1")]
    portal: String,

    /// Number of frames to simulate.
    #[arg(long, default_value_t = 3600)]
    frames: u32,

    /// Optional TOML campaign file; the built-in campaign is used otherwise.
    #[arg(long)]
    campaign: Option<std::path::PathBuf>,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

struct Pilot {
    hp: f32,
    announcements: u32,
}

impl Hooks for Pilot {
    fn spawn_entity(&mut self, type_tag: &str, _x: f32, _y: f32, class: KillClass) -> EntityStats {
        let (hp, damage, xp, size, speed) = match class {
            KillClass::Normal => (24.0, 5.0, 10, 14.0, 130.0),
            KillClass::Elite => (110.0, 11.0, 45, 24.0, 115.0),
            KillClass::Boss => (900.0, 28.0, 500, 52.0, 95.0),
        };
        EntityStats {
            hp,
            max_hp: hp,
            damage,
            xp,
            size,
            speed,
            name: type_tag.to_owned(),
        }
    }

    fn damage_enemy(&mut self, enemy: &mut Enemy, amount: f32, _is_crit: bool) -> Option<KillData> {
        enemy.hp -= amount;
        if enemy.hp <= 0.0 {
            Some(KillData {
                xp: enemy.xp,
                x: enemy.x,
                y: enemy.y,
                class: enemy.class,
            })
        } else {
            None
        }
    }

    fn player_take_damage(&mut self, amount: f32) {
        self.hp = (self.hp - amount).max(0.0);
    }

    fn show_announcement(&mut self, text: &str) {
        self.announcements += 1;
        println!(">> {text}");
    }
}

#[derive(Default)]
struct RunTally {
    kills: u32,
    boss_kills: u32,
    drops: u32,
    cells: u64,
    scrap: u64,
    xp: u64,
    zones_cleared: u32,
    panics: u32,
}

fn load_campaign(path: Option<&std::path::Path>) -> Result<CampaignConfig> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading campaign file {}", path.display()))?;
            toml::from_str(&text).context("parsing campaign file")
        }
        None => Ok(CampaignConfig::default_campaign()),
    }
}

/// Where the autopilot wants to go this frame.
fn goal(world: &World) -> Option<Vec2> {
    let zone = query::active_zone(world)?;
    if let Some(exit) = zone.exit {
        return Some(Vec2::new(exit.x, exit.y));
    }
    if let Some(boss) = zone.boss_spawn.as_ref() {
        if !boss.killed {
            return Some(Vec2::new(boss.position.x, boss.position.y));
        }
    }
    zone.portals
        .iter()
        .find(|p| p.kind == PortalKind::Victory)
        .map(|p| Vec2::new(p.position.x, p.position.y))
}

fn steer(player: &mut PlayerBody, target: Vec2, dt: f32) {
    let position = Vec2::new(player.x, player.y);
    let to_target = target - position;
    if to_target.length_squared() < 1.0 {
        player.vx = 0.0;
        player.vy = 0.0;
        return;
    }
    let velocity = to_target.normalize() * PILOT_SPEED;
    player.vx = velocity.x;
    player.vy = velocity.y;
    player.x += player.vx * dt;
    player.y += player.vy * dt;
}

/// Return fire: every enemy with the pilot inside its attack range lands
/// its damage-per-second on the hull.
fn absorb_return_fire(world: &World, player: &PlayerBody, pilot: &mut Pilot, dt: f32) {
    let incoming: f32 = query::enemies(world)
        .iter()
        .filter(|e| (e.x - player.x).hypot(e.y - player.y) <= e.attack_range)
        .map(|e| e.damage * dt)
        .sum();
    if incoming > 0.0 {
        pilot.player_take_damage(incoming);
    }
}

/// Pours weapon damage into the nearest enemy and reports confirmed kills.
fn fire_weapons(
    world: &mut World,
    player: &PlayerBody,
    pilot: &mut Pilot,
    damage_ledger: &mut HashMap<u32, f32>,
    dt: f32,
    events: &mut Vec<Event>,
) -> Option<starbreak_world::KillRewards> {
    let target = query::enemies(world)
        .iter()
        .map(|e| {
            let dist = (e.x - player.x).hypot(e.y - player.y);
            (e.id, e.hp, e.xp, e.x, e.y, e.class, dist)
        })
        .filter(|&(.., dist)| dist <= WEAPON_RANGE)
        .min_by(|a, b| a.6.total_cmp(&b.6))?;

    let (id, hp, xp, x, y, class, _) = target;
    let done = damage_ledger.entry(id.get()).or_insert(0.0);
    *done += WEAPON_DPS * dt;
    if *done < hp {
        return None;
    }
    let _ = damage_ledger.remove(&id.get());
    world.on_enemy_killed(id, KillData { xp, x, y, class }, pilot, events)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let campaign = load_campaign(args.campaign.as_deref())?;
    let mut world = World::new(campaign, Profile::default());
    let mut player = PlayerBody::new(16.0);
    let mut pilot = Pilot {
        hp: 1000.0,
        announcements: 0,
    };
    let mut events = Vec::new();

    let entry = match args.depth {
        Some(depth) => Entry::Depth(depth),
        None => Entry::Portal(args.portal.clone()),
    };
    world
        .start(entry, &args.seed, &mut player, &mut pilot, &mut events)
        .context("starting campaign")?;

    let mut tally = RunTally::default();
    let mut damage_ledger: HashMap<u32, f32> = HashMap::new();

    for frame in 0..args.frames {
        let stepped = catch_unwind(AssertUnwindSafe(|| {
            if let Some(target) = goal(&world) {
                steer(&mut player, target, FRAME_DT);
            }
            world.update(FRAME_DT, &mut player, &mut pilot, &mut events);
            absorb_return_fire(&world, &player, &mut pilot, FRAME_DT);
            if let Some(rewards) = fire_weapons(
                &mut world,
                &player,
                &mut pilot,
                &mut damage_ledger,
                FRAME_DT,
                &mut events,
            ) {
                tally.cells += u64::from(rewards.cells);
                tally.scrap += u64::from(rewards.scrap);
                tally.xp += u64::from(rewards.xp);
            }
        }));
        if stepped.is_err() {
            tally.panics += 1;
            error!("frame {frame} panicked; continuing");
            continue;
        }

        for event in events.drain(..) {
            match event {
                Event::EnemyKilled { class, .. } => {
                    tally.kills += 1;
                    if class == KillClass::Boss {
                        tally.boss_kills += 1;
                    }
                }
                Event::ItemDropped { rarity_floor, ilvl } => {
                    tally.drops += 1;
                    info!("drop: floor {rarity_floor:?} ilvl {ilvl}");
                }
                Event::ZoneLoaded { depth, boss_zone } => {
                    tally.zones_cleared += 1;
                    damage_ledger.clear();
                    info!("entered zone {depth} (boss: {boss_zone})");
                }
                Event::ReturnedToHub => info!("returned to hub"),
                _ => {}
            }
        }

        if query::active_zone(&world).is_none() {
            break;
        }
    }

    let profile = query::profile(&world);
    println!("--- run summary ---");
    println!("seed:          {}", args.seed);
    println!("depth reached: {}", profile.highest_zone);
    println!("zones entered: {}", tally.zones_cleared);
    println!("kills:         {} ({} bosses)", tally.kills, tally.boss_kills);
    println!("drops:         {}", tally.drops);
    println!("cells/scrap:   {}/{}", tally.cells, tally.scrap);
    println!("xp:            {}", tally.xp);
    println!("hull left:     {:.0}", pilot.hp);
    println!("announcements: {}", pilot.announcements);
    if tally.panics > 0 {
        println!("panicked frames: {}", tally.panics);
    }
    Ok(())
}
