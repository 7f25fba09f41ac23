//! End-to-end lifecycle coverage: zone loads, spawning, despawn safety,
//! mines, exits, portals, and boss defeat.

use starbreak_core::{
    CampaignConfig, Enemy, EnemyId, EntityStats, Event, Hooks, KillClass, KillData, ObstacleKind,
    PlayerBody, PortalDestination, PortalKind, Profile, Rarity, SpawnSlot,
};
use starbreak_world::{query, Entry, World, DESPAWN_RADIUS, RESTITUTION};

#[derive(Default)]
struct TestHooks {
    announcements: Vec<String>,
    player_damage: f32,
}

impl Hooks for TestHooks {
    fn spawn_entity(&mut self, type_tag: &str, _x: f32, _y: f32, class: KillClass) -> EntityStats {
        let (hp, damage, xp, size, speed) = match class {
            KillClass::Normal => (20.0, 4.0, 10, 14.0, 120.0),
            KillClass::Elite => (80.0, 9.0, 40, 22.0, 110.0),
            KillClass::Boss => (600.0, 25.0, 400, 50.0, 90.0),
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
        self.player_damage += amount;
    }

    fn show_announcement(&mut self, text: &str) {
        self.announcements.push(text.to_owned());
    }
}

fn setup(entry: Entry) -> (World, PlayerBody, TestHooks, Vec<Event>) {
    let mut world = World::new(CampaignConfig::default_campaign(), Profile::default());
    let mut player = PlayerBody::new(16.0);
    let mut hooks = TestHooks::default();
    let mut events = Vec::new();
    world
        .start(entry, "act1_1000", &mut player, &mut hooks, &mut events)
        .expect("start");
    (world, player, hooks, events)
}

#[test]
fn start_installs_a_zone_and_positions_the_player() {
    let (world, player, _, events) = setup(Entry::Depth(1));
    let zone = query::active_zone(&world).expect("zone");
    assert_eq!(zone.depth, 1);
    assert_eq!(player.x, zone.spawn.x);
    assert_eq!(player.y, zone.spawn.y);
    assert!(events.contains(&Event::ZoneLoaded {
        depth: 1,
        boss_zone: false
    }));
    assert_eq!(query::profile(&world).highest_zone, 1);
}

#[test]
fn depth_five_is_a_boss_zone() {
    let (world, _, _, events) = setup(Entry::Depth(5));
    let zone = query::active_zone(&world).expect("zone");
    assert!(zone.is_boss_zone());
    assert!(zone.exit.is_none());
    assert!(events.contains(&Event::ZoneLoaded {
        depth: 5,
        boss_zone: true
    }));
}

#[test]
fn identical_seed_text_replays_the_same_world() {
    let (a, _, _, _) = setup(Entry::Depth(7));
    let (b, _, _, _) = setup(Entry::Depth(7));
    assert_eq!(query::active_zone(&a), query::active_zone(&b));
}

#[test]
fn locked_portal_is_rejected_and_unknown_portal_is_an_error() {
    let mut world = World::new(CampaignConfig::default_campaign(), Profile::default());
    let mut player = PlayerBody::new(16.0);
    let mut hooks = TestHooks::default();
    let mut events = Vec::new();
    assert!(world
        .start(
            Entry::Portal("portal_tier3".to_owned()),
            "s",
            &mut player,
            &mut hooks,
            &mut events
        )
        .is_err());
    assert!(world
        .start(
            Entry::Portal("no_such".to_owned()),
            "s",
            &mut player,
            &mut hooks,
            &mut events
        )
        .is_err());
    assert!(world
        .start(
            Entry::Portal("portal_tier1".to_owned()),
            "s",
            &mut player,
            &mut hooks,
            &mut events
        )
        .is_ok());
}

#[test]
fn crossing_into_a_new_tier_unlocks_its_portal() {
    let (mut world, mut player, mut hooks, _) = setup(Entry::Depth(1));
    let mut events = Vec::new();
    world.load_zone(11, &mut player, &mut hooks, &mut events);
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::TierTransition { .. })));
    assert!(events.contains(&Event::PortalUnlocked {
        portal: "portal_tier2".to_owned()
    }));
    assert!(query::profile(&world).portal_unlocked("portal_tier2"));
    assert!(hooks.announcements.iter().any(|a| a.contains("Ember")));
}

#[test]
fn every_depth_up_to_sixty_loads_a_zone() {
    let (mut world, mut player, mut hooks, _) = setup(Entry::Depth(1));
    for depth in 1..=60 {
        let mut events = Vec::new();
        world.load_zone(depth, &mut player, &mut hooks, &mut events);
        let zone = query::active_zone(&world).expect("zone");
        assert_eq!(zone.depth, depth);
        assert_eq!(zone.is_boss_zone(), depth % 5 == 0, "depth {depth}");
    }
}

#[test]
fn proximity_spawning_activates_nearby_descriptors() {
    let (mut world, mut player, mut hooks, _) = setup(Entry::Depth(2));
    let spawn_pos = query::active_zone(&world).expect("zone").enemy_spawns[0].position;
    player.x = spawn_pos.x;
    player.y = spawn_pos.y;
    let mut events = Vec::new();
    world.update(0.016, &mut player, &mut hooks, &mut events);
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::EnemySpawned { .. })));
    assert!(!query::enemies(&world).is_empty());
}

#[test]
fn engaged_enemies_walk_home_before_despawning() {
    let (mut world, mut player, mut hooks, _) = setup(Entry::Depth(2));
    let zone = query::active_zone(&world).expect("zone");
    let exit = zone.exit.expect("exit");
    // A descriptor well away from the exit so the drag cannot touch it.
    let (slot, spawn_pos) = zone
        .enemy_spawns
        .iter()
        .enumerate()
        .find(|(_, s)| s.position.distance_to(exit) > 700.0)
        .map(|(i, s)| (i, s.position))
        .expect("descriptor clear of the exit");

    // Spawn and aggro by standing on the descriptor.
    player.x = spawn_pos.x;
    player.y = spawn_pos.y;
    let mut events = Vec::new();
    for _ in 0..3 {
        world.update(0.05, &mut player, &mut hooks, &mut events);
    }
    let tracked = query::enemies(&world)
        .iter()
        .find(|e| e.spawn_slot == SpawnSlot::Enemy(slot))
        .expect("tracked enemy")
        .id;

    // Drag the chase away from home, on the side opposite the exit.
    player.x = spawn_pos.x - 300.0;
    for _ in 0..40 {
        world.update(0.05, &mut player, &mut hooks, &mut events);
    }
    let dragged = query::enemies(&world)
        .iter()
        .find(|e| e.id == tracked)
        .expect("still engaged");
    let home_dist = (dragged.x - dragged.home_x).hypot(dragged.y - dragged.home_y);
    assert!(home_dist > dragged.return_threshold);

    // Leave. The engaged enemy must not vanish on the first far frame.
    player.x = -(DESPAWN_RADIUS + 4000.0);
    player.y = -(DESPAWN_RADIUS + 4000.0);
    events.clear();
    world.update(0.05, &mut player, &mut hooks, &mut events);
    assert!(!events.contains(&Event::EnemyDespawned { enemy: tracked }));
    assert!(query::enemies(&world).iter().any(|e| e.id == tracked));

    let mut despawned = false;
    for _ in 0..2000 {
        world.update(0.05, &mut player, &mut hooks, &mut events);
        if events.contains(&Event::EnemyDespawned { enemy: tracked }) {
            despawned = true;
            break;
        }
    }
    assert!(despawned);

    // The descriptor survives for a later revisit.
    let zone = query::active_zone(&world).expect("zone");
    assert!(!zone.enemy_spawns[slot].killed);
    assert!(!zone.enemy_spawns[slot].active);
}

#[test]
fn solid_contact_scrubs_speed_without_bouncing() {
    let (mut world, mut player, mut hooks, _) = setup(Entry::Depth(1));
    let mut found = None;
    for depth in 1..=20 {
        let mut events = Vec::new();
        world.load_zone(depth, &mut player, &mut hooks, &mut events);
        let zone = query::active_zone(&world).expect("zone");
        let solid = zone.obstacles.iter().enumerate().find(|(i, o)| {
            o.is_solid()
                && zone
                    .exit
                    .map_or(true, |exit| o.position.distance_to(exit) > 200.0)
                && zone.obstacles.iter().enumerate().all(|(j, other)| {
                    j == *i
                        || o.position.distance_to(other.position)
                            > o.radius + other.radius + 60.0
                })
        });
        if let Some((_, o)) = solid {
            found = Some((o.position, o.radius));
            break;
        }
    }
    let (position, radius) = found.expect("no isolated solid obstacle in depths 1..=20");

    // Overlap from the +x side while flying inward along -x.
    let contact = radius + player.radius;
    player.x = position.x + contact - 5.0;
    player.y = position.y;
    player.vx = -100.0;
    player.vy = 0.0;
    let mut events = Vec::new();
    world.update(0.016, &mut player, &mut hooks, &mut events);

    // Pushed back to the contact ring, inward speed scrubbed to 20%,
    // never reversed outward.
    assert!((player.x - (position.x + contact)).abs() < 1e-3);
    let inward = player.vx; // contact normal is +x
    assert!(inward <= 0.0, "contact flung the ship outward: {inward}");
    assert!((inward - (-100.0 * (1.0 - RESTITUTION))).abs() < 1e-3);
    assert_eq!(player.vy, 0.0);
}

#[test]
fn spawned_enemies_carry_class_engagement_envelopes() {
    let (mut world, mut player, mut hooks, _) = setup(Entry::Depth(2));
    let spawn_pos = query::active_zone(&world).expect("zone").enemy_spawns[0].position;
    player.x = spawn_pos.x;
    player.y = spawn_pos.y;
    let mut events = Vec::new();
    world.update(0.016, &mut player, &mut hooks, &mut events);
    let normal = query::enemies(&world)
        .iter()
        .find(|e| e.class == KillClass::Normal)
        .expect("normal enemy");
    assert_eq!(normal.aggro_range, 420.0);
    assert_eq!(normal.attack_range, normal.aggro_range);
    assert_eq!(normal.disengage_range, 420.0 * 1.65);
    assert_eq!(
        normal.leash_range,
        (420.0f32 * 2.2).max(normal.patrol_radius * 5.0)
    );
    assert_eq!(normal.return_threshold, (normal.size * 1.2).max(40.0));

    let (mut world, mut player, mut hooks, _) = setup(Entry::Depth(5));
    let arena = query::active_zone(&world)
        .expect("zone")
        .boss_spawn
        .as_ref()
        .expect("boss spawn")
        .position;
    player.x = arena.x;
    player.y = arena.y;
    let mut events = Vec::new();
    world.update(0.016, &mut player, &mut hooks, &mut events);
    let boss = &query::enemies(&world)[0];
    assert_eq!(boss.aggro_range, 750.0);
    assert_eq!(boss.attack_range, boss.aggro_range);
    assert_eq!(boss.disengage_range, 750.0 * 1.5);
    assert_eq!(boss.patrol_radius, 220.0);
    assert_eq!(boss.patrol_dir, 1.0);
    assert_eq!(
        boss.leash_range,
        (750.0f32 * 2.0).max(boss.patrol_radius * 6.0)
    );
    assert_eq!(boss.return_threshold, (boss.size * 1.2).max(60.0));
}

#[test]
fn failed_boss_generation_keeps_the_previous_zone() {
    let mut campaign = CampaignConfig::default_campaign();
    campaign.tiers[0].boss_type = None;
    let mut world = World::new(campaign, Profile::default());
    let mut player = PlayerBody::new(16.0);
    let mut hooks = TestHooks::default();
    let mut events = Vec::new();
    world
        .start(Entry::Depth(2), "act1_1000", &mut player, &mut hooks, &mut events)
        .expect("start");
    let before = query::active_zone(&world).expect("zone").clone();

    events.clear();
    world.load_zone(5, &mut player, &mut hooks, &mut events);
    assert_eq!(query::active_zone(&world), Some(&before));
    assert_eq!(query::zone_index(&world), 2);
    assert!(!events
        .iter()
        .any(|e| matches!(e, Event::ZoneLoaded { .. })));
}

#[test]
fn mines_detonate_on_contact_and_stay_destroyed() {
    let (mut world, mut player, mut hooks, _) = setup(Entry::Depth(3));
    let mut found = None;
    for depth in 3..=20 {
        let mut events = Vec::new();
        world.load_zone(depth, &mut player, &mut hooks, &mut events);
        let zone = query::active_zone(&world).expect("zone");
        let mine = zone.obstacles.iter().enumerate().find(|(i, o)| {
            matches!(o.kind, ObstacleKind::Mine { .. })
                && zone
                    .exit
                    .map_or(true, |exit| o.position.distance_to(exit) > 200.0)
                && zone
                    .obstacles
                    .iter()
                    .enumerate()
                    .all(|(j, other)| {
                        j == *i || o.position.distance_to(other.position) > other.radius + 60.0
                    })
        });
        if let Some((index, mine)) = mine {
            found = Some((index, mine.position));
            break;
        }
    }
    let (index, position) = found.expect("no mine found in depths 3..=20");

    player.x = position.x;
    player.y = position.y;
    let mut events = Vec::new();
    world.update(0.016, &mut player, &mut hooks, &mut events);

    assert!(events
        .iter()
        .any(|e| matches!(e, Event::MineDetonated { .. })));
    assert!(hooks.player_damage > 0.0);
    let zone = query::active_zone(&world).expect("zone");
    assert!(zone.obstacles[index].destroyed);

    // A second pass over the same spot is inert.
    hooks.player_damage = 0.0;
    events.clear();
    world.update(0.016, &mut player, &mut hooks, &mut events);
    assert!(!events
        .iter()
        .any(|e| matches!(e, Event::MineDetonated { .. })));
    assert_eq!(hooks.player_damage, 0.0);
}

#[test]
fn exit_contact_advances_the_depth() {
    let (mut world, mut player, mut hooks, _) = setup(Entry::Depth(1));
    let exit = query::active_zone(&world).expect("zone").exit.expect("exit");
    player.x = exit.x;
    player.y = exit.y;
    let mut events = Vec::new();
    world.update(0.016, &mut player, &mut hooks, &mut events);
    assert!(events.contains(&Event::ExitReached { next_depth: 2 }));
    assert_eq!(query::zone_index(&world), 2);
    assert_eq!(query::profile(&world).highest_zone, 2);
    // The frame was cancelled by the transition; the player sits at the new spawn.
    let zone = query::active_zone(&world).expect("zone");
    assert_eq!(player.x, zone.spawn.x);
}

#[test]
fn boss_defeat_grants_portals_and_a_legendary_floor_drop() {
    let (mut world, mut player, mut hooks, _) = setup(Entry::Depth(5));
    let arena = query::active_zone(&world)
        .expect("zone")
        .boss_spawn
        .as_ref()
        .expect("boss spawn")
        .position;
    player.x = arena.x;
    player.y = arena.y;
    let mut events = Vec::new();
    world.update(0.016, &mut player, &mut hooks, &mut events);
    assert!(events.contains(&Event::EnemySpawned {
        enemy: query::enemies(&world)[0].id,
        class: KillClass::Boss
    }));

    let boss = &query::enemies(&world)[0];
    let (id, kill) = (
        boss.id,
        KillData {
            xp: boss.xp,
            x: boss.x,
            y: boss.y,
            class: KillClass::Boss,
        },
    );
    events.clear();
    let rewards = world
        .on_enemy_killed(id, kill, &mut hooks, &mut events)
        .expect("rewards");
    assert_eq!(rewards.cells, 30);
    assert_eq!(rewards.scrap, 50);
    let pickup = rewards.pickup.expect("guaranteed boss drop");
    assert_eq!(pickup.rarity_floor, Rarity::Legendary);
    assert!(events.contains(&Event::BossDefeated { depth: 5 }));
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::ItemDropped { .. })));

    let zone = query::active_zone(&world).expect("zone");
    assert_eq!(zone.portals.len(), 2);
    assert!(zone.portals.iter().any(|p| p.kind == PortalKind::Victory));
    assert!(zone.portals.iter().any(|p| p.kind == PortalKind::Hub));
    let spawn = zone.boss_spawn.as_ref().expect("boss spawn");
    assert!(spawn.killed);

    // Stepping into the victory portal advances past the boss.
    let victory = zone
        .portals
        .iter()
        .find(|p| p.kind == PortalKind::Victory)
        .expect("victory portal")
        .position;
    player.x = victory.x;
    player.y = victory.y;
    events.clear();
    world.update(0.016, &mut player, &mut hooks, &mut events);
    assert!(events.contains(&Event::PortalEntered {
        destination: PortalDestination::NextZone
    }));
    assert_eq!(query::zone_index(&world), 6);
}

#[test]
fn hub_portal_uninstalls_the_zone() {
    let (mut world, mut player, mut hooks, _) = setup(Entry::Depth(5));
    let arena = query::active_zone(&world)
        .expect("zone")
        .boss_spawn
        .as_ref()
        .expect("boss spawn")
        .position;
    player.x = arena.x;
    player.y = arena.y;
    let mut events = Vec::new();
    world.update(0.016, &mut player, &mut hooks, &mut events);
    let boss = &query::enemies(&world)[0];
    let (id, kill) = (
        boss.id,
        KillData {
            xp: boss.xp,
            x: boss.x,
            y: boss.y,
            class: KillClass::Boss,
        },
    );
    let _ = world.on_enemy_killed(id, kill, &mut hooks, &mut events);

    let hub = query::active_zone(&world)
        .expect("zone")
        .portals
        .iter()
        .find(|p| p.kind == PortalKind::Hub)
        .expect("hub portal")
        .position;
    player.x = hub.x;
    player.y = hub.y;
    events.clear();
    world.update(0.016, &mut player, &mut hooks, &mut events);
    assert!(events.contains(&Event::ReturnedToHub));
    assert!(query::active_zone(&world).is_none());
    assert!(query::enemies(&world).is_empty());
}

#[test]
fn kill_reports_for_unknown_enemies_are_ignored() {
    let (mut world, _, mut hooks, _) = setup(Entry::Depth(1));
    let mut events = Vec::new();
    let kill = KillData {
        xp: 1,
        x: 0.0,
        y: 0.0,
        class: KillClass::Normal,
    };
    let rewards = world.on_enemy_killed(EnemyId::new(9999), kill, &mut hooks, &mut events);
    assert!(rewards.is_none());
    assert!(events.is_empty());
}
