#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Kill reward economy: drop gating, pity counters, seed-reuse dampening.
//!
//! Currency and experience always pay out; only the item drop is gated. The
//! item itself is produced by an external generator, so a successful gate
//! emits a pickup tag carrying the lowest rarity that generator may roll and
//! the item level.

use log::debug;
use starbreak_core::{AntiExploitConfig, EconomyConfig, KillClass, KillData, LootConfig, Profile, Rarity};
use starbreak_rng::{Seed, SeedStream};

/// Item pickup tag handed to the external item generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ItemPickup {
    /// Lowest rarity the generator may roll.
    pub rarity_floor: Rarity,
    /// Item level.
    pub ilvl: u32,
}

/// Everything a single kill pays out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KillRewards {
    /// Experience from the dead enemy.
    pub xp: u32,
    /// Cells currency.
    pub cells: u32,
    /// Scrap currency.
    pub scrap: u32,
    /// Item pickup, when the drop gate passed.
    pub pickup: Option<ItemPickup>,
}

/// Records a zone entry in the bounded seed-visit history.
pub fn record_zone_entry(profile: &mut Profile, zone_seed: Seed, config: &AntiExploitConfig) {
    profile.record_seed_visit(zone_seed.value(), config.seed_history_limit);
}

/// Reward multiplier for repeated visits to the same zone seed.
///
/// Tolerated up to `max_seed_reuse` visits; beyond that the multiplier decays
/// as `1/visits`, floored at `min_drop_multiplier`. A fresh profile with no
/// history is never dampened.
#[must_use]
pub fn reuse_multiplier(profile: &Profile, zone_seed: Seed, config: &AntiExploitConfig) -> f64 {
    let visits = profile.seed_visits(zone_seed.value());
    if visits <= config.max_seed_reuse {
        1.0
    } else {
        (1.0 / f64::from(visits)).max(config.min_drop_multiplier)
    }
}

fn class_drop_chance(loot: &LootConfig, class: KillClass) -> f64 {
    // Elite and boss chances replace the base outright.
    match class {
        KillClass::Normal => loot.base_drop_chance,
        KillClass::Elite => loot.elite_drop_chance,
        KillClass::Boss => loot.boss_drop_chance,
    }
}

fn rarity_floor(loot: &LootConfig, profile: &Profile, class: KillClass) -> Rarity {
    let class_floor = match class {
        KillClass::Normal => Rarity::Common,
        KillClass::Elite => Rarity::Rare,
        KillClass::Boss => Rarity::Legendary,
    };
    let pity_floor = if profile.pity.kills_since_unique >= loot.unique_pity {
        Rarity::Unique
    } else if profile.pity.kills_since_legendary >= loot.legendary_pity {
        Rarity::Legendary
    } else if profile.pity.kills_since_rare >= loot.rare_pity {
        Rarity::Rare
    } else {
        Rarity::Common
    };
    class_floor.max(pity_floor)
}

fn reset_matching_counter(profile: &mut Profile, floor: Rarity) {
    match floor {
        Rarity::Unique => profile.pity.kills_since_unique = 0,
        Rarity::Legendary => profile.pity.kills_since_legendary = 0,
        Rarity::Rare | Rarity::Epic => profile.pity.kills_since_rare = 0,
        Rarity::Common | Rarity::Uncommon => {}
    }
}

/// Resolves the full payout for one confirmed kill.
///
/// Pity counters advance on every kill, dropped or not. The drop roll is the
/// class chance times the luck factor times the seed-reuse multiplier, and
/// the multiplier applies uniformly, boss kills included.
pub fn resolve_kill(
    economy: &EconomyConfig,
    loot: &LootConfig,
    anti_exploit: &AntiExploitConfig,
    profile: &mut Profile,
    kill: KillData,
    luck: u32,
    zone_seed: Seed,
    stream: &mut SeedStream,
) -> KillRewards {
    profile.pity.kills_since_rare += 1;
    profile.pity.kills_since_legendary += 1;
    profile.pity.kills_since_unique += 1;

    let currency_mult = match kill.class {
        KillClass::Normal => 1,
        KillClass::Elite => economy.elite_multiplier,
        KillClass::Boss => economy.boss_multiplier,
    };
    let cells = economy.cells_per_kill * currency_mult;
    let scrap = economy.scrap_per_kill * currency_mult;

    let luck_factor = 1.0 + f64::from(luck) * loot.luck_bonus_per_point;
    let dampener = reuse_multiplier(profile, zone_seed, anti_exploit);
    let chance = class_drop_chance(loot, kill.class) * luck_factor * dampener;

    let pickup = if stream.chance(chance) {
        let floor = rarity_floor(loot, profile, kill.class);
        reset_matching_counter(profile, floor);
        debug!(
            "drop at ({:.0},{:.0}): floor {:?}, chance {:.3}",
            kill.x, kill.y, floor, chance
        );
        Some(ItemPickup {
            rarity_floor: floor,
            ilvl: profile.level,
        })
    } else {
        None
    };

    KillRewards {
        xp: kill.xp,
        cells,
        scrap,
        pickup,
    }
}
