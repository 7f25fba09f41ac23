#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Depth-driven rules: zone modifier sampling and milestone unlocks.
//!
//! Both operations are pure over their inputs plus a seed stream, so a given
//! zone seed always yields the same modifier set and the same unlock outcome
//! for the same profile state.

use starbreak_core::{Profile, TierConfig};
use starbreak_rng::{Seed, SeedStream};

/// Number of modifier slots granted at the given depth.
///
/// Zones shallower than 5 carry no modifiers; one slot opens at depth 5 and
/// another every 20 depths after, capped at 3.
#[must_use]
pub fn modifier_slots(depth: u32) -> usize {
    if depth < 5 {
        0
    } else {
        (1 + (depth - 5) / 20).min(3) as usize
    }
}

/// Samples the active modifier identifiers for a zone.
///
/// Weighted sampling without replacement over the tier pool, drawing from the
/// `"mods"` stream of the zone seed. When the lookup value lands exactly on a
/// cumulative-weight boundary the earlier-indexed modifier wins.
#[must_use]
pub fn sample_active(depth: u32, tier: &TierConfig, zone_seed: Seed) -> Vec<String> {
    let slots = modifier_slots(depth);
    if slots == 0 {
        return Vec::new();
    }
    let mut stream = zone_seed.labeled("mods").stream();
    let mut pool: Vec<(&str, f64)> = tier
        .modifiers
        .iter()
        .filter(|def| def.weight > 0.0)
        .map(|def| (def.id.as_str(), def.weight))
        .collect();

    let mut picked = Vec::new();
    while picked.len() < slots && !pool.is_empty() {
        let total: f64 = pool.iter().map(|&(_, weight)| weight).sum();
        let target = stream.next_unit() * total;
        let mut cumulative = 0.0;
        let mut chosen = pool.len() - 1;
        for (index, &(_, weight)) in pool.iter().enumerate() {
            cumulative += weight;
            if target <= cumulative {
                chosen = index;
                break;
            }
        }
        let (id, _) = pool.remove(chosen);
        picked.push(id.to_owned());
    }
    picked
}

/// Records a visited depth in the profile's unlock history.
pub fn record_depth(profile: &mut Profile, depth: u32) {
    let _ = profile.depth_history.insert(depth);
}

/// Rolls the tier's milestone unlocks for a freshly entered depth.
///
/// Fires at most one unlock per entry. A depth already present in the
/// profile's history never re-rolls, and a granted unlock never repeats.
/// Rolls are consumed from `stream` in pool order.
#[must_use]
pub fn maybe_unlock(
    depth: u32,
    tier: &TierConfig,
    profile: &mut Profile,
    stream: &mut SeedStream,
) -> Option<String> {
    if profile.depth_history.contains(&depth) {
        return None;
    }
    for unlock in &tier.unlocks {
        if depth < unlock.min_depth || profile.unlocks_granted.contains(&unlock.id) {
            continue;
        }
        if stream.chance(unlock.chance) {
            let _ = profile.unlocks_granted.insert(unlock.id.clone());
            return Some(unlock.id.clone());
        }
    }
    None
}
