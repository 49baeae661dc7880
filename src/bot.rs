// Bot decision policy.
//
// Bots never see anything a human can't: they pick from the same available
// pool, move players through the same store operations, and value players
// purely by ADP. Randomness comes from the injected generator so simulated
// leagues are replayable.

use crate::catalog::{adp_then_name, Player, PlayerCatalog};
use crate::catalog::Position;
use crate::error::EngineResult;
use crate::roster::slots::SlotKind;
use crate::roster::store::RosterStore;
use crate::rng::{self, Rng};

/// ADP assigned to unranked players when valuing a trade. High = worthless,
/// so incomplete data biases the bot toward declining.
const MISSING_ADP: f64 = 999.0;

/// A bot accepts a trade when the average ADP it receives is no more than
/// 10% worse than the average ADP it gives up.
const TRADE_TOLERANCE: f64 = 1.10;

/// How many best-available candidates at a priority position the bot picks
/// among. More than one keeps simulated drafts from being identical.
const SELECTION_POOL: usize = 3;

/// Position priorities by round: early rounds chase RB/WR value, round four
/// grabs a quarterback and round five a tight end, the closing two rounds
/// take the kicker and defense, and everything between is best skill player
/// available.
fn round_priorities(round: u32, total_rounds: u32) -> &'static [Position] {
    use Position::*;
    if total_rounds >= 4 {
        if round == total_rounds {
            return &[DEF, K, RB, WR, TE, QB];
        }
        if round + 1 == total_rounds {
            return &[K, DEF, RB, WR, TE, QB];
        }
    }
    match round {
        1..=3 => &[RB, WR],
        4 => &[QB, RB, WR, TE],
        5 => &[TE, RB, WR, QB],
        _ => &[RB, WR, TE, QB],
    }
}

/// Choose a player for a bot's pick: uniform among the best few candidates
/// at the first priority position with any candidates, uniform over the
/// whole pool when no priority position has one. `None` only for an empty
/// pool.
pub fn draft_selection<'a>(
    pool: &[&'a Player],
    round: u32,
    total_rounds: u32,
    rng: &mut dyn Rng,
) -> Option<&'a Player> {
    for &position in round_priorities(round, total_rounds) {
        let mut candidates: Vec<&'a Player> = pool
            .iter()
            .copied()
            .filter(|p| p.position == position)
            .collect();
        if candidates.is_empty() {
            continue;
        }
        candidates.sort_by(|a, b| adp_then_name(a, b));
        candidates.truncate(SELECTION_POOL);
        return rng::choose(rng, &candidates).copied();
    }
    rng::choose(rng, pool).copied()
}

/// Compute a bot's ideal lineup as `(entry_id, target_slot)` moves.
///
/// Greedy slot-by-slot: each starter slot takes the best-ADP eligible player
/// not yet assigned; leftovers fill bench slots in ADP order. Entries parked
/// on IR are left alone. Applying the moves in order through `move_player`
/// converges because assigned targets are unique, so a finalized entry is
/// never displaced by a later swap.
pub fn optimize_lineup(
    member_id: &str,
    rosters: &RosterStore,
    catalog: &PlayerCatalog,
) -> Vec<(u64, String)> {
    // (entry_id, current_slot, player) for everything not on IR.
    let mut unassigned: Vec<(u64, String, &Player)> = rosters
        .entries_for(member_id)
        .into_iter()
        .filter(|e| {
            rosters
                .layout()
                .slot(&e.slot)
                .map(|s| s.kind != SlotKind::InjuredReserve)
                .unwrap_or(false)
        })
        .filter_map(|e| catalog.get(&e.player_id).map(|p| (e.id, e.slot.clone(), p)))
        .collect();

    let mut assignments: Vec<(u64, String, String)> = Vec::new();

    let starter_slots: Vec<(String, Vec<Position>)> = rosters
        .layout()
        .starters()
        .map(|s| (s.name.clone(), s.eligible.clone()))
        .collect();

    for (slot_name, eligible) in starter_slots {
        let best = unassigned
            .iter()
            .enumerate()
            .filter(|(_, (_, _, p))| eligible.contains(&p.position))
            .min_by(|(_, (_, _, a)), (_, (_, _, b))| adp_then_name(a, b))
            .map(|(idx, _)| idx);
        if let Some(idx) = best {
            let (entry_id, current, _) = unassigned.remove(idx);
            assignments.push((entry_id, current, slot_name));
        }
    }

    // Remaining players take the bench in ADP order.
    unassigned.sort_by(|(_, _, a), (_, _, b)| adp_then_name(a, b));
    let bench: Vec<String> = rosters
        .layout()
        .bench_names()
        .iter()
        .map(|s| s.to_string())
        .collect();
    for ((entry_id, current, _), slot_name) in unassigned.into_iter().zip(bench) {
        assignments.push((entry_id, current, slot_name));
    }

    assignments
        .into_iter()
        .filter(|(_, current, target)| current != target)
        .map(|(entry_id, _, target)| (entry_id, target))
        .collect()
}

/// Apply lineup moves through the store's swap-aware relocation.
pub fn apply_lineup_moves(
    moves: &[(u64, String)],
    rosters: &mut RosterStore,
    catalog: &PlayerCatalog,
) -> EngineResult<()> {
    for (entry_id, target) in moves {
        rosters.move_player(*entry_id, target, catalog)?;
    }
    Ok(())
}

/// Pick the best-ADP free agent for each of a member's empty bench slots.
/// `free_agents` is the caller's available pool; order does not matter.
pub fn autofill_bench<'a>(
    member_id: &str,
    rosters: &RosterStore,
    free_agents: &[&'a Player],
) -> Vec<(&'a Player, String)> {
    let mut ranked: Vec<&'a Player> = free_agents.to_vec();
    ranked.sort_by(|a, b| adp_then_name(a, b));
    let mut ranked = ranked.into_iter();

    let mut fills = Vec::new();
    for slot in rosters.layout().bench_names() {
        if rosters.occupant_at(member_id, slot).is_some() {
            continue;
        }
        match ranked.next() {
            Some(player) => fills.push((player, slot.to_string())),
            None => break,
        }
    }
    fills
}

/// Average ADP of a package; unranked players count as `MISSING_ADP` and an
/// empty package is worth nothing (all penalty), so a bot never pays real
/// value for air but happily accepts a free player.
fn package_value(players: &[&Player]) -> f64 {
    if players.is_empty() {
        return MISSING_ADP;
    }
    let total: f64 = players.iter().map(|p| p.adp.unwrap_or(MISSING_ADP)).sum();
    total / players.len() as f64
}

/// Trade evaluation: accept when the receiving side's average ADP is within
/// the tolerance of the giving side's. Lower ADP = better, so "within
/// tolerance" means receiving_avg <= giving_avg * 1.10.
pub fn evaluate_trade(receiving: &[&Player], giving: &[&Player]) -> bool {
    package_value(receiving) <= package_value(giving) * TRADE_TOLERANCE
}
