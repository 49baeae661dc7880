// Post-draft roster population: one-shot conversion of picks into
// roster placements via the slot layout's position -> starter-slot mapping.

use tracing::warn;

use crate::catalog::PlayerCatalog;
use crate::roster::store::{AcquisitionMethod, RosterStore};

use super::engine::Draft;

/// Outcome of a population run. `unplaced` is normally empty; it can only
/// fill up when roster settings allow fewer slots than draft rounds, which
/// draft setup rejects up front.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PopulationReport {
    pub placed: usize,
    /// (member_id, player_id) pairs that found no open slot.
    pub unplaced: Vec<(String, String)>,
}

/// Place every member's picks, in pick-number order, into the first open
/// position-eligible starter slot (dedicated before FLEX), falling back to
/// the first open bench slot. Runs exactly once, at draft completion.
pub fn populate_rosters(
    draft: &Draft,
    catalog: &PlayerCatalog,
    rosters: &mut RosterStore,
) -> PopulationReport {
    let mut report = PopulationReport::default();

    for member_id in &draft.order {
        for pick in draft.picks_for(member_id) {
            let player = match catalog.get(&pick.player_id) {
                Some(p) => p,
                None => {
                    warn!(
                        member = %member_id,
                        player = %pick.player_id,
                        "drafted player missing from catalog; leaving unplaced"
                    );
                    report
                        .unplaced
                        .push((member_id.clone(), pick.player_id.clone()));
                    continue;
                }
            };

            let starter_slots: Vec<String> = rosters
                .layout()
                .starter_slots_for(player.position)
                .iter()
                .map(|s| s.to_string())
                .collect();
            let starter_refs: Vec<&str> = starter_slots.iter().map(|s| s.as_str()).collect();

            let target = rosters
                .first_open_slot(member_id, &starter_refs)
                .or_else(|| rosters.first_open_bench_slot(member_id));

            match target {
                Some(slot) => {
                    match rosters.place(member_id, player, &slot, AcquisitionMethod::Draft) {
                        Ok(_) => report.placed += 1,
                        Err(err) => {
                            warn!(
                                member = %member_id,
                                player = %player.id,
                                slot = %slot,
                                %err,
                                "population placement failed; leaving unplaced"
                            );
                            report
                                .unplaced
                                .push((member_id.clone(), player.id.clone()));
                        }
                    }
                }
                None => {
                    warn!(
                        member = %member_id,
                        player = %player.id,
                        "no open starter or bench slot; leaving unplaced"
                    );
                    report
                        .unplaced
                        .push((member_id.clone(), player.id.clone()));
                }
            }
        }
    }

    report
}
