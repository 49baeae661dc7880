// The authoritative mapping of (member, slot) -> player for one league.
//
// Every mutation to player ownership in a league flows through this store:
// draft population, free-agent pickups, trades, and lineup moves. The store
// owns the two hard invariants -- a player is held by at most one entry
// league-wide, and a slot holds at most one entry -- and refuses any
// operation that would break them.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{Player, PlayerCatalog};
use crate::error::{EngineError, EngineResult};

use super::slots::SlotLayout;

/// How a roster entry came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcquisitionMethod {
    Draft,
    FreeAgent,
    Trade,
}

/// One held player: a (member, slot) pair with provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub id: u64,
    pub member_id: String,
    pub player_id: String,
    pub slot: String,
    pub acquired: AcquisitionMethod,
    pub acquired_at: DateTime<Utc>,
}

/// Per-league roster store.
#[derive(Debug, Clone)]
pub struct RosterStore {
    layout: SlotLayout,
    entries: HashMap<u64, RosterEntry>,
    /// player_id -> entry id. The league-wide ownership index backing the
    /// one-owner-per-player invariant.
    owners: HashMap<String, u64>,
    next_entry_id: u64,
}

impl RosterStore {
    pub fn new(layout: SlotLayout) -> Self {
        RosterStore {
            layout,
            entries: HashMap::new(),
            owners: HashMap::new(),
            next_entry_id: 1,
        }
    }

    pub fn layout(&self) -> &SlotLayout {
        &self.layout
    }

    /// Place a player into a slot for a member.
    ///
    /// Fails with `SlotOccupied` if the member already has a player in that
    /// slot, `PlayerAlreadyOwned` if anyone in the league holds the player,
    /// and `IneligiblePosition` if the slot cannot legally hold the player's
    /// position (starter eligibility, or IR without an injury designation).
    pub fn place(
        &mut self,
        member_id: &str,
        player: &Player,
        slot: &str,
        acquired: AcquisitionMethod,
    ) -> EngineResult<u64> {
        let slot_def = self
            .layout
            .slot(slot)
            .ok_or_else(|| EngineError::SlotNotFound { slot: slot.to_string() })?;

        if self.owners.contains_key(&player.id) {
            return Err(EngineError::PlayerAlreadyOwned {
                player_id: player.id.clone(),
            });
        }
        if self.occupant_at(member_id, slot).is_some() {
            return Err(EngineError::SlotOccupied {
                member_id: member_id.to_string(),
                slot: slot.to_string(),
            });
        }
        if !slot_def.accepts(player.position, player.injury.is_some()) {
            return Err(EngineError::IneligiblePosition {
                player_id: player.id.clone(),
                slot: slot.to_string(),
            });
        }

        let id = self.next_entry_id;
        self.next_entry_id += 1;
        self.entries.insert(
            id,
            RosterEntry {
                id,
                member_id: member_id.to_string(),
                player_id: player.id.clone(),
                slot: slot.to_string(),
                acquired,
                acquired_at: Utc::now(),
            },
        );
        self.owners.insert(player.id.clone(), id);
        Ok(id)
    }

    /// Delete an entry, releasing both the slot and the player.
    pub fn remove(&mut self, entry_id: u64) -> EngineResult<RosterEntry> {
        let entry = self
            .entries
            .remove(&entry_id)
            .ok_or(EngineError::EntryNotFound { entry_id })?;
        self.owners.remove(&entry.player_id);
        Ok(entry)
    }

    /// Move an entry to a different (free) slot, subject to eligibility.
    /// Callers wanting swap-with-occupant semantics use `move_player`.
    pub fn relocate(
        &mut self,
        entry_id: u64,
        target_slot: &str,
        catalog: &PlayerCatalog,
    ) -> EngineResult<()> {
        let entry = self
            .entries
            .get(&entry_id)
            .ok_or(EngineError::EntryNotFound { entry_id })?;
        let member_id = entry.member_id.clone();
        let player_id = entry.player_id.clone();

        if let Some(occupant) = self.occupant_at(&member_id, target_slot) {
            if occupant.id != entry_id {
                return Err(EngineError::SlotOccupied {
                    member_id,
                    slot: target_slot.to_string(),
                });
            }
        }
        self.check_eligibility(&player_id, target_slot, catalog)?;

        let entry = self.entries.get_mut(&entry_id).expect("entry checked above");
        entry.slot = target_slot.to_string();
        Ok(())
    }

    /// Move an entry to a target slot, swapping with the occupant if the
    /// target is taken.
    ///
    /// The occupant is relocated to the mover's original slot; if the
    /// occupant's position is not legal there, the whole operation fails with
    /// `IneligibleSwap` and neither entry is touched.
    pub fn move_player(
        &mut self,
        entry_id: u64,
        target_slot: &str,
        catalog: &PlayerCatalog,
    ) -> EngineResult<()> {
        let entry = self
            .entries
            .get(&entry_id)
            .ok_or(EngineError::EntryNotFound { entry_id })?;
        let member_id = entry.member_id.clone();
        let origin_slot = entry.slot.clone();

        let occupant_id = match self.occupant_at(&member_id, target_slot) {
            None => return self.relocate(entry_id, target_slot, catalog),
            Some(occupant) if occupant.id == entry_id => return Ok(()),
            Some(occupant) => occupant.id,
        };

        // Validate both halves of the swap before mutating anything.
        let mover_player = self.entries[&entry_id].player_id.clone();
        let occupant_player = self.entries[&occupant_id].player_id.clone();
        self.check_eligibility(&mover_player, target_slot, catalog)?;
        self.check_eligibility(&occupant_player, &origin_slot, catalog)
            .map_err(|_| EngineError::IneligibleSwap {
                target_slot: target_slot.to_string(),
                vacated_slot: origin_slot.clone(),
            })?;

        self.entries
            .get_mut(&entry_id)
            .expect("mover checked above")
            .slot = target_slot.to_string();
        self.entries
            .get_mut(&occupant_id)
            .expect("occupant checked above")
            .slot = origin_slot;
        Ok(())
    }

    /// First unoccupied slot for a member out of an ordered name list.
    pub fn first_open_slot(&self, member_id: &str, slot_names: &[&str]) -> Option<String> {
        slot_names
            .iter()
            .find(|name| self.occupant_at(member_id, name).is_none())
            .map(|name| name.to_string())
    }

    /// First open bench slot for a member, in layout order.
    pub fn first_open_bench_slot(&self, member_id: &str) -> Option<String> {
        let bench = self.layout.bench_names();
        self.first_open_slot(member_id, &bench)
    }

    /// Number of bench slots a member has open.
    pub fn open_bench_count(&self, member_id: &str) -> usize {
        self.layout
            .bench_names()
            .iter()
            .filter(|name| self.occupant_at(member_id, name).is_none())
            .count()
    }

    pub fn entry(&self, entry_id: u64) -> Option<&RosterEntry> {
        self.entries.get(&entry_id)
    }

    /// The entry holding a player, anywhere in the league.
    pub fn owner_of(&self, player_id: &str) -> Option<&RosterEntry> {
        self.owners.get(player_id).and_then(|id| self.entries.get(id))
    }

    pub fn is_owned(&self, player_id: &str) -> bool {
        self.owners.contains_key(player_id)
    }

    /// The entry occupying a member's slot, if any.
    pub fn occupant_at(&self, member_id: &str, slot: &str) -> Option<&RosterEntry> {
        self.entries
            .values()
            .find(|e| e.member_id == member_id && e.slot == slot)
    }

    /// A member's entries in layout order (starters, bench, IR).
    pub fn entries_for(&self, member_id: &str) -> Vec<&RosterEntry> {
        let mut entries: Vec<&RosterEntry> = self
            .entries
            .values()
            .filter(|e| e.member_id == member_id)
            .collect();
        entries.sort_by_key(|e| self.slot_index(&e.slot));
        entries
    }

    /// Count of entries across the whole league.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A clonable snapshot of every entry, sorted by entry id. Used by
    /// consistency checks and tests.
    pub fn snapshot(&self) -> Vec<RosterEntry> {
        let mut all: Vec<RosterEntry> = self.entries.values().cloned().collect();
        all.sort_by_key(|e| e.id);
        all
    }

    fn slot_index(&self, slot: &str) -> usize {
        self.layout
            .slots()
            .iter()
            .position(|s| s.name == slot)
            .unwrap_or(usize::MAX)
    }

    fn check_eligibility(
        &self,
        player_id: &str,
        slot: &str,
        catalog: &PlayerCatalog,
    ) -> EngineResult<()> {
        let slot_def = self
            .layout
            .slot(slot)
            .ok_or_else(|| EngineError::SlotNotFound { slot: slot.to_string() })?;
        let player = catalog
            .get(player_id)
            .ok_or_else(|| EngineError::PlayerNotFound {
                player_id: player_id.to_string(),
            })?;
        if !slot_def.accepts(player.position, player.injury.is_some()) {
            return Err(EngineError::IneligiblePosition {
                player_id: player_id.to_string(),
                slot: slot.to_string(),
            });
        }
        Ok(())
    }
}
