// Slot layout derivation from league roster settings.
//
// The layout is derived, never stored: the same counts always produce the
// same ordered slot list with the same names, so every subsystem (draft
// population, roster moves, bot lineup optimization) can agree on slot
// identity without a shared table.

use serde::{Deserialize, Serialize};

use crate::catalog::Position;

/// Per-league roster size settings, straight out of league configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterCounts {
    pub qb: usize,
    pub rb: usize,
    pub wr: usize,
    pub te: usize,
    pub flex: usize,
    pub k: usize,
    pub def: usize,
    pub bench: usize,
    pub ir: usize,
}

impl Default for RosterCounts {
    fn default() -> Self {
        RosterCounts {
            qb: 1,
            rb: 2,
            wr: 2,
            te: 1,
            flex: 1,
            k: 1,
            def: 1,
            bench: 6,
            ir: 2,
        }
    }
}

impl RosterCounts {
    pub fn starter_count(&self) -> usize {
        self.qb + self.rb + self.wr + self.te + self.flex + self.k + self.def
    }

    /// Slots a drafted player can land in (starters + bench; IR is never
    /// filled by the draft).
    pub fn draftable_count(&self) -> usize {
        self.starter_count() + self.bench
    }

    pub fn total(&self) -> usize {
        self.draftable_count() + self.ir
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotKind {
    Starter,
    Bench,
    InjuredReserve,
}

/// One slot in a league's layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    pub name: String,
    pub kind: SlotKind,
    /// Positions legal for this slot. Only meaningful for starter slots;
    /// bench accepts anyone and IR gates on injury status instead.
    pub eligible: Vec<Position>,
}

impl Slot {
    /// Whether a player with the given position and injury state may occupy
    /// this slot.
    pub fn accepts(&self, position: Position, injured: bool) -> bool {
        match self.kind {
            SlotKind::Starter => self.eligible.contains(&position),
            SlotKind::Bench => true,
            SlotKind::InjuredReserve => injured,
        }
    }
}

/// The complete, ordered slot layout for a league.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotLayout {
    slots: Vec<Slot>,
}

impl SlotLayout {
    /// Derive the layout from roster counts. Deterministic: numbered names
    /// when a group has more than one slot (`RB1`, `RB2`), a bare name when
    /// it has exactly one (`QB`).
    pub fn from_counts(counts: &RosterCounts) -> Self {
        let mut slots = Vec::with_capacity(counts.total());

        push_group(&mut slots, "QB", counts.qb, SlotKind::Starter, vec![Position::QB]);
        push_group(&mut slots, "RB", counts.rb, SlotKind::Starter, vec![Position::RB]);
        push_group(&mut slots, "WR", counts.wr, SlotKind::Starter, vec![Position::WR]);
        push_group(&mut slots, "TE", counts.te, SlotKind::Starter, vec![Position::TE]);
        push_group(
            &mut slots,
            "FLEX",
            counts.flex,
            SlotKind::Starter,
            vec![Position::RB, Position::WR, Position::TE],
        );
        push_group(&mut slots, "K", counts.k, SlotKind::Starter, vec![Position::K]);
        push_group(&mut slots, "DEF", counts.def, SlotKind::Starter, vec![Position::DEF]);
        push_group(&mut slots, "BN", counts.bench, SlotKind::Bench, Vec::new());
        push_group(&mut slots, "IR", counts.ir, SlotKind::InjuredReserve, Vec::new());

        SlotLayout { slots }
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slot(&self, name: &str) -> Option<&Slot> {
        self.slots.iter().find(|s| s.name == name)
    }

    pub fn starters(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter().filter(|s| s.kind == SlotKind::Starter)
    }

    /// Ordered bench slot names.
    pub fn bench_names(&self) -> Vec<&str> {
        self.names_of(SlotKind::Bench)
    }

    /// Ordered IR slot names.
    pub fn ir_names(&self) -> Vec<&str> {
        self.names_of(SlotKind::InjuredReserve)
    }

    fn names_of(&self, kind: SlotKind) -> Vec<&str> {
        self.slots
            .iter()
            .filter(|s| s.kind == kind)
            .map(|s| s.name.as_str())
            .collect()
    }

    /// Starter slots a player of `position` may fill, in fill-priority
    /// order: dedicated slots first, FLEX last. Draft population and bot
    /// lineup optimization both walk this list.
    pub fn starter_slots_for(&self, position: Position) -> Vec<&str> {
        let mut dedicated = Vec::new();
        let mut flex = Vec::new();
        for slot in self.starters() {
            if !slot.eligible.contains(&position) {
                continue;
            }
            if slot.eligible.len() == 1 {
                dedicated.push(slot.name.as_str());
            } else {
                flex.push(slot.name.as_str());
            }
        }
        dedicated.extend(flex);
        dedicated
    }

    pub fn starter_count(&self) -> usize {
        self.starters().count()
    }

    pub fn total_count(&self) -> usize {
        self.slots.len()
    }

    /// Starter + bench slot count: the number of players a draft can place.
    pub fn draftable_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| s.kind != SlotKind::InjuredReserve)
            .count()
    }
}

fn push_group(
    slots: &mut Vec<Slot>,
    base: &str,
    count: usize,
    kind: SlotKind,
    eligible: Vec<Position>,
) {
    if count == 1 {
        slots.push(Slot {
            name: base.to_string(),
            kind,
            eligible,
        });
        return;
    }
    for i in 1..=count {
        slots.push(Slot {
            name: format!("{base}{i}"),
            kind,
            eligible: eligible.clone(),
        });
    }
}
