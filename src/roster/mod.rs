// Roster slot configuration and the authoritative roster store.

pub mod slots;
pub mod store;

pub use slots::{RosterCounts, Slot, SlotKind, SlotLayout};
pub use store::{AcquisitionMethod, RosterEntry, RosterStore};
