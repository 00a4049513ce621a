//! Conflict detection and alternative slot search

pub mod detector;
pub mod slot_finder;

pub use detector::{find_conflicts, has_conflict, intervals_overlap, Candidate};
pub use slot_finder::{SlotFinder, SlotRequest};
