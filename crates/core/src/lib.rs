//! # Cadence Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - The recurrence evaluator, conflict detector and alternative slot finder
//! - The appointment status state machine
//! - Port interfaces (traits) for storage, audit, settings and time
//! - The series lifecycle and single-appointment services
//!
//! ## Architecture Principles
//! - Only depends on `cadence-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits
//! - "now" is always injected, never read from the wall clock

pub mod appointments;
pub mod conflict;
pub mod recurrence;
pub mod reference_ports;
pub mod references;
pub mod series;

// Re-export specific items to avoid ambiguity
pub use appointments::ports::BookingStore;
pub use appointments::AppointmentService;
pub use conflict::{has_conflict, Candidate, SlotFinder};
pub use recurrence::{generate, GenerationWindow};
pub use reference_ports::{Clock, ReferenceDirectory, SettingsProvider};
pub use series::ports::{AuditSink, SeriesRepository};
pub use series::SeriesLifecycleService;
