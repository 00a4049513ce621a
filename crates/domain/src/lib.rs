//! # Cadence Domain
//!
//! Business domain types for recurring service bookings.
//!
//! This crate contains:
//! - Recurrence rules, series, appointments and audit events
//! - Batch outcome types returned by lifecycle operations
//! - Domain error types and Result definitions
//! - Configuration structures and constants
//!
//! ## Architecture
//! - No dependencies on other Cadence crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
