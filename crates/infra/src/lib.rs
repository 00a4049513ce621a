//! # Cadence Infrastructure
//!
//! Implementations of the ports declared in `cadence-core`.
//!
//! This crate contains:
//! - SQLite repositories over an r2d2 connection pool
//! - The transactional booking store used for conflict-safe writes
//! - Configuration loading (environment variables, TOML/JSON files)
//! - Settings provider and system clock
//!
//! ## Architecture
//! - Depends on `cadence-domain` and `cadence-core`
//! - All blocking I/O runs on tokio's blocking pool

pub mod clock;
pub mod config;
pub mod database;
pub mod errors;
pub mod settings;

pub use clock::SystemClock;
pub use database::*;
pub use errors::InfraError;
pub use settings::ConfigSettings;
