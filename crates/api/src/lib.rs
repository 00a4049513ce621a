//! # Cadence App
//!
//! Application layer: wiring, command functions and the line protocol.
//!
//! This crate contains:
//! - `AppContext` (dependency injection over the SQLite infrastructure)
//! - Async command functions, one per operation
//! - The JSON-lines dispatcher used by the `cadence` binary
//! - Logging bootstrap
//!
//! ## Architecture
//! - Depends on `cadence-domain`, `cadence-core` and `cadence-infra`
//! - Holds no business rules of its own

pub mod commands;
pub mod context;
pub mod utils;

pub use commands::{dispatch, handle_line, Command, Response};
pub use context::AppContext;
