//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::AppointmentStatus;

/// Main error type for Cadence
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum CadenceError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Inactive reference: {0}")]
    InactiveReference(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: AppointmentStatus, to: AppointmentStatus },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Scheduling conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CadenceError {
    /// Shorthand for a missing series.
    pub fn series_not_found(series_id: &str) -> Self {
        Self::NotFound(format!("recurring series {series_id}"))
    }

    /// Shorthand for a missing appointment.
    pub fn appointment_not_found(appointment_id: &str) -> Self {
        Self::NotFound(format!("appointment {appointment_id}"))
    }
}

/// Result type alias for Cadence operations
pub type Result<T> = std::result::Result<T, CadenceError>;
