//! Append-only audit events emitted by series lifecycle operations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesAuditAction {
    Created,
    Cloned,
    Updated,
    FutureInstancesUpdated,
    Cancelled,
    Paused,
    Resumed,
    Extended,
    ExceptionAdded,
    ExceptionRemoved,
    OccurrenceDetached,
    CancelledFromDate,
}

crate::impl_domain_status_conversions!(SeriesAuditAction {
    Created => "created",
    Cloned => "cloned",
    Updated => "updated",
    FutureInstancesUpdated => "future_instances_updated",
    Cancelled => "cancelled",
    Paused => "paused",
    Resumed => "resumed",
    Extended => "extended",
    ExceptionAdded => "exception_added",
    ExceptionRemoved => "exception_removed",
    OccurrenceDetached => "occurrence_detached",
    CancelledFromDate => "cancelled_from_date",
});

/// One audit log entry; never mutated after it is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: String,
    pub series_id: String,
    pub action: SeriesAuditAction,
    pub actor: String,
    pub changes: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
