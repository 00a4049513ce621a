//! Batch results returned by lifecycle operations
//!
//! Batch operations succeed partially by design: every outcome carries both
//! the instances that were written and the dates that were not, each with a
//! reason. A conflict on one date never fails the whole call.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::appointment::Appointment;
use super::series::{ExceptionDate, RecurringSeries};

/// Why a candidate date produced no instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkipReason {
    #[serde(rename = "time slot conflict")]
    TimeSlotConflict,
    #[serde(rename = "alternative no longer available")]
    AlternativeUnavailable,
    #[serde(rename = "skipped by request")]
    SkippedByRequest,
    #[serde(rename = "nonexistent local time")]
    NonexistentLocalTime,
}

crate::impl_domain_status_conversions!(SkipReason {
    TimeSlotConflict => "time slot conflict",
    AlternativeUnavailable => "alternative no longer available",
    SkippedByRequest => "skipped by request",
    NonexistentLocalTime => "nonexistent local time",
});

/// A generated date that was not materialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedDate {
    pub date: NaiveDate,
    /// Wall-clock start that was requested, in the business timezone.
    pub requested_start: NaiveDateTime,
    pub reason: SkipReason,
}

/// An existing instance a future-instance update could not move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedInstance {
    pub appointment_id: String,
    pub requested_start: DateTime<Utc>,
    pub reason: SkipReason,
}

/// A validated, currently free slot near a preferred time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlternativeSlot {
    pub local_start: NaiveDateTime,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Signed distance from the preferred time.
    pub offset_minutes: i64,
}

/// A candidate occurrence with its concrete interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedOccurrence {
    pub date: NaiveDate,
    pub local_start: NaiveDateTime,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// A candidate that collides with existing bookings, plus nearby options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictingDate {
    pub occurrence: PlannedOccurrence,
    pub conflicting_ids: Vec<String>,
    pub alternatives: Vec<AlternativeSlot>,
}

/// Read-only result of a create dry run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictPreview {
    pub available: Vec<PlannedOccurrence>,
    pub conflicts: Vec<ConflictingDate>,
    /// Dates that cannot be booked at all (e.g. inside a DST gap).
    pub skipped: Vec<SkippedDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesCreationOutcome {
    pub series: RecurringSeries,
    pub created: Vec<Appointment>,
    pub skipped: Vec<SkippedDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionOutcome {
    pub series: RecurringSeries,
    pub created: Vec<Appointment>,
    pub skipped: Vec<SkippedDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FutureUpdateOutcome {
    pub series: RecurringSeries,
    pub updated: Vec<Appointment>,
    pub skipped: Vec<SkippedInstance>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancellationOutcome {
    pub series_id: String,
    /// Ids of instances moved to `cancelled` by this call.
    pub cancelled: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionOutcome {
    pub exception: ExceptionDate,
    pub cancelled: Vec<String>,
}

/// A series together with its exceptions and linked instances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesDetails {
    pub series: RecurringSeries,
    pub exceptions: Vec<ExceptionDate>,
    /// Ordered by start time.
    pub appointments: Vec<Appointment>,
}
