//! Domain types and models

pub mod appointment;
pub mod audit;
pub mod outcomes;
pub mod recurrence;
pub mod reference;
pub mod requests;
pub mod series;

pub use appointment::{Appointment, AppointmentStatus, BookingAttempt, NewBooking};
pub use audit::{AuditEvent, SeriesAuditAction};
pub use outcomes::{
    AlternativeSlot, CancellationOutcome, ConflictPreview, ConflictingDate, ExceptionOutcome,
    ExtensionOutcome, FutureUpdateOutcome, PlannedOccurrence, SeriesCreationOutcome,
    SeriesDetails, SkipReason, SkippedDate, SkippedInstance,
};
pub use recurrence::{
    weekday_from_index, weekday_to_index, EndCondition, NthWeek, RecurrencePattern,
    RecurrenceRule,
};
pub use reference::{BusinessSettings, ClientRef, ServiceRef, StaffRef};
pub use requests::{
    AlternativesRequest, BookAppointmentRequest, CloneOverrides, CreateSeriesRequest, DateChoice,
    DateResolution, SeriesUpdate,
};
pub use series::{ExceptionDate, RecurringSeries, SeriesPause};

/// Fresh time-ordered identifier for any persisted record.
pub fn new_id() -> String {
    uuid::Uuid::now_v7().to_string()
}
