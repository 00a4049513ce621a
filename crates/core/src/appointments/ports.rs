//! Port interfaces for the shared booking calendar

use async_trait::async_trait;
use cadence_domain::{Appointment, AppointmentStatus, BookingAttempt, NewBooking, Result};
use chrono::{DateTime, Utc};

/// Transactional record store for appointments.
///
/// The `*_if_free` methods are the only writes that place a booking on a
/// timeline. Implementations must run the overlap check and the write as one
/// serialised unit, so that two concurrent callers cannot both book
/// overlapping time for the same staff member.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Bookings of `staff_id` (any status) whose blocked interval intersects
    /// `[range_start, range_end)`, ordered by start.
    async fn find_bookings(
        &self,
        staff_id: &str,
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>>;

    /// Fetch one appointment by id
    async fn get_appointment(&self, id: &str) -> Result<Option<Appointment>>;

    /// Every appointment linked to a series (detached ones included), ordered
    /// by start.
    async fn series_appointments(&self, series_id: &str) -> Result<Vec<Appointment>>;

    /// Insert `booking` unless it collides with an occupying booking.
    async fn create_if_free(&self, booking: NewBooking) -> Result<BookingAttempt>;

    /// Move an existing appointment unless the new interval collides with any
    /// other occupying booking.
    async fn reschedule_if_free(
        &self,
        id: &str,
        staff_id: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        buffer_minutes: u32,
    ) -> Result<BookingAttempt>;

    /// Set the status to `status` only while it is still `expected`.
    ///
    /// Transition rules are checked by the caller against `expected`. If the
    /// stored status has moved on since it was read, nothing is written and
    /// the call fails with `InvalidTransition` from the actual status.
    async fn update_status(
        &self,
        id: &str,
        expected: AppointmentStatus,
        status: AppointmentStatus,
    ) -> Result<Appointment>;

    /// Cancel the given appointments in one unit, leaving any that are
    /// already terminal untouched. Returns the ids actually cancelled.
    async fn cancel_appointments(&self, ids: &[String]) -> Result<Vec<String>>;

    /// Mark an appointment as detached from its series
    async fn set_detached(&self, id: &str) -> Result<Appointment>;
}
