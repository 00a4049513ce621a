//! Interval-overlap conflict detection
//!
//! Every booking blocks the half-open interval `[start, end + buffer)` on its
//! staff member's timeline. Only bookings that still occupy the calendar
//! (not cancelled, not no-show) take part.

use cadence_domain::Appointment;
use chrono::{DateTime, Utc};

/// Half-open `[start, end)` overlap. Empty intervals overlap nothing.
pub fn intervals_overlap(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < a_end && b_start < b_end && a_start < b_end && b_start < a_end
}

/// A candidate interval for one staff member.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub staff_id: &'a str,
    pub start: DateTime<Utc>,
    /// End of the blocked time, buffer included.
    pub blocked_until: DateTime<Utc>,
    /// Booking to ignore, used when re-checking a booking against the rest.
    pub exclude_id: Option<&'a str>,
}

/// Existing bookings the candidate collides with, in input order.
pub fn find_conflicts<'b>(candidate: &Candidate<'_>, existing: &'b [Appointment]) -> Vec<&'b Appointment> {
    existing.iter().filter(|booking| collides(candidate, booking)).collect()
}

pub fn has_conflict(candidate: &Candidate<'_>, existing: &[Appointment]) -> bool {
    existing.iter().any(|booking| collides(candidate, booking))
}

fn collides(candidate: &Candidate<'_>, booking: &Appointment) -> bool {
    booking.staff_id == candidate.staff_id
        && booking.status.occupies_calendar()
        && candidate.exclude_id != Some(booking.id.as_str())
        && intervals_overlap(
            candidate.start,
            candidate.blocked_until,
            booking.start_time,
            booking.blocked_until(),
        )
}
