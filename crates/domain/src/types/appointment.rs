//! Appointment (calendar booking) types

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a single booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

crate::impl_domain_status_conversions!(AppointmentStatus {
    Scheduled => "scheduled",
    Confirmed => "confirmed",
    InProgress => "in_progress",
    Completed => "completed",
    Cancelled => "cancelled",
    NoShow => "no_show",
});

impl AppointmentStatus {
    /// Terminal states have no outgoing transitions.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::NoShow)
    }

    /// Whether a booking in this state occupies the staff member's time.
    pub const fn occupies_calendar(self) -> bool {
        !matches!(self, Self::Cancelled | Self::NoShow)
    }
}

/// A concrete booking on one staff member's timeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub client_id: String,
    pub service_id: String,
    pub staff_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub buffer_minutes: u32,
    pub status: AppointmentStatus,
    pub price_cents: Option<i64>,
    pub series_id: Option<String>,
    pub is_detached_from_series: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// End of the time this booking blocks, buffer included.
    pub fn blocked_until(&self) -> DateTime<Utc> {
        self.end_time + Duration::minutes(i64::from(self.buffer_minutes))
    }

    /// Linked to a series and still subject to series-wide mutations.
    pub fn follows_series(&self, series_id: &str) -> bool {
        self.series_id.as_deref() == Some(series_id) && !self.is_detached_from_series
    }
}

/// Everything needed to write a new booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBooking {
    pub client_id: String,
    pub service_id: String,
    pub staff_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub buffer_minutes: u32,
    pub price_cents: Option<i64>,
    pub series_id: Option<String>,
    pub notes: Option<String>,
}

impl NewBooking {
    pub fn blocked_until(&self) -> DateTime<Utc> {
        self.end_time + Duration::minutes(i64::from(self.buffer_minutes))
    }
}

/// Result of an atomic check-and-write against the booking store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingAttempt {
    Booked(Appointment),
    Conflict { conflicting_ids: Vec<String> },
}
