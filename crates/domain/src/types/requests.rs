//! Caller-supplied inputs for series operations

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::recurrence::RecurrenceRule;

/// How the caller wants a specific generated date handled on create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DateResolution {
    Skip,
    /// Book at this wall-clock time instead of the rule's time of day.
    Alternative { time_of_day: NaiveTime },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateChoice {
    pub date: NaiveDate,
    pub resolution: DateResolution,
}

/// Everything needed to create (or preview) a series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSeriesRequest {
    pub client_id: String,
    pub service_id: String,
    pub staff_id: String,
    pub rule: RecurrenceRule,
    /// Defaults to today in the business timezone.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub locked_price_cents: Option<i64>,
    #[serde(default)]
    pub buffer_minutes: u32,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub exception_dates: Vec<NaiveDate>,
    /// Per-date decisions, usually taken from a prior preview.
    #[serde(default)]
    pub resolutions: Vec<DateChoice>,
}

/// Series configuration changes. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesUpdate {
    #[serde(default)]
    pub staff_id: Option<String>,
    #[serde(default)]
    pub time_of_day: Option<NaiveTime>,
    #[serde(default)]
    pub buffer_minutes: Option<u32>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl SeriesUpdate {
    pub const fn is_empty(&self) -> bool {
        self.staff_id.is_none()
            && self.time_of_day.is_none()
            && self.buffer_minutes.is_none()
            && self.notes.is_none()
    }
}

/// Optional overrides applied when cloning a series.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloneOverrides {
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub staff_id: Option<String>,
    #[serde(default)]
    pub time_of_day: Option<NaiveTime>,
}

/// A single booking outside any series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub client_id: String,
    pub service_id: String,
    pub staff_id: String,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub buffer_minutes: u32,
    /// Overrides the service's list price.
    #[serde(default)]
    pub price_cents: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Ask for free slots near a preferred time on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlternativesRequest {
    pub staff_id: String,
    pub service_id: String,
    pub date: NaiveDate,
    pub preferred_time: NaiveTime,
    #[serde(default)]
    pub buffer_minutes: u32,
}
