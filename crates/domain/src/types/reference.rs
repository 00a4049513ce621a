//! Read-only views of entities owned by other parts of the system
//! (clients, services, staff) and of business settings.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::{CadenceError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRef {
    pub id: String,
    pub name: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRef {
    pub id: String,
    pub name: String,
    pub duration_minutes: u32,
    pub price_cents: Option<i64>,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffRef {
    pub id: String,
    pub name: String,
    pub is_active: bool,
}

/// Business timezone and opening hours (read-only settings).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessSettings {
    pub timezone: Tz,
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl BusinessSettings {
    pub fn new(timezone: Tz, open: NaiveTime, close: NaiveTime) -> Result<Self> {
        if open >= close {
            return Err(CadenceError::Validation(format!(
                "business hours open ({open}) must be before close ({close})"
            )));
        }
        Ok(Self { timezone, open, close })
    }

    /// Whether `[start, end)` on `date` fits inside opening hours.
    pub fn contains(&self, date: NaiveDate, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        let open = date.and_time(self.open);
        let close = date.and_time(self.close);
        start >= open && end <= close
    }
}
