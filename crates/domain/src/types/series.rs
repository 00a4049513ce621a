//! Recurring series and exception dates

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::recurrence::{EndCondition, RecurrenceRule};

/// Temporary suspension of generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesPause {
    pub paused_at: DateTime<Utc>,
    pub paused_until: Option<NaiveDate>,
}

/// A persisted recurrence definition and its running state.
///
/// `is_active == false` is terminal. A pause can only exist on an active
/// series; [`RecurringSeries::is_paused`] reports false for cancelled rows
/// regardless of what is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringSeries {
    pub id: String,
    pub client_id: String,
    pub service_id: String,
    pub staff_id: String,
    pub rule: RecurrenceRule,
    pub start_date: NaiveDate,
    /// Lifetime count of instances ever created; never decremented.
    pub occurrences_created: u32,
    pub is_active: bool,
    pub pause: Option<SeriesPause>,
    pub locked_price_cents: Option<i64>,
    pub buffer_minutes: u32,
    pub notes: Option<String>,
    pub cloned_from: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RecurringSeries {
    pub const fn is_paused(&self) -> bool {
        self.is_active && self.pause.is_some()
    }

    pub const fn time_of_day(&self) -> NaiveTime {
        self.rule.time_of_day
    }

    /// Remaining AFTER_COUNT budget, `None` for other end conditions.
    pub fn remaining_count(&self) -> Option<u32> {
        match self.rule.end {
            EndCondition::AfterCount { count } => {
                Some(count.saturating_sub(self.occurrences_created))
            }
            _ => None,
        }
    }

    /// Whether the end condition leaves nothing to generate as of `today`.
    pub fn end_condition_exhausted(&self, today: NaiveDate) -> bool {
        match self.rule.end {
            EndCondition::Never => false,
            EndCondition::AfterCount { count } => self.occurrences_created >= count,
            EndCondition::ByDate { date } => date < today,
        }
    }
}

/// A calendar day excluded from a series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionDate {
    pub series_id: String,
    pub date: NaiveDate,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}
