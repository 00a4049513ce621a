//! Recurrence rule evaluation

pub mod evaluator;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

pub use evaluator::{generate, nth_weekday_of_month, GenerationWindow};

/// Pin a business-local wall-clock time to an instant.
///
/// Returns `None` for times inside a DST gap; ambiguous times resolve to the
/// earlier instant.
pub fn localize(timezone: Tz, local: NaiveDateTime) -> Option<DateTime<Utc>> {
    timezone.from_local_datetime(&local).earliest().map(|at| at.with_timezone(&Utc))
}
