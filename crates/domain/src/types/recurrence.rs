//! Recurrence rule types
//!
//! A pattern is a sum type: each variant carries exactly the parameters it
//! needs, so a weekly rule without a weekday list or an nth-weekday rule
//! without an ordinal cannot be expressed.

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{CadenceError, Result};

/// Recurrence pattern with per-variant parameters.
///
/// Weekdays are exchanged as integers `0..=6` with `0 = Sunday`. A missing
/// `day_of_week` means "the weekday of the anchor date".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecurrencePattern {
    Daily,
    Weekly {
        #[serde(default, with = "weekday_index::option")]
        day_of_week: Option<Weekday>,
    },
    Biweekly {
        #[serde(default, with = "weekday_index::option")]
        day_of_week: Option<Weekday>,
    },
    Monthly {
        #[serde(default, with = "weekday_index::option")]
        day_of_week: Option<Weekday>,
    },
    Custom {
        every_weeks: u32,
        #[serde(default, with = "weekday_index::option")]
        day_of_week: Option<Weekday>,
    },
    SpecificDays {
        #[serde(with = "weekday_index::list")]
        days: Vec<Weekday>,
    },
    NthWeekday {
        week: NthWeek,
        #[serde(with = "weekday_index")]
        day_of_week: Weekday,
    },
}

impl RecurrencePattern {
    /// Stable discriminant used for storage and logging.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly { .. } => "weekly",
            Self::Biweekly { .. } => "biweekly",
            Self::Monthly { .. } => "monthly",
            Self::Custom { .. } => "custom",
            Self::SpecificDays { .. } => "specific_days",
            Self::NthWeekday { .. } => "nth_weekday",
        }
    }

    /// Fail fast on parameter combinations the evaluator cannot walk.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Custom { every_weeks: 0, .. } => {
                Err(CadenceError::Validation("custom pattern requires every_weeks >= 1".into()))
            }
            Self::SpecificDays { days } if days.is_empty() => Err(CadenceError::Validation(
                "specific_days pattern requires at least one weekday".into(),
            )),
            Self::NthWeekday { week: NthWeek::Ordinal(n), .. } if !(1..=5).contains(n) => {
                Err(CadenceError::Validation(format!(
                    "nth_weekday week must be 1-5 or last, got {n}"
                )))
            }
            _ => Ok(()),
        }
    }

    /// Replace a missing weekday with the anchor's weekday, so the stored
    /// rule no longer depends on where later generation runs start.
    #[must_use]
    pub fn pinned_to(&self, anchor: NaiveDate) -> Self {
        let pin = |day: &Option<Weekday>| Some(day.unwrap_or_else(|| anchor.weekday()));
        match self {
            Self::Weekly { day_of_week } => Self::Weekly { day_of_week: pin(day_of_week) },
            Self::Biweekly { day_of_week } => Self::Biweekly { day_of_week: pin(day_of_week) },
            Self::Monthly { day_of_week } => Self::Monthly { day_of_week: pin(day_of_week) },
            Self::Custom { every_weeks, day_of_week } => {
                Self::Custom { every_weeks: *every_weeks, day_of_week: pin(day_of_week) }
            }
            other => other.clone(),
        }
    }
}

/// Which occurrence of a weekday inside a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NthWeek {
    /// 1-based ordinal, valid range `1..=5`.
    Ordinal(u8),
    Last,
}

impl NthWeek {
    /// Wire sentinel for [`NthWeek::Last`].
    pub const LAST_SENTINEL: i8 = -1;

    /// Build from the wire representation (`1..=5` or `-1`).
    pub fn from_wire(value: i8) -> Result<Self> {
        match value {
            Self::LAST_SENTINEL => Ok(Self::Last),
            1..=5 => Ok(Self::Ordinal(value.unsigned_abs())),
            other => Err(CadenceError::Validation(format!(
                "nth week must be 1-5 or -1 (last), got {other}"
            ))),
        }
    }

    /// Ordinals are validated to `1..=5`, so the cast is lossless.
    #[allow(clippy::cast_possible_wrap)]
    pub const fn to_wire(self) -> i8 {
        match self {
            Self::Ordinal(n) => n as i8,
            Self::Last => Self::LAST_SENTINEL,
        }
    }
}

impl Serialize for NthWeek {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_i8(self.to_wire())
    }
}

impl<'de> Deserialize<'de> for NthWeek {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = i8::deserialize(deserializer)?;
        Self::from_wire(raw).map_err(serde::de::Error::custom)
    }
}

/// When a series stops generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EndCondition {
    Never,
    AfterCount { count: u32 },
    ByDate { date: NaiveDate },
}

impl EndCondition {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Never => "never",
            Self::AfterCount { .. } => "after_count",
            Self::ByDate { .. } => "by_date",
        }
    }

    pub fn validate(&self, start_date: NaiveDate) -> Result<()> {
        match *self {
            Self::AfterCount { count: 0 } => {
                Err(CadenceError::Validation("end after count must be at least 1".into()))
            }
            Self::ByDate { date } if date < start_date => Err(CadenceError::Validation(format!(
                "end date {date} precedes start date {start_date}"
            ))),
            _ => Ok(()),
        }
    }
}

/// Pattern + wall-clock time + end condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub pattern: RecurrencePattern,
    pub time_of_day: NaiveTime,
    pub end: EndCondition,
}

impl RecurrenceRule {
    pub fn validate(&self, start_date: NaiveDate) -> Result<()> {
        self.pattern.validate()?;
        self.end.validate(start_date)
    }
}

/// Convert a `0..=6` (Sunday-first) index to a weekday.
pub fn weekday_from_index(index: u8) -> Result<Weekday> {
    match index {
        0 => Ok(Weekday::Sun),
        1 => Ok(Weekday::Mon),
        2 => Ok(Weekday::Tue),
        3 => Ok(Weekday::Wed),
        4 => Ok(Weekday::Thu),
        5 => Ok(Weekday::Fri),
        6 => Ok(Weekday::Sat),
        other => Err(CadenceError::Validation(format!("day of week must be 0-6, got {other}"))),
    }
}

/// Sunday-first index of a weekday.
#[allow(clippy::cast_possible_truncation)]
pub fn weekday_to_index(day: Weekday) -> u8 {
    day.num_days_from_sunday() as u8
}

/// Serde adapters for weekday indices.
pub mod weekday_index {
    use chrono::Weekday;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{weekday_from_index, weekday_to_index};

    pub fn serialize<S: Serializer>(day: &Weekday, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(weekday_to_index(*day))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Weekday, D::Error> {
        let raw = u8::deserialize(deserializer)?;
        weekday_from_index(raw).map_err(serde::de::Error::custom)
    }

    pub mod option {
        use chrono::Weekday;
        use serde::{Deserialize, Deserializer, Serializer};

        use super::super::{weekday_from_index, weekday_to_index};

        pub fn serialize<S: Serializer>(
            day: &Option<Weekday>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match day {
                Some(day) => serializer.serialize_some(&weekday_to_index(*day)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Weekday>, D::Error> {
            Option::<u8>::deserialize(deserializer)?
                .map(weekday_from_index)
                .transpose()
                .map_err(serde::de::Error::custom)
        }
    }

    pub mod list {
        use chrono::Weekday;
        use serde::ser::SerializeSeq;
        use serde::{Deserialize, Deserializer, Serializer};

        use super::super::{weekday_from_index, weekday_to_index};

        pub fn serialize<S: Serializer>(
            days: &[Weekday],
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            let mut seq = serializer.serialize_seq(Some(days.len()))?;
            for day in days {
                seq.serialize_element(&weekday_to_index(*day))?;
            }
            seq.end()
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Vec<Weekday>, D::Error> {
            let raw = Vec::<u8>::deserialize(deserializer)?;
            let mut days = Vec::with_capacity(raw.len());
            for index in raw {
                let day = weekday_from_index(index).map_err(serde::de::Error::custom)?;
                if !days.contains(&day) {
                    days.push(day);
                }
            }
            Ok(days)
        }
    }
}
