//! Column codecs shared by the SQLite repositories.
//!
//! Instants are stored as Unix seconds and calendar dates as `YYYY-MM-DD`
//! text, so values read back compare equal at second precision.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub(crate) fn timestamp(at: DateTime<Utc>) -> i64 {
    at.timestamp()
}

pub(crate) fn instant(column: usize, secs: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| conversion_error(column, Type::Integer, format!("timestamp {secs} out of range")))
}

pub(crate) fn date_text(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub(crate) fn date(column: usize, raw: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|err| conversion_error(column, Type::Text, format!("invalid date {raw}: {err}")))
}

pub(crate) fn minutes(column: usize, raw: i64) -> rusqlite::Result<u32> {
    u32::try_from(raw).map_err(|_| conversion_error(column, Type::Integer, format!("invalid minutes {raw}")))
}

pub(crate) fn counter(column: usize, raw: i64) -> rusqlite::Result<u32> {
    u32::try_from(raw).map_err(|_| conversion_error(column, Type::Integer, format!("invalid count {raw}")))
}

pub(crate) const fn flag(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

pub(crate) fn conversion_error(column: usize, ty: Type, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, ty, message.into())
}
