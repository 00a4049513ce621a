//! SQLite persistence for recurring series and their exception dates.

use std::sync::Arc;

use async_trait::async_trait;
use cadence_core::SeriesRepository;
use cadence_domain::{
    CadenceError, ExceptionDate, RecurrenceRule, RecurringSeries, Result as DomainResult,
    SeriesPause,
};
use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, ToSql};
use tokio::task;
use tracing::{debug, instrument};

use super::columns::{conversion_error, counter, date, date_text, flag, instant, minutes, timestamp};
use super::manager::DbManager;
use crate::errors::to_domain;

pub struct SqliteSeriesRepository {
    db: Arc<DbManager>,
}

impl SqliteSeriesRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SeriesRepository for SqliteSeriesRepository {
    #[instrument(skip(self, series, exceptions), fields(series_id = %series.id, exceptions = exceptions.len()))]
    async fn insert_series(
        &self,
        series: &RecurringSeries,
        exceptions: &[ExceptionDate],
    ) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let series = series.clone();
        let exceptions = exceptions.to_vec();

        task::spawn_blocking(move || -> DomainResult<()> {
            let rule_json = serde_json::to_string(&series.rule).map_err(to_domain)?;
            let mut conn = db.get_connection()?;
            let tx = conn.transaction().map_err(to_domain)?;

            let (paused_at, paused_until) = pause_columns(series.pause.as_ref());
            tx.execute(
                SERIES_INSERT_SQL,
                params![
                    series.id,
                    series.client_id,
                    series.service_id,
                    series.staff_id,
                    series.rule.pattern.kind(),
                    rule_json,
                    date_text(series.start_date),
                    series.occurrences_created,
                    flag(series.is_active),
                    paused_at,
                    paused_until,
                    series.locked_price_cents,
                    series.buffer_minutes,
                    series.notes,
                    series.cloned_from,
                    series.created_by,
                    timestamp(series.created_at),
                    timestamp(series.updated_at),
                ],
            )
            .map_err(to_domain)?;

            for exception in &exceptions {
                insert_exception_row(&tx, exception).map_err(to_domain)?;
            }

            tx.commit().map_err(to_domain)?;
            debug!("series stored");
            Ok(())
        })
        .await
        .map_err(to_domain)?
    }

    async fn get_series(&self, id: &str) -> DomainResult<Option<RecurringSeries>> {
        let db = Arc::clone(&self.db);
        let id = id.to_owned();

        task::spawn_blocking(move || -> DomainResult<Option<RecurringSeries>> {
            let conn = db.get_connection()?;
            conn.query_row(SERIES_SELECT_SQL, [&id], map_series_row)
                .optional()
                .map_err(to_domain)
        })
        .await
        .map_err(to_domain)?
    }

    #[instrument(skip(self, series), fields(series_id = %series.id))]
    async fn update_series(&self, series: &RecurringSeries) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let series = series.clone();

        task::spawn_blocking(move || -> DomainResult<()> {
            let rule_json = serde_json::to_string(&series.rule).map_err(to_domain)?;
            let (paused_at, paused_until) = pause_columns(series.pause.as_ref());
            let conn = db.get_connection()?;
            let changed = conn
                .execute(
                    SERIES_UPDATE_SQL,
                    params![
                        series.id,
                        series.service_id,
                        series.staff_id,
                        series.rule.pattern.kind(),
                        rule_json,
                        series.occurrences_created,
                        flag(series.is_active),
                        paused_at,
                        paused_until,
                        series.locked_price_cents,
                        series.buffer_minutes,
                        series.notes,
                        timestamp(series.updated_at),
                    ],
                )
                .map_err(to_domain)?;
            if changed == 0 {
                return Err(CadenceError::series_not_found(&series.id));
            }
            Ok(())
        })
        .await
        .map_err(to_domain)?
    }

    async fn list_exceptions(&self, series_id: &str) -> DomainResult<Vec<ExceptionDate>> {
        let db = Arc::clone(&self.db);
        let series_id = series_id.to_owned();

        task::spawn_blocking(move || -> DomainResult<Vec<ExceptionDate>> {
            let conn = db.get_connection()?;
            let mut stmt = conn.prepare(EXCEPTIONS_BY_SERIES_SQL).map_err(to_domain)?;
            let params: [&dyn ToSql; 1] = [&series_id];
            let rows = stmt.query_map(params, map_exception_row).map_err(to_domain)?;
            rows.collect::<Result<Vec<_>, _>>().map_err(to_domain)
        })
        .await
        .map_err(to_domain)?
    }

    async fn insert_exception(&self, exception: &ExceptionDate) -> DomainResult<bool> {
        let db = Arc::clone(&self.db);
        let exception = exception.clone();

        task::spawn_blocking(move || -> DomainResult<bool> {
            let conn = db.get_connection()?;
            let inserted = insert_exception_row(&conn, &exception).map_err(to_domain)?;
            Ok(inserted == 1)
        })
        .await
        .map_err(to_domain)?
    }

    async fn delete_exception(
        &self,
        series_id: &str,
        on: NaiveDate,
    ) -> DomainResult<Option<ExceptionDate>> {
        let db = Arc::clone(&self.db);
        let series_id = series_id.to_owned();

        task::spawn_blocking(move || -> DomainResult<Option<ExceptionDate>> {
            let mut conn = db.get_connection()?;
            let tx = conn.transaction().map_err(to_domain)?;
            let day = date_text(on);

            let existing = tx
                .query_row(EXCEPTION_SELECT_SQL, params![series_id, day], map_exception_row)
                .optional()
                .map_err(to_domain)?;
            if existing.is_some() {
                tx.execute(
                    "DELETE FROM series_exception_dates WHERE series_id = ?1 AND exception_date = ?2",
                    params![series_id, day],
                )
                .map_err(to_domain)?;
            }
            tx.commit().map_err(to_domain)?;
            Ok(existing)
        })
        .await
        .map_err(to_domain)?
    }
}

const SERIES_INSERT_SQL: &str = "INSERT INTO recurring_series (
        id, client_id, service_id, staff_id, pattern_kind, rule_json, start_date,
        occurrences_created, is_active, paused_at, paused_until, locked_price_cents,
        buffer_minutes, notes, cloned_from, created_by, created_at, updated_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)";

const SERIES_SELECT_SQL: &str = "SELECT id, client_id, service_id, staff_id, rule_json,
        start_date, occurrences_created, is_active, paused_at, paused_until, locked_price_cents,
        buffer_minutes, notes, cloned_from, created_by, created_at, updated_at
    FROM recurring_series
    WHERE id = ?1";

// client, start date, lineage and creator are fixed at creation
const SERIES_UPDATE_SQL: &str = "UPDATE recurring_series
    SET service_id = ?2, staff_id = ?3, pattern_kind = ?4, rule_json = ?5,
        occurrences_created = ?6, is_active = ?7, paused_at = ?8, paused_until = ?9,
        locked_price_cents = ?10, buffer_minutes = ?11, notes = ?12, updated_at = ?13
    WHERE id = ?1";

const EXCEPTION_INSERT_SQL: &str = "INSERT OR IGNORE INTO series_exception_dates
        (series_id, exception_date, reason, created_at)
    VALUES (?1, ?2, ?3, ?4)";

const EXCEPTION_SELECT_SQL: &str = "SELECT series_id, exception_date, reason, created_at
    FROM series_exception_dates
    WHERE series_id = ?1 AND exception_date = ?2";

const EXCEPTIONS_BY_SERIES_SQL: &str = "SELECT series_id, exception_date, reason, created_at
    FROM series_exception_dates
    WHERE series_id = ?1
    ORDER BY exception_date";

fn insert_exception_row(conn: &Connection, exception: &ExceptionDate) -> rusqlite::Result<usize> {
    conn.execute(
        EXCEPTION_INSERT_SQL,
        params![
            exception.series_id,
            date_text(exception.date),
            exception.reason,
            timestamp(exception.created_at),
        ],
    )
}

fn pause_columns(pause: Option<&SeriesPause>) -> (Option<i64>, Option<String>) {
    match pause {
        Some(pause) => (Some(timestamp(pause.paused_at)), pause.paused_until.map(date_text)),
        None => (None, None),
    }
}

fn map_series_row(row: &Row<'_>) -> rusqlite::Result<RecurringSeries> {
    let rule_json: String = row.get(4)?;
    let rule: RecurrenceRule = serde_json::from_str(&rule_json)
        .map_err(|err| conversion_error(4, Type::Text, format!("invalid rule: {err}")))?;

    let start_raw: String = row.get(5)?;
    let occurrences: i64 = row.get(6)?;
    let paused_at: Option<i64> = row.get(8)?;
    let paused_until: Option<String> = row.get(9)?;

    let pause = match paused_at {
        Some(secs) => Some(SeriesPause {
            paused_at: instant(8, secs)?,
            paused_until: paused_until.as_deref().map(|raw| date(9, raw)).transpose()?,
        }),
        None => None,
    };

    Ok(RecurringSeries {
        id: row.get(0)?,
        client_id: row.get(1)?,
        service_id: row.get(2)?,
        staff_id: row.get(3)?,
        rule,
        start_date: date(5, &start_raw)?,
        occurrences_created: counter(6, occurrences)?,
        is_active: row.get::<_, i64>(7)? != 0,
        pause,
        locked_price_cents: row.get(10)?,
        buffer_minutes: minutes(11, row.get(11)?)?,
        notes: row.get(12)?,
        cloned_from: row.get(13)?,
        created_by: row.get(14)?,
        created_at: instant(15, row.get(15)?)?,
        updated_at: instant(16, row.get(16)?)?,
    })
}

fn map_exception_row(row: &Row<'_>) -> rusqlite::Result<ExceptionDate> {
    let raw: String = row.get(1)?;
    Ok(ExceptionDate {
        series_id: row.get(0)?,
        date: date(1, &raw)?,
        reason: row.get(2)?,
        created_at: instant(3, row.get(3)?)?,
    })
}
