//! SQLite-backed implementation of the `BookingStore` port.
//!
//! The conditional writes open a `BEGIN IMMEDIATE` transaction, which takes
//! SQLite's single writer lock before the overlap read. Two callers racing
//! for the same time on any connection (or process) are therefore serialised
//! and the second one sees the first one's row.

use std::sync::Arc;

use async_trait::async_trait;
use cadence_core::conflict::{find_conflicts, Candidate};
use cadence_core::BookingStore;
use cadence_domain::{
    new_id, Appointment, AppointmentStatus, BookingAttempt, CadenceError, NewBooking,
    Result as DomainResult,
};
use chrono::{DateTime, Duration, SubsecRound, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, ToSql, TransactionBehavior};
use tokio::task;
use tracing::{debug, instrument, warn};

use super::columns::{conversion_error, flag, instant, minutes, timestamp};
use super::manager::DbManager;
use crate::errors::to_domain;

/// Appointment calendar stored in the `appointments` table.
pub struct SqliteBookingStore {
    db: Arc<DbManager>,
}

impl SqliteBookingStore {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BookingStore for SqliteBookingStore {
    #[instrument(skip(self))]
    async fn find_bookings(
        &self,
        staff_id: &str,
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
    ) -> DomainResult<Vec<Appointment>> {
        let db = Arc::clone(&self.db);
        let staff_id = staff_id.to_owned();

        task::spawn_blocking(move || -> DomainResult<Vec<Appointment>> {
            let conn = db.get_connection()?;
            overlapping(&conn, &staff_id, range_start, range_end).map_err(to_domain)
        })
        .await
        .map_err(to_domain)?
    }

    async fn get_appointment(&self, id: &str) -> DomainResult<Option<Appointment>> {
        let db = Arc::clone(&self.db);
        let id = id.to_owned();

        task::spawn_blocking(move || -> DomainResult<Option<Appointment>> {
            let conn = db.get_connection()?;
            fetch_one(&conn, &id).map_err(to_domain)
        })
        .await
        .map_err(to_domain)?
    }

    async fn series_appointments(&self, series_id: &str) -> DomainResult<Vec<Appointment>> {
        let db = Arc::clone(&self.db);
        let series_id = series_id.to_owned();

        task::spawn_blocking(move || -> DomainResult<Vec<Appointment>> {
            let conn = db.get_connection()?;
            let params: [&dyn ToSql; 1] = [&series_id];
            query_appointments(&conn, APPOINTMENTS_BY_SERIES, &params).map_err(to_domain)
        })
        .await
        .map_err(to_domain)?
    }

    #[instrument(skip(self, booking), fields(staff_id = %booking.staff_id, start = %booking.start_time))]
    async fn create_if_free(&self, booking: NewBooking) -> DomainResult<BookingAttempt> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<BookingAttempt> {
            let mut conn = db.get_connection()?;
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(to_domain)?;

            let blocked_until = booking.blocked_until();
            let existing = overlapping(&tx, &booking.staff_id, booking.start_time, blocked_until)
                .map_err(to_domain)?;
            let candidate = Candidate {
                staff_id: &booking.staff_id,
                start: booking.start_time,
                blocked_until,
                exclude_id: None,
            };
            let conflicting_ids = ids(&find_conflicts(&candidate, &existing));
            if !conflicting_ids.is_empty() {
                debug!(?conflicting_ids, "slot taken");
                return Ok(BookingAttempt::Conflict { conflicting_ids });
            }

            let now = Utc::now().trunc_subsecs(0);
            let appointment = Appointment {
                id: new_id(),
                client_id: booking.client_id,
                service_id: booking.service_id,
                staff_id: booking.staff_id,
                start_time: booking.start_time,
                end_time: booking.end_time,
                buffer_minutes: booking.buffer_minutes,
                status: AppointmentStatus::Scheduled,
                price_cents: booking.price_cents,
                series_id: booking.series_id,
                is_detached_from_series: false,
                notes: booking.notes,
                created_at: now,
                updated_at: now,
            };
            insert_appointment(&tx, &appointment).map_err(to_domain)?;
            tx.commit().map_err(to_domain)?;
            Ok(BookingAttempt::Booked(appointment))
        })
        .await
        .map_err(to_domain)?
    }

    #[instrument(skip(self))]
    async fn reschedule_if_free(
        &self,
        id: &str,
        staff_id: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        buffer_minutes: u32,
    ) -> DomainResult<BookingAttempt> {
        let db = Arc::clone(&self.db);
        let id = id.to_owned();
        let staff_id = staff_id.to_owned();

        task::spawn_blocking(move || -> DomainResult<BookingAttempt> {
            let mut conn = db.get_connection()?;
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(to_domain)?;

            let blocked_until = end_time + Duration::minutes(i64::from(buffer_minutes));
            let existing =
                overlapping(&tx, &staff_id, start_time, blocked_until).map_err(to_domain)?;
            let candidate = Candidate {
                staff_id: &staff_id,
                start: start_time,
                blocked_until,
                exclude_id: Some(&id),
            };
            let conflicting_ids = ids(&find_conflicts(&candidate, &existing));
            if !conflicting_ids.is_empty() {
                return Ok(BookingAttempt::Conflict { conflicting_ids });
            }

            let changed = tx
                .execute(
                    APPOINTMENT_RESCHEDULE_SQL,
                    params![
                        id,
                        staff_id,
                        timestamp(start_time),
                        timestamp(end_time),
                        timestamp(blocked_until),
                        buffer_minutes,
                        timestamp(Utc::now()),
                    ],
                )
                .map_err(to_domain)?;
            if changed == 0 {
                return Err(CadenceError::appointment_not_found(&id));
            }
            let moved = fetch_one(&tx, &id)
                .map_err(to_domain)?
                .ok_or_else(|| CadenceError::appointment_not_found(&id))?;
            tx.commit().map_err(to_domain)?;
            Ok(BookingAttempt::Booked(moved))
        })
        .await
        .map_err(to_domain)?
    }

    #[instrument(skip(self))]
    async fn update_status(
        &self,
        id: &str,
        expected: AppointmentStatus,
        status: AppointmentStatus,
    ) -> DomainResult<Appointment> {
        let db = Arc::clone(&self.db);
        let id = id.to_owned();

        task::spawn_blocking(move || -> DomainResult<Appointment> {
            let conn = db.get_connection()?;
            let changed = conn
                .execute(
                    APPOINTMENT_STATUS_SQL,
                    params![id, status.as_str(), timestamp(Utc::now()), expected.as_str()],
                )
                .map_err(to_domain)?;
            let current = fetch_one(&conn, &id)
                .map_err(to_domain)?
                .ok_or_else(|| CadenceError::appointment_not_found(&id))?;
            if changed == 0 {
                warn!(
                    appointment_id = %id,
                    actual = %current.status,
                    %expected,
                    "Status changed since it was read"
                );
                return Err(CadenceError::InvalidTransition { from: current.status, to: status });
            }
            Ok(current)
        })
        .await
        .map_err(to_domain)?
    }

    #[instrument(skip(self, ids), fields(requested = ids.len()))]
    async fn cancel_appointments(&self, ids: &[String]) -> DomainResult<Vec<String>> {
        let db = Arc::clone(&self.db);
        let ids = ids.to_vec();

        task::spawn_blocking(move || -> DomainResult<Vec<String>> {
            let mut conn = db.get_connection()?;
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(to_domain)?;
            let now = timestamp(Utc::now());

            let mut cancelled = Vec::with_capacity(ids.len());
            {
                let mut stmt = tx.prepare(APPOINTMENT_CANCEL_SQL).map_err(to_domain)?;
                for id in &ids {
                    if stmt.execute(params![id, now]).map_err(to_domain)? == 1 {
                        cancelled.push(id.clone());
                    }
                }
            }
            tx.commit().map_err(to_domain)?;

            if cancelled.len() < ids.len() {
                warn!(
                    requested = ids.len(),
                    cancelled = cancelled.len(),
                    "some appointments were already terminal"
                );
            }
            Ok(cancelled)
        })
        .await
        .map_err(to_domain)?
    }

    async fn set_detached(&self, id: &str) -> DomainResult<Appointment> {
        let db = Arc::clone(&self.db);
        let id = id.to_owned();

        task::spawn_blocking(move || -> DomainResult<Appointment> {
            let conn = db.get_connection()?;
            let changed = conn
                .execute(
                    "UPDATE appointments SET is_detached = 1, updated_at = ?2 WHERE id = ?1",
                    params![id, timestamp(Utc::now())],
                )
                .map_err(to_domain)?;
            if changed == 0 {
                return Err(CadenceError::appointment_not_found(&id));
            }
            fetch_one(&conn, &id)
                .map_err(to_domain)?
                .ok_or_else(|| CadenceError::appointment_not_found(&id))
        })
        .await
        .map_err(to_domain)?
    }
}

const APPOINTMENT_COLUMNS: &str = "id, client_id, service_id, staff_id, start_ts, end_ts,
        buffer_minutes, status, price_cents, series_id, is_detached, notes, created_at, updated_at";

const APPOINTMENT_INSERT_SQL: &str = "INSERT INTO appointments (
        id, client_id, service_id, staff_id, start_ts, end_ts, block_end_ts, buffer_minutes,
        status, price_cents, series_id, is_detached, notes, created_at, updated_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)";

const APPOINTMENT_RESCHEDULE_SQL: &str = "UPDATE appointments
    SET staff_id = ?2, start_ts = ?3, end_ts = ?4, block_end_ts = ?5, buffer_minutes = ?6,
        updated_at = ?7
    WHERE id = ?1";

const APPOINTMENT_CANCEL_SQL: &str = "UPDATE appointments
    SET status = 'cancelled', updated_at = ?2
    WHERE id = ?1 AND status NOT IN ('completed', 'cancelled', 'no_show')";

const APPOINTMENT_STATUS_SQL: &str = "UPDATE appointments
    SET status = ?2, updated_at = ?3
    WHERE id = ?1 AND status = ?4";

const APPOINTMENTS_BY_SERIES: &str = "SELECT id, client_id, service_id, staff_id, start_ts, end_ts,
        buffer_minutes, status, price_cents, series_id, is_detached, notes, created_at, updated_at
    FROM appointments
    WHERE series_id = ?1
    ORDER BY start_ts, id";

const APPOINTMENTS_OVERLAPPING: &str = "SELECT id, client_id, service_id, staff_id, start_ts, end_ts,
        buffer_minutes, status, price_cents, series_id, is_detached, notes, created_at, updated_at
    FROM appointments
    WHERE staff_id = ?1 AND start_ts < ?3 AND block_end_ts > ?2
    ORDER BY start_ts, id";

fn overlapping(
    conn: &Connection,
    staff_id: &str,
    range_start: DateTime<Utc>,
    range_end: DateTime<Utc>,
) -> rusqlite::Result<Vec<Appointment>> {
    let start_ts = timestamp(range_start);
    let end_ts = timestamp(range_end);
    let params: [&dyn ToSql; 3] = [&staff_id, &start_ts, &end_ts];
    query_appointments(conn, APPOINTMENTS_OVERLAPPING, &params)
}

fn fetch_one(conn: &Connection, id: &str) -> rusqlite::Result<Option<Appointment>> {
    conn.query_row(
        &format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = ?1"),
        [id],
        map_appointment_row,
    )
    .optional()
}

fn query_appointments(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> rusqlite::Result<Vec<Appointment>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, map_appointment_row)?;
    rows.collect()
}

fn insert_appointment(conn: &Connection, appointment: &Appointment) -> rusqlite::Result<()> {
    conn.execute(
        APPOINTMENT_INSERT_SQL,
        params![
            appointment.id,
            appointment.client_id,
            appointment.service_id,
            appointment.staff_id,
            timestamp(appointment.start_time),
            timestamp(appointment.end_time),
            timestamp(appointment.blocked_until()),
            appointment.buffer_minutes,
            appointment.status.as_str(),
            appointment.price_cents,
            appointment.series_id,
            flag(appointment.is_detached_from_series),
            appointment.notes,
            timestamp(appointment.created_at),
            timestamp(appointment.updated_at),
        ],
    )?;
    Ok(())
}

fn map_appointment_row(row: &Row<'_>) -> rusqlite::Result<Appointment> {
    let status_raw: String = row.get(7)?;
    let status = status_raw
        .parse::<AppointmentStatus>()
        .map_err(|err| conversion_error(7, Type::Text, err.to_string()))?;

    Ok(Appointment {
        id: row.get(0)?,
        client_id: row.get(1)?,
        service_id: row.get(2)?,
        staff_id: row.get(3)?,
        start_time: instant(4, row.get(4)?)?,
        end_time: instant(5, row.get(5)?)?,
        buffer_minutes: minutes(6, row.get(6)?)?,
        status,
        price_cents: row.get(8)?,
        series_id: row.get(9)?,
        is_detached_from_series: row.get::<_, i64>(10)? != 0,
        notes: row.get(11)?,
        created_at: instant(12, row.get(12)?)?,
        updated_at: instant(13, row.get(13)?)?,
    })
}

fn ids(appointments: &[&Appointment]) -> Vec<String> {
    appointments.iter().map(|a| a.id.clone()).collect()
}

/// Insert an appointment without any overlap check.
///
/// Used to import existing calendars and to arrange fixtures; never called
/// by the engine itself.
pub fn import_appointment(db: &DbManager, appointment: &Appointment) -> DomainResult<()> {
    let conn = db.get_connection()?;
    insert_appointment(&conn, appointment).map_err(to_domain)
}
