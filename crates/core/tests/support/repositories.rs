//! Mock port implementations for testing
//!
//! In-memory stand-ins for every core port, guarded by `parking_lot`
//! mutexes so tests stay deterministic without a database.

use std::sync::Arc;

use async_trait::async_trait;
use cadence_core::conflict::{find_conflicts, Candidate};
use cadence_core::{AuditSink, BookingStore, Clock, ReferenceDirectory, SeriesRepository, SettingsProvider};
use cadence_domain::{
    new_id, Appointment, AppointmentStatus, AuditEvent, BookingAttempt, BusinessSettings,
    CadenceError, ClientRef, ExceptionDate, NewBooking, RecurringSeries, Result as DomainResult,
    ServiceRef, StaffRef,
};
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::Mutex;

/// In-memory mock for `SeriesRepository`.
#[derive(Default, Clone)]
pub struct MockSeriesRepository {
    series: Arc<Mutex<Vec<RecurringSeries>>>,
    exceptions: Arc<Mutex<Vec<ExceptionDate>>>,
}

#[async_trait]
impl SeriesRepository for MockSeriesRepository {
    async fn insert_series(
        &self,
        series: &RecurringSeries,
        exceptions: &[ExceptionDate],
    ) -> DomainResult<()> {
        self.series.lock().push(series.clone());
        self.exceptions.lock().extend_from_slice(exceptions);
        Ok(())
    }

    async fn get_series(&self, id: &str) -> DomainResult<Option<RecurringSeries>> {
        Ok(self.series.lock().iter().find(|s| s.id == id).cloned())
    }

    async fn update_series(&self, series: &RecurringSeries) -> DomainResult<()> {
        let mut rows = self.series.lock();
        let row = rows
            .iter_mut()
            .find(|s| s.id == series.id)
            .ok_or_else(|| CadenceError::series_not_found(&series.id))?;
        *row = series.clone();
        Ok(())
    }

    async fn list_exceptions(&self, series_id: &str) -> DomainResult<Vec<ExceptionDate>> {
        let mut rows: Vec<_> =
            self.exceptions.lock().iter().filter(|e| e.series_id == series_id).cloned().collect();
        rows.sort_by_key(|e| e.date);
        Ok(rows)
    }

    async fn insert_exception(&self, exception: &ExceptionDate) -> DomainResult<bool> {
        let mut rows = self.exceptions.lock();
        if rows.iter().any(|e| e.series_id == exception.series_id && e.date == exception.date) {
            return Ok(false);
        }
        rows.push(exception.clone());
        Ok(true)
    }

    async fn delete_exception(
        &self,
        series_id: &str,
        date: NaiveDate,
    ) -> DomainResult<Option<ExceptionDate>> {
        let mut rows = self.exceptions.lock();
        let position = rows.iter().position(|e| e.series_id == series_id && e.date == date);
        Ok(position.map(|idx| rows.remove(idx)))
    }
}

/// In-memory mock for `BookingStore`.
///
/// The check and the write happen under one lock, which is the same
/// guarantee the SQLite store gives with `BEGIN IMMEDIATE`.
#[derive(Default, Clone)]
pub struct MockBookingStore {
    appointments: Arc<Mutex<Vec<Appointment>>>,
    /// Remaining successful `create_if_free` calls before storage errors.
    create_budget: Arc<Mutex<Option<usize>>>,
    /// Status committed by "someone else" right before the next status write.
    interleaved_status: Arc<Mutex<Option<AppointmentStatus>>>,
}

impl MockBookingStore {
    /// Place an appointment directly, bypassing conflict checks.
    pub fn seed(&self, appointment: Appointment) {
        self.appointments.lock().push(appointment);
    }

    pub fn all(&self) -> Vec<Appointment> {
        let mut rows = self.appointments.lock().clone();
        rows.sort_by_key(|a| a.start_time);
        rows
    }

    pub fn find(&self, id: &str) -> Option<Appointment> {
        self.appointments.lock().iter().find(|a| a.id == id).cloned()
    }

    pub fn force_status(&self, id: &str, status: AppointmentStatus) {
        if let Some(row) = self.appointments.lock().iter_mut().find(|a| a.id == id) {
            row.status = status;
        }
    }

    /// Let `n` more inserts through, then fail every later one.
    pub fn fail_creates_after(&self, n: usize) {
        *self.create_budget.lock() = Some(n);
    }

    pub fn restore_creates(&self) {
        *self.create_budget.lock() = None;
    }

    /// Simulate a concurrent writer landing between a status read and write.
    pub fn interleave_status_write(&self, status: AppointmentStatus) {
        *self.interleaved_status.lock() = Some(status);
    }
}

#[async_trait]
impl BookingStore for MockBookingStore {
    async fn find_bookings(
        &self,
        staff_id: &str,
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
    ) -> DomainResult<Vec<Appointment>> {
        let mut rows: Vec<_> = self
            .appointments
            .lock()
            .iter()
            .filter(|a| {
                a.staff_id == staff_id && a.start_time < range_end && a.blocked_until() > range_start
            })
            .cloned()
            .collect();
        rows.sort_by_key(|a| a.start_time);
        Ok(rows)
    }

    async fn get_appointment(&self, id: &str) -> DomainResult<Option<Appointment>> {
        Ok(self.find(id))
    }

    async fn series_appointments(&self, series_id: &str) -> DomainResult<Vec<Appointment>> {
        Ok(self.all().into_iter().filter(|a| a.series_id.as_deref() == Some(series_id)).collect())
    }

    async fn create_if_free(&self, booking: NewBooking) -> DomainResult<BookingAttempt> {
        if let Some(budget) = self.create_budget.lock().as_mut() {
            if *budget == 0 {
                return Err(CadenceError::Database("disk I/O error".into()));
            }
            *budget -= 1;
        }
        let mut rows = self.appointments.lock();
        let candidate = Candidate {
            staff_id: &booking.staff_id,
            start: booking.start_time,
            blocked_until: booking.blocked_until(),
            exclude_id: None,
        };
        let conflicting_ids: Vec<String> =
            find_conflicts(&candidate, &rows).iter().map(|a| a.id.clone()).collect();
        if !conflicting_ids.is_empty() {
            return Ok(BookingAttempt::Conflict { conflicting_ids });
        }

        let now = Utc::now();
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
        rows.push(appointment.clone());
        Ok(BookingAttempt::Booked(appointment))
    }

    async fn reschedule_if_free(
        &self,
        id: &str,
        staff_id: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        buffer_minutes: u32,
    ) -> DomainResult<BookingAttempt> {
        let mut rows = self.appointments.lock();
        let candidate = Candidate {
            staff_id,
            start: start_time,
            blocked_until: end_time + chrono::Duration::minutes(i64::from(buffer_minutes)),
            exclude_id: Some(id),
        };
        let conflicting_ids: Vec<String> =
            find_conflicts(&candidate, &rows).iter().map(|a| a.id.clone()).collect();
        if !conflicting_ids.is_empty() {
            return Ok(BookingAttempt::Conflict { conflicting_ids });
        }

        let row = rows
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| CadenceError::appointment_not_found(id))?;
        row.staff_id = staff_id.to_string();
        row.start_time = start_time;
        row.end_time = end_time;
        row.buffer_minutes = buffer_minutes;
        row.updated_at = Utc::now();
        Ok(BookingAttempt::Booked(row.clone()))
    }

    async fn update_status(
        &self,
        id: &str,
        expected: AppointmentStatus,
        status: AppointmentStatus,
    ) -> DomainResult<Appointment> {
        let mut rows = self.appointments.lock();
        let row = rows
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| CadenceError::appointment_not_found(id))?;
        if let Some(concurrent) = self.interleaved_status.lock().take() {
            row.status = concurrent;
        }
        if row.status != expected {
            return Err(CadenceError::InvalidTransition { from: row.status, to: status });
        }
        row.status = status;
        Ok(row.clone())
    }

    async fn cancel_appointments(&self, ids: &[String]) -> DomainResult<Vec<String>> {
        let mut cancelled = Vec::new();
        for row in self.appointments.lock().iter_mut() {
            if ids.contains(&row.id) && !row.status.is_terminal() {
                row.status = AppointmentStatus::Cancelled;
                cancelled.push(row.id.clone());
            }
        }
        Ok(cancelled)
    }

    async fn set_detached(&self, id: &str) -> DomainResult<Appointment> {
        let mut rows = self.appointments.lock();
        let row = rows
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| CadenceError::appointment_not_found(id))?;
        row.is_detached_from_series = true;
        Ok(row.clone())
    }
}

/// In-memory mock for `ReferenceDirectory`.
#[derive(Default, Clone)]
pub struct MockReferenceDirectory {
    clients: Arc<Mutex<Vec<ClientRef>>>,
    services: Arc<Mutex<Vec<ServiceRef>>>,
    staff: Arc<Mutex<Vec<StaffRef>>>,
}

impl MockReferenceDirectory {
    pub fn with_client(self, id: &str, is_active: bool) -> Self {
        self.clients.lock().push(ClientRef { id: id.into(), name: id.into(), is_active });
        self
    }

    pub fn with_service(self, id: &str, duration_minutes: u32, price_cents: Option<i64>) -> Self {
        self.services.lock().push(ServiceRef {
            id: id.into(),
            name: id.into(),
            duration_minutes,
            price_cents,
            is_active: true,
        });
        self
    }

    pub fn with_staff(self, id: &str, is_active: bool) -> Self {
        self.staff.lock().push(StaffRef { id: id.into(), name: id.into(), is_active });
        self
    }
}

#[async_trait]
impl ReferenceDirectory for MockReferenceDirectory {
    async fn client(&self, id: &str) -> DomainResult<Option<ClientRef>> {
        Ok(self.clients.lock().iter().find(|c| c.id == id).cloned())
    }

    async fn service(&self, id: &str) -> DomainResult<Option<ServiceRef>> {
        Ok(self.services.lock().iter().find(|s| s.id == id).cloned())
    }

    async fn staff(&self, id: &str) -> DomainResult<Option<StaffRef>> {
        Ok(self.staff.lock().iter().find(|s| s.id == id).cloned())
    }
}

/// Fixed business settings.
pub struct MockSettings(pub BusinessSettings);

impl SettingsProvider for MockSettings {
    fn business_settings(&self) -> DomainResult<BusinessSettings> {
        Ok(self.0)
    }
}

/// Clock that only moves when told to.
#[derive(Clone)]
pub struct MockClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl MockClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now: Arc::new(Mutex::new(now)) }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock() = now;
    }
}

impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Recording audit sink; can be switched to fail every write.
#[derive(Default, Clone)]
pub struct MockAuditSink {
    events: Arc<Mutex<Vec<AuditEvent>>>,
    failing: Arc<Mutex<bool>>,
}

impl MockAuditSink {
    pub fn failing() -> Self {
        let sink = Self::default();
        *sink.failing.lock() = true;
        sink
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().clone()
    }
}

#[async_trait]
impl AuditSink for MockAuditSink {
    async fn record(&self, event: AuditEvent) -> DomainResult<()> {
        if *self.failing.lock() {
            return Err(CadenceError::Database("audit log unavailable".into()));
        }
        self.events.lock().push(event);
        Ok(())
    }

    async fn history(&self, series_id: &str) -> DomainResult<Vec<AuditEvent>> {
        Ok(self.events.lock().iter().filter(|e| e.series_id == series_id).cloned().collect())
    }
}
