//! Single-appointment operations
//!
//! Unlike series batches, a conflict here has no fallback and is returned
//! as [`CadenceError::Conflict`].

use std::sync::Arc;

use cadence_domain::{
    Appointment, AppointmentStatus, BookAppointmentRequest, BookingAttempt, CadenceError,
    NewBooking, Result,
};
use chrono::{DateTime, Duration, Utc};
use tracing::{info, instrument, warn};

use super::ports::BookingStore;
use super::status::validate_transition;
use crate::reference_ports::{Clock, ReferenceDirectory};
use crate::references;

/// Direct booking, status changes and rescheduling
pub struct AppointmentService {
    bookings: Arc<dyn BookingStore>,
    references: Arc<dyn ReferenceDirectory>,
    clock: Arc<dyn Clock>,
}

impl AppointmentService {
    pub fn new(
        bookings: Arc<dyn BookingStore>,
        references: Arc<dyn ReferenceDirectory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { bookings, references, clock }
    }

    /// Book one slot outside any series.
    #[instrument(skip(self, request), fields(staff_id = %request.staff_id))]
    pub async fn book_appointment(&self, request: BookAppointmentRequest) -> Result<Appointment> {
        let refs = references::resolve(
            self.references.as_ref(),
            &request.client_id,
            &request.service_id,
            &request.staff_id,
            true,
        )
        .await?;

        if request.start_time < self.clock.now() {
            return Err(CadenceError::Validation("cannot book a slot in the past".into()));
        }

        let end_time =
            request.start_time + Duration::minutes(i64::from(refs.service.duration_minutes));
        let booking = NewBooking {
            client_id: request.client_id,
            service_id: request.service_id,
            staff_id: request.staff_id,
            start_time: request.start_time,
            end_time,
            buffer_minutes: request.buffer_minutes,
            price_cents: request.price_cents.or(refs.service.price_cents),
            series_id: None,
            notes: request.notes,
        };

        match self.bookings.create_if_free(booking).await? {
            BookingAttempt::Booked(appointment) => {
                info!(appointment_id = %appointment.id, "Appointment booked");
                Ok(appointment)
            }
            BookingAttempt::Conflict { conflicting_ids } => {
                warn!(?conflicting_ids, "Requested slot is taken");
                Err(conflict_error(&conflicting_ids))
            }
        }
    }

    /// Apply a status change if the state machine allows it. The write only
    /// lands if nobody changed the status in between.
    #[instrument(skip(self))]
    pub async fn change_status(&self, id: &str, status: AppointmentStatus) -> Result<Appointment> {
        let current = self.load(id).await?;
        validate_transition(current.status, status)?;
        let updated = self.bookings.update_status(id, current.status, status).await?;
        info!(from = %current.status, to = %status, "Appointment status changed");
        Ok(updated)
    }

    /// Move an appointment, keeping its length, staff member and buffer.
    #[instrument(skip(self))]
    pub async fn reschedule_appointment(
        &self,
        id: &str,
        start_time: DateTime<Utc>,
    ) -> Result<Appointment> {
        let current = self.load(id).await?;
        if current.status.is_terminal() {
            return Err(CadenceError::InvalidState(format!(
                "appointment {id} is {} and cannot be rescheduled",
                current.status
            )));
        }
        if start_time < self.clock.now() {
            return Err(CadenceError::Validation("cannot reschedule into the past".into()));
        }

        let end_time = start_time + (current.end_time - current.start_time);
        match self
            .bookings
            .reschedule_if_free(id, &current.staff_id, start_time, end_time, current.buffer_minutes)
            .await?
        {
            BookingAttempt::Booked(appointment) => Ok(appointment),
            BookingAttempt::Conflict { conflicting_ids } => Err(conflict_error(&conflicting_ids)),
        }
    }

    pub async fn get_appointment(&self, id: &str) -> Result<Appointment> {
        self.load(id).await
    }

    async fn load(&self, id: &str) -> Result<Appointment> {
        self.bookings
            .get_appointment(id)
            .await?
            .ok_or_else(|| CadenceError::appointment_not_found(id))
    }
}

fn conflict_error(conflicting_ids: &[String]) -> CadenceError {
    CadenceError::Conflict(format!("slot overlaps {}", conflicting_ids.join(", ")))
}
