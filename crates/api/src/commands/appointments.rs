//! Single appointment commands

use cadence_domain::{Appointment, AppointmentStatus, BookAppointmentRequest, Result};
use chrono::{DateTime, Utc};

use crate::context::AppContext;
use crate::utils::command_helpers::execute_with_logging;

/// Book one slot outside any series; an overlap is a `Conflict` error.
pub async fn book_appointment(
    ctx: &AppContext,
    request: BookAppointmentRequest,
) -> Result<Appointment> {
    execute_with_logging("appointments::book", || ctx.appointments.book_appointment(request)).await
}

pub async fn change_status(
    ctx: &AppContext,
    appointment_id: &str,
    status: AppointmentStatus,
) -> Result<Appointment> {
    execute_with_logging("appointments::change_status", || {
        ctx.appointments.change_status(appointment_id, status)
    })
    .await
}

pub async fn reschedule_appointment(
    ctx: &AppContext,
    appointment_id: &str,
    start_time: DateTime<Utc>,
) -> Result<Appointment> {
    execute_with_logging("appointments::reschedule", || {
        ctx.appointments.reschedule_appointment(appointment_id, start_time)
    })
    .await
}

pub async fn get_appointment(ctx: &AppContext, appointment_id: &str) -> Result<Appointment> {
    execute_with_logging("appointments::get", || ctx.appointments.get_appointment(appointment_id))
        .await
}
