//! Appointment status state machine
//!
//! ```text
//! scheduled   -> confirmed | in_progress | cancelled | no_show
//! confirmed   -> in_progress | cancelled | no_show
//! in_progress -> completed | cancelled
//! ```
//!
//! `completed`, `cancelled` and `no_show` have no outgoing transitions.

use cadence_domain::{AppointmentStatus, CadenceError, Result};

/// Statuses reachable from `from` in one step.
pub const fn allowed_transitions(from: AppointmentStatus) -> &'static [AppointmentStatus] {
    use AppointmentStatus::{Cancelled, Completed, Confirmed, InProgress, NoShow, Scheduled};
    match from {
        Scheduled => &[Confirmed, InProgress, Cancelled, NoShow],
        Confirmed => &[InProgress, Cancelled, NoShow],
        InProgress => &[Completed, Cancelled],
        Completed | Cancelled | NoShow => &[],
    }
}

pub fn can_transition(from: AppointmentStatus, to: AppointmentStatus) -> bool {
    allowed_transitions(from).contains(&to)
}

/// Fail with [`CadenceError::InvalidTransition`] unless `from -> to` is legal.
pub fn validate_transition(from: AppointmentStatus, to: AppointmentStatus) -> Result<()> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(CadenceError::InvalidTransition { from, to })
    }
}
