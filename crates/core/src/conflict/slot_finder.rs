//! Alternative slot search around a preferred time

use cadence_domain::{AlternativeSlot, Appointment, BusinessSettings, SchedulingConfig};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

use super::detector::{has_conflict, Candidate};
use crate::recurrence::localize;

/// What to look for: a slot of a given length for one staff member on one day.
#[derive(Debug, Clone, Copy)]
pub struct SlotRequest<'a> {
    pub staff_id: &'a str,
    pub date: NaiveDate,
    pub preferred: NaiveTime,
    pub duration_minutes: u32,
    pub buffer_minutes: u32,
    pub exclude_id: Option<&'a str>,
}

/// Probes a fixed offset ladder and returns the first free slots.
#[derive(Debug, Clone)]
pub struct SlotFinder {
    offsets_minutes: Vec<i64>,
    max_alternatives: usize,
}

impl SlotFinder {
    pub fn new(offsets_minutes: Vec<i64>, max_alternatives: usize) -> Self {
        Self { offsets_minutes, max_alternatives }
    }

    pub fn from_config(config: &SchedulingConfig) -> Self {
        Self::new(config.alternative_offsets_minutes.clone(), config.max_alternatives)
    }

    /// Validated alternatives, in ladder order.
    ///
    /// `bookings` must cover the staff member's bookings for the day. A slot
    /// is dropped when it leaves opening hours, falls in a DST gap, starts
    /// before `now`, or collides with a booking.
    pub fn find_alternatives(
        &self,
        request: &SlotRequest<'_>,
        settings: &BusinessSettings,
        bookings: &[Appointment],
        now: DateTime<Utc>,
    ) -> Vec<AlternativeSlot> {
        let preferred = request.date.and_time(request.preferred);
        let duration = Duration::minutes(i64::from(request.duration_minutes));
        let buffer = Duration::minutes(i64::from(request.buffer_minutes));

        let mut found = Vec::new();
        for &offset in &self.offsets_minutes {
            if found.len() >= self.max_alternatives {
                break;
            }
            let local_start = preferred + Duration::minutes(offset);
            let local_end = local_start + duration;
            if !settings.contains(request.date, local_start, local_end) {
                continue;
            }
            let Some(start_time) = localize(settings.timezone, local_start) else {
                continue;
            };
            if start_time < now {
                continue;
            }
            let end_time = start_time + duration;
            let candidate = Candidate {
                staff_id: request.staff_id,
                start: start_time,
                blocked_until: end_time + buffer,
                exclude_id: request.exclude_id,
            };
            if has_conflict(&candidate, bookings) {
                continue;
            }
            found.push(AlternativeSlot { local_start, start_time, end_time, offset_minutes: offset });
        }
        found
    }
}

impl Default for SlotFinder {
    fn default() -> Self {
        Self::from_config(&SchedulingConfig::default())
    }
}
