//! Service wiring and sample data

use std::sync::Arc;

use cadence_core::{AppointmentService, SeriesLifecycleService};
use cadence_domain::{
    new_id, Appointment, AppointmentStatus, BusinessSettings, CreateSeriesRequest, EndCondition,
    RecurrencePattern, RecurrenceRule,
};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;

use super::repositories::{
    MockAuditSink, MockBookingStore, MockClock, MockReferenceDirectory, MockSeriesRepository,
    MockSettings,
};

pub const CLIENT: &str = "client-1";
pub const OTHER_CLIENT: &str = "client-2";
pub const SERVICE: &str = "svc-cut";
pub const STAFF: &str = "staff-ana";
pub const OTHER_STAFF: &str = "staff-ben";
pub const ACTOR: &str = "front-desk";

pub struct Harness {
    pub series_repo: MockSeriesRepository,
    pub bookings: MockBookingStore,
    pub references: MockReferenceDirectory,
    pub audit: MockAuditSink,
    pub clock: MockClock,
    pub lifecycle: SeriesLifecycleService,
    pub appointments: AppointmentService,
}

impl Harness {
    /// UTC business calendar, 09:00-18:00, clock at Sunday 2026-03-01 08:00.
    pub fn new() -> Self {
        Self::with_audit(MockAuditSink::default())
    }

    pub fn with_audit(audit: MockAuditSink) -> Self {
        let series_repo = MockSeriesRepository::default();
        let bookings = MockBookingStore::default();
        let references = MockReferenceDirectory::default()
            .with_client(CLIENT, true)
            .with_client(OTHER_CLIENT, true)
            .with_client("client-gone", false)
            .with_service(SERVICE, 30, Some(4_500))
            .with_staff(STAFF, true)
            .with_staff(OTHER_STAFF, true)
            .with_staff("staff-left", false);
        let clock = MockClock::at(at(2026, 3, 1, 8, 0));
        let settings = Arc::new(MockSettings(business_hours()));

        let lifecycle = SeriesLifecycleService::new(
            Arc::new(series_repo.clone()),
            Arc::new(bookings.clone()),
            Arc::new(references.clone()),
            settings,
            Arc::new(audit.clone()),
            Arc::new(clock.clone()),
        );
        let appointments = AppointmentService::new(
            Arc::new(bookings.clone()),
            Arc::new(references.clone()),
            Arc::new(clock.clone()),
        );

        Self { series_repo, bookings, references, audit, clock, lifecycle, appointments }
    }

    /// Put a foreign booking on `STAFF`'s calendar.
    pub fn occupy(&self, start: DateTime<Utc>, minutes: i64) -> Appointment {
        let appointment = Appointment {
            id: new_id(),
            client_id: OTHER_CLIENT.into(),
            service_id: SERVICE.into(),
            staff_id: STAFF.into(),
            start_time: start,
            end_time: start + Duration::minutes(minutes),
            buffer_minutes: 0,
            status: AppointmentStatus::Scheduled,
            price_cents: None,
            series_id: None,
            is_detached_from_series: false,
            notes: None,
            created_at: start,
            updated_at: start,
        };
        self.bookings.seed(appointment.clone());
        appointment
    }
}

pub fn business_hours() -> BusinessSettings {
    BusinessSettings::new(
        Tz::UTC,
        NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
    )
    .unwrap()
}

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

/// Weekly on Mondays at 10:00 from 2026-03-02.
pub fn weekly_monday(end: EndCondition) -> CreateSeriesRequest {
    CreateSeriesRequest {
        client_id: CLIENT.into(),
        service_id: SERVICE.into(),
        staff_id: STAFF.into(),
        rule: RecurrenceRule {
            pattern: RecurrencePattern::Weekly { day_of_week: Some(Weekday::Mon) },
            time_of_day: time(10, 0),
            end,
        },
        start_date: Some(date(2026, 3, 2)),
        locked_price_cents: None,
        buffer_minutes: 0,
        notes: None,
        exception_dates: Vec::new(),
        resolutions: Vec::new(),
    }
}
