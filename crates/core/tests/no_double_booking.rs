//! Property tests for overlap detection and recurrence generation

mod support;

use std::collections::BTreeSet;

use cadence_core::conflict::intervals_overlap;
use cadence_core::{generate, BookingStore, GenerationWindow};
use cadence_domain::{BookingAttempt, EndCondition, NewBooking, RecurrencePattern, RecurrenceRule};
use chrono::{Duration, NaiveDate, NaiveTime, Weekday};
use proptest::prelude::*;
use support::fixtures::{at, CLIENT, SERVICE};
use support::repositories::MockBookingStore;

fn weekday_strategy() -> impl Strategy<Value = Weekday> + Clone {
    (0u8..7).prop_map(|idx| cadence_domain::weekday_from_index(idx).unwrap())
}

fn pattern_strategy() -> impl Strategy<Value = RecurrencePattern> {
    let optional_day = prop::option::of(weekday_strategy());
    prop_oneof![
        Just(RecurrencePattern::Daily),
        optional_day.clone().prop_map(|day_of_week| RecurrencePattern::Weekly { day_of_week }),
        optional_day.clone().prop_map(|day_of_week| RecurrencePattern::Biweekly { day_of_week }),
        optional_day.clone().prop_map(|day_of_week| RecurrencePattern::Monthly { day_of_week }),
        (1u32..5, optional_day)
            .prop_map(|(every_weeks, day_of_week)| RecurrencePattern::Custom { every_weeks, day_of_week }),
        prop::collection::vec(weekday_strategy(), 1..4)
            .prop_map(|days| RecurrencePattern::SpecificDays { days }),
    ]
}

/// Minute-by-minute reference: do the two blocks share any whole minute?
fn sampled_overlap(a: (i64, i64), b: (i64, i64)) -> bool {
    (a.0..a.1).any(|minute| minute >= b.0 && minute < b.1)
}

proptest! {
    #[test]
    fn overlap_matches_minute_sampling(
        a_start in 0i64..240, a_len in 0i64..90,
        b_start in 0i64..240, b_len in 0i64..90,
    ) {
        let base = at(2026, 3, 2, 9, 0);
        let minute = |m: i64| base + Duration::minutes(m);
        let fast = intervals_overlap(
            minute(a_start), minute(a_start + a_len),
            minute(b_start), minute(b_start + b_len),
        );
        let slow = sampled_overlap((a_start, a_start + a_len), (b_start, b_start + b_len));
        prop_assert_eq!(fast, slow);
    }

    #[test]
    fn accepted_bookings_never_overlap(
        requests in prop::collection::vec((0i64..480, 5i64..120, 0u32..30), 1..40),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let store = MockBookingStore::default();
        let base = at(2026, 3, 2, 8, 0);

        runtime.block_on(async {
            for (offset, length, buffer) in &requests {
                let start_time = base + Duration::minutes(*offset);
                let booking = NewBooking {
                    client_id: CLIENT.into(),
                    service_id: SERVICE.into(),
                    staff_id: "staff-prop".into(),
                    start_time,
                    end_time: start_time + Duration::minutes(*length),
                    buffer_minutes: *buffer,
                    price_cents: None,
                    series_id: None,
                    notes: None,
                };
                let _: BookingAttempt = store.create_if_free(booking).await.unwrap();
            }
        });

        let booked = store.all();
        prop_assert!(!booked.is_empty());
        for (i, a) in booked.iter().enumerate() {
            for b in &booked[i + 1..] {
                prop_assert!(
                    !intervals_overlap(a.start_time, a.blocked_until(), b.start_time, b.blocked_until()),
                    "{} and {} overlap", a.id, b.id
                );
            }
        }
    }

    #[test]
    fn generated_dates_are_ordered_bounded_and_skip_exceptions(
        pattern in pattern_strategy(),
        count in 1u32..30,
        start_offset in 0u64..60,
        exception_offsets in prop::collection::btree_set(0u64..120, 0..10),
    ) {
        let start = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap() + chrono::Days::new(start_offset);
        let exceptions: BTreeSet<NaiveDate> =
            exception_offsets.iter().map(|d| start + chrono::Days::new(*d)).collect();
        let rule = RecurrenceRule {
            pattern: pattern.pinned_to(start),
            time_of_day: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            end: EndCondition::AfterCount { count },
        };
        let window = GenerationWindow {
            anchor: start,
            not_before: start.and_time(NaiveTime::MIN),
            horizon_end: start + chrono::Days::new(730),
            max_occurrences: 366,
        };

        let dates = generate(&rule, &window, &exceptions).unwrap();

        prop_assert!(dates.len() <= count as usize);
        prop_assert!(dates.windows(2).all(|pair| pair[0].date() < pair[1].date()));
        prop_assert!(dates.iter().all(|d| d.date() >= start));
        prop_assert!(dates.iter().all(|d| !exceptions.contains(&d.date())));
        prop_assert_eq!(generate(&rule, &window, &exceptions).unwrap(), dates);
    }
}
