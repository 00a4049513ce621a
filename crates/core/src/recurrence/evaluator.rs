//! Recurrence evaluator
//!
//! Turns a [`RecurrenceRule`] into an ordered list of local wall-clock start
//! times. Pure: "now" and every bound arrive through [`GenerationWindow`].

use std::collections::BTreeSet;

use cadence_domain::constants::MAX_EVALUATION_STEPS;
use cadence_domain::{EndCondition, NthWeek, RecurrencePattern, RecurrenceRule, Result};
use chrono::{Datelike, Days, Months, NaiveDate, NaiveDateTime, Weekday};

/// Bounds for one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationWindow {
    /// Phase origin of the pattern; nothing before it is produced.
    pub anchor: NaiveDate,
    /// Candidates starting before this instant are passed over and do not
    /// count toward the end condition.
    pub not_before: NaiveDateTime,
    /// Last calendar day that may be produced (inclusive).
    pub horizon_end: NaiveDate,
    /// Hard cap on produced dates.
    pub max_occurrences: usize,
}

/// Produce the candidate start times for `rule` inside `window`.
///
/// `AfterCount` limits this call only; callers that resume a series pass a
/// rule carrying the remaining budget. Exception dates are removed before
/// counting.
pub fn generate(
    rule: &RecurrenceRule,
    window: &GenerationWindow,
    exceptions: &BTreeSet<NaiveDate>,
) -> Result<Vec<NaiveDateTime>> {
    rule.pattern.validate()?;

    let mut limit = window.max_occurrences;
    let mut last_day = window.horizon_end;
    match rule.end {
        EndCondition::Never => {}
        EndCondition::AfterCount { count } => {
            limit = limit.min(usize::try_from(count).unwrap_or(usize::MAX));
        }
        EndCondition::ByDate { date } => last_day = last_day.min(date),
    }

    let mut out = Vec::new();
    if limit == 0 || last_day < window.anchor {
        return Ok(out);
    }

    for date in candidate_days(&rule.pattern, window.anchor).take(MAX_EVALUATION_STEPS) {
        if date > last_day {
            break;
        }
        if exceptions.contains(&date) {
            continue;
        }
        let start = date.and_time(rule.time_of_day);
        if start < window.not_before {
            continue;
        }
        out.push(start);
        if out.len() >= limit {
            break;
        }
    }
    Ok(out)
}

/// Ascending, unbounded stream of days matching `pattern` from `anchor` on.
fn candidate_days(
    pattern: &RecurrencePattern,
    anchor: NaiveDate,
) -> Box<dyn Iterator<Item = NaiveDate> + '_> {
    match pattern {
        RecurrencePattern::Daily => stepping(anchor, 1),
        RecurrencePattern::Weekly { day_of_week } => {
            stepping(align(anchor, day_of_week.unwrap_or_else(|| anchor.weekday())), 7)
        }
        RecurrencePattern::Biweekly { day_of_week } => {
            stepping(align(anchor, day_of_week.unwrap_or_else(|| anchor.weekday())), 14)
        }
        RecurrencePattern::Custom { every_weeks, day_of_week } => stepping(
            align(anchor, day_of_week.unwrap_or_else(|| anchor.weekday())),
            u64::from(*every_weeks) * 7,
        ),
        RecurrencePattern::Monthly { day_of_week } => {
            let first = align(anchor, day_of_week.unwrap_or_else(|| anchor.weekday()));
            // Offsets from the first date rather than chained additions, so a
            // 31st clamped to the 30th does not stay clamped afterwards.
            Box::new((0u32..).map_while(move |k| first.checked_add_months(Months::new(k))))
        }
        RecurrencePattern::SpecificDays { days } => {
            Box::new(stepping(anchor, 1).filter(move |d| days.contains(&d.weekday())))
        }
        RecurrencePattern::NthWeekday { week, day_of_week } => {
            let (week, day) = (*week, *day_of_week);
            let month_start = anchor.with_day(1).unwrap_or(anchor);
            Box::new(
                (0u32..)
                    .map_while(move |k| month_start.checked_add_months(Months::new(k)))
                    .take(MAX_EVALUATION_STEPS)
                    .filter_map(move |month| nth_weekday_of_month(month, week, day))
                    .filter(move |d| *d >= anchor),
            )
        }
    }
}

fn stepping(first: NaiveDate, step_days: u64) -> Box<dyn Iterator<Item = NaiveDate>> {
    Box::new(std::iter::successors(Some(first), move |d| d.checked_add_days(Days::new(step_days))))
}

/// First date on or after `from` falling on `day`.
fn align(from: NaiveDate, day: Weekday) -> NaiveDate {
    let ahead = (7 + day.num_days_from_monday() - from.weekday().num_days_from_monday()) % 7;
    from.checked_add_days(Days::new(u64::from(ahead))).unwrap_or(from)
}

/// Resolve the `week`-th `day` in the month containing `month`.
pub fn nth_weekday_of_month(month: NaiveDate, week: NthWeek, day: Weekday) -> Option<NaiveDate> {
    match week {
        NthWeek::Ordinal(n) => NaiveDate::from_weekday_of_month_opt(month.year(), month.month(), day, n),
        NthWeek::Last => {
            let first = month.with_day(1)?;
            let last = first.checked_add_months(Months::new(1))?.pred_opt()?;
            let back = (7 + last.weekday().num_days_from_monday() - day.num_days_from_monday()) % 7;
            last.checked_sub_days(Days::new(u64::from(back)))
        }
    }
}
