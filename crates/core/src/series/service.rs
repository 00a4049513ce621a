//! Series lifecycle service - core business logic
//!
//! Orchestrates the evaluator, the conflict detector and the slot finder
//! against the storage ports. Series-row changes are all-or-nothing; instance
//! batches succeed partially and report every date they could not book.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use cadence_domain::{
    new_id, AlternativeSlot, AlternativesRequest, Appointment, AppointmentStatus, AuditEvent,
    BookingAttempt, BusinessSettings, CadenceError, CancellationOutcome, CloneOverrides,
    ConflictPreview, ConflictingDate, CreateSeriesRequest, DateResolution, EndCondition,
    ExceptionDate, ExceptionOutcome, ExtensionOutcome, FutureUpdateOutcome, NewBooking,
    PlannedOccurrence, RecurrenceRule, RecurringSeries, Result, SchedulingConfig,
    SeriesAuditAction, SeriesCreationOutcome, SeriesDetails, SeriesPause, SeriesUpdate,
    ServiceRef, SkipReason, SkippedDate, SkippedInstance,
};
use chrono::{DateTime, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde_json::{json, Map, Value};
use tracing::{debug, error, info, instrument, warn};

use super::ports::{AuditSink, SeriesRepository};
use crate::appointments::ports::BookingStore;
use crate::appointments::status::can_transition;
use crate::conflict::{find_conflicts, Candidate, SlotFinder, SlotRequest};
use crate::recurrence::{generate, localize, GenerationWindow};
use crate::reference_ports::{Clock, ReferenceDirectory, SettingsProvider};
use crate::references;

/// "Now" as seen by one operation, in UTC and in business-local time.
struct Timeline {
    settings: BusinessSettings,
    now: DateTime<Utc>,
    now_local: NaiveDateTime,
    today: NaiveDate,
}

impl Timeline {
    fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.settings.timezone).date_naive()
    }
}

#[derive(Default)]
struct Materialized {
    created: Vec<Appointment>,
    skipped: Vec<SkippedDate>,
    /// Storage failure that stopped the batch; `created` holds what was
    /// committed before it.
    interrupted: Option<CadenceError>,
}

impl Materialized {
    fn interruption(&self) -> Option<String> {
        self.interrupted.as_ref().map(ToString::to_string)
    }
}

/// Recurring series lifecycle manager
pub struct SeriesLifecycleService {
    series: Arc<dyn SeriesRepository>,
    bookings: Arc<dyn BookingStore>,
    references: Arc<dyn ReferenceDirectory>,
    settings: Arc<dyn SettingsProvider>,
    audit: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
    config: SchedulingConfig,
    slot_finder: SlotFinder,
}

impl SeriesLifecycleService {
    /// Create a new lifecycle service with default scheduling bounds
    pub fn new(
        series: Arc<dyn SeriesRepository>,
        bookings: Arc<dyn BookingStore>,
        references: Arc<dyn ReferenceDirectory>,
        settings: Arc<dyn SettingsProvider>,
        audit: Arc<dyn AuditSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let config = SchedulingConfig::default();
        let slot_finder = SlotFinder::from_config(&config);
        Self { series, bookings, references, settings, audit, clock, config, slot_finder }
    }

    /// Override horizons, occurrence cap and the alternative ladder
    #[must_use]
    pub fn with_config(mut self, config: SchedulingConfig) -> Self {
        self.slot_finder = SlotFinder::from_config(&config);
        self.config = config;
        self
    }

    // ------------------------------------------------------------------
    // Create / preview / clone
    // ------------------------------------------------------------------

    /// Persist a new series and materialize its first batch of instances.
    #[instrument(skip(self, request), fields(staff_id = %request.staff_id))]
    pub async fn create_series(
        &self,
        request: CreateSeriesRequest,
        actor: &str,
    ) -> Result<SeriesCreationOutcome> {
        self.create_internal(request, actor, None).await
    }

    /// Dry run of [`Self::create_series`]: same dates, same checks, nothing
    /// written. Conflicting dates come back with alternatives.
    #[instrument(skip(self, request), fields(staff_id = %request.staff_id))]
    pub async fn preview_conflicts(&self, request: &CreateSeriesRequest) -> Result<ConflictPreview> {
        let timeline = self.timeline()?;
        let start_date = request.start_date.unwrap_or(timeline.today);
        request.rule.validate(start_date)?;
        let refs = references::resolve(
            self.references.as_ref(),
            &request.client_id,
            &request.service_id,
            &request.staff_id,
            false,
        )
        .await?;

        let rule = pinned_rule(&request.rule, start_date);
        let exceptions: BTreeSet<NaiveDate> = request.exception_dates.iter().copied().collect();
        let starts = self.plan_initial(&rule, start_date, &exceptions, &timeline)?;

        let tz = timeline.settings.timezone;
        let duration = minutes(refs.service.duration_minutes);
        let buffer = minutes(request.buffer_minutes);

        let mut preview = ConflictPreview::default();
        let mut planned = Vec::with_capacity(starts.len());
        for local_start in starts {
            match localize(tz, local_start) {
                Some(start_time) => planned.push(PlannedOccurrence {
                    date: local_start.date(),
                    local_start,
                    start_time,
                    end_time: start_time + duration,
                }),
                None => preview.skipped.push(SkippedDate {
                    date: local_start.date(),
                    requested_start: local_start,
                    reason: SkipReason::NonexistentLocalTime,
                }),
            }
        }
        let (Some(first), Some(last)) = (planned.first(), planned.last()) else {
            return Ok(preview);
        };

        // One read covering every candidate day plus a margin for alternatives.
        let existing = self
            .bookings
            .find_bookings(
                &request.staff_id,
                first.start_time - Duration::days(1),
                last.end_time + buffer + Duration::days(1),
            )
            .await?;

        for occurrence in planned {
            let candidate = Candidate {
                staff_id: &request.staff_id,
                start: occurrence.start_time,
                blocked_until: occurrence.end_time + buffer,
                exclude_id: None,
            };
            let hits = find_conflicts(&candidate, &existing);
            if hits.is_empty() {
                preview.available.push(occurrence);
                continue;
            }
            let conflicting_ids = hits.iter().map(|b| b.id.clone()).collect();
            let alternatives = self.slot_finder.find_alternatives(
                &SlotRequest {
                    staff_id: &request.staff_id,
                    date: occurrence.date,
                    preferred: rule.time_of_day,
                    duration_minutes: refs.service.duration_minutes,
                    buffer_minutes: request.buffer_minutes,
                    exclude_id: None,
                },
                &timeline.settings,
                &existing,
                timeline.now,
            );
            debug!(date = %occurrence.date, alternatives = alternatives.len(), "Conflicting date");
            preview.conflicts.push(ConflictingDate { occurrence, conflicting_ids, alternatives });
        }

        info!(
            available = preview.available.len(),
            conflicts = preview.conflicts.len(),
            "Series preview computed"
        );
        Ok(preview)
    }

    /// Start a new, independent series from an existing one's configuration.
    #[instrument(skip(self, overrides))]
    pub async fn clone_series(
        &self,
        source_id: &str,
        overrides: CloneOverrides,
        actor: &str,
    ) -> Result<SeriesCreationOutcome> {
        let source = self.load(source_id).await?;
        let timeline = self.timeline()?;

        let request = CreateSeriesRequest {
            client_id: overrides.client_id.unwrap_or(source.client_id),
            service_id: source.service_id,
            staff_id: overrides.staff_id.unwrap_or(source.staff_id),
            rule: RecurrenceRule {
                time_of_day: overrides.time_of_day.unwrap_or(source.rule.time_of_day),
                ..source.rule
            },
            start_date: Some(timeline.today),
            locked_price_cents: source.locked_price_cents,
            buffer_minutes: source.buffer_minutes,
            notes: source.notes,
            exception_dates: Vec::new(),
            resolutions: Vec::new(),
        };
        self.create_internal(request, actor, Some(source.id)).await
    }

    async fn create_internal(
        &self,
        request: CreateSeriesRequest,
        actor: &str,
        cloned_from: Option<String>,
    ) -> Result<SeriesCreationOutcome> {
        let timeline = self.timeline()?;
        let start_date = request.start_date.unwrap_or(timeline.today);
        request.rule.validate(start_date)?;
        let refs = references::resolve(
            self.references.as_ref(),
            &request.client_id,
            &request.service_id,
            &request.staff_id,
            true,
        )
        .await?;

        let mut series = RecurringSeries {
            id: new_id(),
            client_id: request.client_id,
            service_id: request.service_id,
            staff_id: request.staff_id,
            rule: pinned_rule(&request.rule, start_date),
            start_date,
            occurrences_created: 0,
            is_active: true,
            pause: None,
            locked_price_cents: request.locked_price_cents,
            buffer_minutes: request.buffer_minutes,
            notes: request.notes,
            cloned_from,
            created_by: actor.to_string(),
            created_at: timeline.now,
            updated_at: timeline.now,
        };

        let exception_days: BTreeSet<NaiveDate> = request.exception_dates.into_iter().collect();
        let exceptions: Vec<ExceptionDate> = exception_days
            .iter()
            .map(|date| ExceptionDate {
                series_id: series.id.clone(),
                date: *date,
                reason: None,
                created_at: timeline.now,
            })
            .collect();
        self.series.insert_series(&series, &exceptions).await?;

        let starts = self.plan_initial(&series.rule, start_date, &exception_days, &timeline)?;
        let resolutions: HashMap<NaiveDate, DateResolution> =
            request.resolutions.into_iter().map(|choice| (choice.date, choice.resolution)).collect();
        let batch = self.materialize(&series, &refs.service, &starts, &resolutions, &timeline).await;

        series.occurrences_created = count(batch.created.len());
        series.updated_at = timeline.now;
        self.series.update_series(&series).await?;

        let action = if series.cloned_from.is_some() {
            SeriesAuditAction::Cloned
        } else {
            SeriesAuditAction::Created
        };
        self.emit(
            &series.id,
            action,
            actor,
            json!({
                "pattern": series.rule.pattern.kind(),
                "end": series.rule.end.kind(),
                "start_date": series.start_date,
                "cloned_from": series.cloned_from,
                "created": batch.created.len(),
                "skipped": batch.skipped.len(),
                "interrupted": batch.interruption(),
            }),
        )
        .await;
        if let Some(err) = batch.interrupted {
            error!(
                series_id = %series.id,
                created = batch.created.len(),
                error = %err,
                "Series creation interrupted"
            );
            return Err(err);
        }

        info!(
            series_id = %series.id,
            created = batch.created.len(),
            skipped = batch.skipped.len(),
            "Recurring series created"
        );
        Ok(SeriesCreationOutcome { series, created: batch.created, skipped: batch.skipped })
    }

    // ------------------------------------------------------------------
    // Configuration changes
    // ------------------------------------------------------------------

    /// Change the series row only; existing instances keep their times.
    #[instrument(skip(self, update))]
    pub async fn update_series(
        &self,
        series_id: &str,
        update: SeriesUpdate,
        actor: &str,
    ) -> Result<RecurringSeries> {
        let mut series = self.load_active(series_id, "update").await?;
        let timeline = self.timeline()?;
        let diff = self.apply_update(&mut series, &update).await?;
        series.updated_at = timeline.now;
        self.series.update_series(&series).await?;

        self.emit(series_id, SeriesAuditAction::Updated, actor, Value::Object(diff)).await;
        info!(series_id, "Series configuration updated");
        Ok(series)
    }

    /// Change the series row and move every future linked instance to match.
    ///
    /// An instance whose new slot is taken stays where it is and is reported
    /// in `skipped`.
    #[instrument(skip(self, update))]
    pub async fn update_future_instances(
        &self,
        series_id: &str,
        update: SeriesUpdate,
        actor: &str,
    ) -> Result<FutureUpdateOutcome> {
        let mut series = self.load_active(series_id, "update future instances of").await?;
        let timeline = self.timeline()?;
        let diff = self.apply_update(&mut series, &update).await?;
        series.updated_at = timeline.now;
        self.series.update_series(&series).await?;

        let tz = timeline.settings.timezone;
        let mut updated = Vec::new();
        let mut skipped = Vec::new();
        for instance in self.bookings.series_appointments(series_id).await? {
            if !instance.follows_series(series_id)
                || instance.status.is_terminal()
                || instance.start_time < timeline.now
            {
                continue;
            }
            let local_start = timeline.local_date(instance.start_time).and_time(series.rule.time_of_day);
            let Some(start_time) = localize(tz, local_start) else {
                skipped.push(SkippedInstance {
                    appointment_id: instance.id,
                    requested_start: instance.start_time,
                    reason: SkipReason::NonexistentLocalTime,
                });
                continue;
            };
            let end_time = start_time + (instance.end_time - instance.start_time);
            match self
                .bookings
                .reschedule_if_free(
                    &instance.id,
                    &series.staff_id,
                    start_time,
                    end_time,
                    series.buffer_minutes,
                )
                .await?
            {
                BookingAttempt::Booked(moved) => updated.push(moved),
                BookingAttempt::Conflict { conflicting_ids } => {
                    warn!(appointment_id = %instance.id, ?conflicting_ids, "Instance left in place");
                    skipped.push(SkippedInstance {
                        appointment_id: instance.id,
                        requested_start: start_time,
                        reason: SkipReason::TimeSlotConflict,
                    });
                }
            }
        }

        let mut changes = diff;
        changes.insert("updated".into(), json!(updated.len()));
        changes.insert("skipped".into(), json!(skipped.len()));
        self.emit(series_id, SeriesAuditAction::FutureInstancesUpdated, actor, Value::Object(changes))
            .await;

        info!(series_id, updated = updated.len(), skipped = skipped.len(), "Future instances updated");
        Ok(FutureUpdateOutcome { series, updated, skipped })
    }

    // ------------------------------------------------------------------
    // Lifecycle state
    // ------------------------------------------------------------------

    /// Terminate the series and cancel its future instances. Irreversible.
    #[instrument(skip(self))]
    pub async fn cancel_series(&self, series_id: &str, actor: &str) -> Result<CancellationOutcome> {
        let mut series = self.load_active(series_id, "cancel").await?;
        let timeline = self.timeline()?;
        series.is_active = false;
        series.pause = None;
        series.updated_at = timeline.now;
        self.series.update_series(&series).await?;

        let targets: Vec<String> = self
            .bookings
            .series_appointments(series_id)
            .await?
            .into_iter()
            .filter(|a| {
                a.follows_series(series_id)
                    && a.start_time >= timeline.now
                    && can_transition(a.status, AppointmentStatus::Cancelled)
            })
            .map(|a| a.id)
            .collect();
        let cancelled = self.cancel_instances(&targets).await?;

        self.emit(series_id, SeriesAuditAction::Cancelled, actor, json!({ "cancelled": cancelled.len() }))
            .await;
        info!(series_id, cancelled = cancelled.len(), "Series cancelled");
        Ok(CancellationOutcome { series_id: series_id.to_string(), cancelled })
    }

    /// Suspend generation. Existing instances are not touched.
    #[instrument(skip(self))]
    pub async fn pause_series(
        &self,
        series_id: &str,
        paused_until: Option<NaiveDate>,
        actor: &str,
    ) -> Result<RecurringSeries> {
        let mut series = self.load_active(series_id, "pause").await?;
        if series.is_paused() {
            warn!(series_id, "Pause rejected: already paused");
            return Err(CadenceError::InvalidState(format!("series {series_id} is already paused")));
        }
        let timeline = self.timeline()?;
        if let Some(until) = paused_until {
            if until < timeline.today {
                return Err(CadenceError::Validation(format!(
                    "paused_until {until} is before today ({})",
                    timeline.today
                )));
            }
        }

        series.pause = Some(SeriesPause { paused_at: timeline.now, paused_until });
        series.updated_at = timeline.now;
        self.series.update_series(&series).await?;

        self.emit(series_id, SeriesAuditAction::Paused, actor, json!({ "paused_until": paused_until }))
            .await;
        info!(series_id, "Series paused");
        Ok(series)
    }

    #[instrument(skip(self))]
    pub async fn resume_series(&self, series_id: &str, actor: &str) -> Result<RecurringSeries> {
        let mut series = self.load_active(series_id, "resume").await?;
        let Some(pause) = series.pause.take() else {
            warn!(series_id, "Resume rejected: not paused");
            return Err(CadenceError::InvalidState(format!("series {series_id} is not paused")));
        };
        let timeline = self.timeline()?;
        series.updated_at = timeline.now;
        self.series.update_series(&series).await?;

        self.emit(
            series_id,
            SeriesAuditAction::Resumed,
            actor,
            json!({ "paused_at": pause.paused_at, "paused_until": pause.paused_until }),
        )
        .await;
        info!(series_id, "Series resumed");
        Ok(series)
    }

    /// Generate `additional_months` more of the series, continuing after the
    /// latest existing instance in the phase set by the start date.
    #[instrument(skip(self))]
    pub async fn extend_series(
        &self,
        series_id: &str,
        additional_months: u32,
        actor: &str,
    ) -> Result<ExtensionOutcome> {
        if additional_months == 0 {
            return Err(CadenceError::Validation("additional_months must be at least 1".into()));
        }
        let mut series = self.load_active(series_id, "extend").await?;
        if series.is_paused() {
            warn!(series_id, "Extend rejected: series is paused");
            return Err(CadenceError::InvalidState(format!(
                "series {series_id} is paused; resume it before extending"
            )));
        }
        let timeline = self.timeline()?;
        if series.end_condition_exhausted(timeline.today) {
            warn!(series_id, end = series.rule.end.kind(), "Extend rejected: end condition reached");
            return Err(CadenceError::InvalidState(format!(
                "series {series_id} has already reached its end condition"
            )));
        }

        let service = references::existing_service(self.references.as_ref(), &series.service_id).await?;
        let existing_days: BTreeSet<NaiveDate> = self
            .bookings
            .series_appointments(series_id)
            .await?
            .iter()
            .map(|a| timeline.local_date(a.start_time))
            .collect();

        // The start date fixes the phase; the latest instance only sets the
        // floor, so a moved or detached instance cannot shift the pattern.
        let anchor = series.start_date;
        let (floor, horizon_origin) = match existing_days.last().copied() {
            Some(latest) => {
                let next = latest.succ_opt().unwrap_or(latest);
                (next.and_time(NaiveTime::MIN), latest)
            }
            None => (anchor.and_time(NaiveTime::MIN), anchor.max(timeline.today)),
        };
        let horizon_end = add_months(horizon_origin, additional_months)?;

        let mut rule = series.rule.clone();
        if let Some(remaining) = series.remaining_count() {
            rule.end = EndCondition::AfterCount { count: remaining };
        }
        let exceptions: BTreeSet<NaiveDate> =
            self.series.list_exceptions(series_id).await?.into_iter().map(|e| e.date).collect();
        let window = GenerationWindow {
            anchor,
            not_before: floor.max(timeline.now_local),
            horizon_end,
            max_occurrences: self.config.max_occurrences,
        };
        let starts: Vec<NaiveDateTime> = generate(&rule, &window, &exceptions)?
            .into_iter()
            .filter(|start| !existing_days.contains(&start.date()))
            .collect();

        let batch = self.materialize(&series, &service, &starts, &HashMap::new(), &timeline).await;
        series.occurrences_created =
            series.occurrences_created.saturating_add(count(batch.created.len()));
        series.updated_at = timeline.now;
        self.series.update_series(&series).await?;

        self.emit(
            series_id,
            SeriesAuditAction::Extended,
            actor,
            json!({
                "additional_months": additional_months,
                "floor": floor,
                "horizon_end": horizon_end,
                "created": batch.created.len(),
                "skipped": batch.skipped.len(),
                "interrupted": batch.interruption(),
            }),
        )
        .await;
        if let Some(err) = batch.interrupted {
            error!(
                series_id,
                created = batch.created.len(),
                error = %err,
                "Series extension interrupted"
            );
            return Err(err);
        }

        info!(
            series_id,
            created = batch.created.len(),
            skipped = batch.skipped.len(),
            "Series extended"
        );
        Ok(ExtensionOutcome { series, created: batch.created, skipped: batch.skipped })
    }

    // ------------------------------------------------------------------
    // Exceptions, detachment, partial cancellation
    // ------------------------------------------------------------------

    /// Exclude a calendar day and cancel any linked instance already on it.
    #[instrument(skip(self, reason))]
    pub async fn add_exception(
        &self,
        series_id: &str,
        date: NaiveDate,
        reason: Option<String>,
        actor: &str,
    ) -> Result<ExceptionOutcome> {
        self.load_active(series_id, "add an exception to").await?;
        let timeline = self.timeline()?;
        let exception = ExceptionDate {
            series_id: series_id.to_string(),
            date,
            reason,
            created_at: timeline.now,
        };
        if !self.series.insert_exception(&exception).await? {
            return Err(CadenceError::InvalidState(format!(
                "{date} is already an exception date of series {series_id}"
            )));
        }

        let targets: Vec<String> = self
            .bookings
            .series_appointments(series_id)
            .await?
            .into_iter()
            .filter(|a| {
                a.follows_series(series_id)
                    && timeline.local_date(a.start_time) == date
                    && can_transition(a.status, AppointmentStatus::Cancelled)
            })
            .map(|a| a.id)
            .collect();
        let cancelled = self.cancel_instances(&targets).await?;

        self.emit(
            series_id,
            SeriesAuditAction::ExceptionAdded,
            actor,
            json!({ "date": date, "reason": exception.reason, "cancelled": cancelled.len() }),
        )
        .await;
        Ok(ExceptionOutcome { exception, cancelled })
    }

    /// Drop an exception date. Instances cancelled by it stay cancelled.
    #[instrument(skip(self))]
    pub async fn remove_exception(
        &self,
        series_id: &str,
        date: NaiveDate,
        actor: &str,
    ) -> Result<ExceptionDate> {
        self.load_active(series_id, "remove an exception from").await?;
        let removed = self.series.delete_exception(series_id, date).await?.ok_or_else(|| {
            CadenceError::NotFound(format!("exception date {date} of series {series_id}"))
        })?;

        self.emit(series_id, SeriesAuditAction::ExceptionRemoved, actor, json!({ "date": date }))
            .await;
        Ok(removed)
    }

    /// Sever one instance from series-wide changes; it keeps its link.
    #[instrument(skip(self))]
    pub async fn detach_occurrence(&self, appointment_id: &str, actor: &str) -> Result<Appointment> {
        let appointment = self
            .bookings
            .get_appointment(appointment_id)
            .await?
            .ok_or_else(|| CadenceError::appointment_not_found(appointment_id))?;
        let Some(series_id) = appointment.series_id.clone() else {
            return Err(CadenceError::InvalidState(format!(
                "appointment {appointment_id} does not belong to a series"
            )));
        };
        if appointment.is_detached_from_series {
            return Err(CadenceError::InvalidState(format!(
                "appointment {appointment_id} is already detached"
            )));
        }

        let detached = self.bookings.set_detached(appointment_id).await?;
        self.emit(
            &series_id,
            SeriesAuditAction::OccurrenceDetached,
            actor,
            json!({ "appointment_id": appointment_id, "start_time": detached.start_time }),
        )
        .await;
        Ok(detached)
    }

    /// Cancel every linked instance on or after `from_date`, whether or not
    /// the series itself is still active.
    #[instrument(skip(self))]
    pub async fn cancel_from_date(
        &self,
        series_id: &str,
        from_date: NaiveDate,
        actor: &str,
    ) -> Result<CancellationOutcome> {
        self.load(series_id).await?;
        let timeline = self.timeline()?;

        let targets: Vec<String> = self
            .bookings
            .series_appointments(series_id)
            .await?
            .into_iter()
            .filter(|a| {
                a.follows_series(series_id)
                    && timeline.local_date(a.start_time) >= from_date
                    && can_transition(a.status, AppointmentStatus::Cancelled)
            })
            .map(|a| a.id)
            .collect();
        let cancelled = self.cancel_instances(&targets).await?;

        self.emit(
            series_id,
            SeriesAuditAction::CancelledFromDate,
            actor,
            json!({ "from_date": from_date, "cancelled": cancelled.len() }),
        )
        .await;
        info!(series_id, %from_date, cancelled = cancelled.len(), "Series instances cancelled");
        Ok(CancellationOutcome { series_id: series_id.to_string(), cancelled })
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Free slots near a preferred time on one day.
    #[instrument(skip(self, request), fields(staff_id = %request.staff_id, date = %request.date))]
    pub async fn find_alternatives(&self, request: &AlternativesRequest) -> Result<Vec<AlternativeSlot>> {
        references::existing_staff(self.references.as_ref(), &request.staff_id).await?;
        let service =
            references::existing_service(self.references.as_ref(), &request.service_id).await?;
        let timeline = self.timeline()?;

        let (range_start, range_end) = day_range(request.date);
        let existing = self.bookings.find_bookings(&request.staff_id, range_start, range_end).await?;
        Ok(self.slot_finder.find_alternatives(
            &SlotRequest {
                staff_id: &request.staff_id,
                date: request.date,
                preferred: request.preferred_time,
                duration_minutes: service.duration_minutes,
                buffer_minutes: request.buffer_minutes,
                exclude_id: None,
            },
            &timeline.settings,
            &existing,
            timeline.now,
        ))
    }

    pub async fn series_details(&self, series_id: &str) -> Result<SeriesDetails> {
        let series = self.load(series_id).await?;
        let exceptions = self.series.list_exceptions(series_id).await?;
        let appointments = self.bookings.series_appointments(series_id).await?;
        Ok(SeriesDetails { series, exceptions, appointments })
    }

    pub async fn audit_history(&self, series_id: &str) -> Result<Vec<AuditEvent>> {
        self.load(series_id).await?;
        self.audit.history(series_id).await
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn timeline(&self) -> Result<Timeline> {
        let settings = self.settings.business_settings()?;
        let now = self.clock.now();
        let now_local = now.with_timezone(&settings.timezone).naive_local();
        Ok(Timeline { settings, now, now_local, today: now_local.date() })
    }

    async fn load(&self, series_id: &str) -> Result<RecurringSeries> {
        self.series
            .get_series(series_id)
            .await?
            .ok_or_else(|| CadenceError::series_not_found(series_id))
    }

    async fn load_active(&self, series_id: &str, operation: &str) -> Result<RecurringSeries> {
        let series = self.load(series_id).await?;
        if !series.is_active {
            warn!(series_id, operation, "Rejected: series is cancelled");
            return Err(CadenceError::InvalidState(format!(
                "cannot {operation} series {series_id}: it has been cancelled"
            )));
        }
        Ok(series)
    }

    /// Dates for a fresh series: from its start date, never in the past.
    fn plan_initial(
        &self,
        rule: &RecurrenceRule,
        start_date: NaiveDate,
        exceptions: &BTreeSet<NaiveDate>,
        timeline: &Timeline,
    ) -> Result<Vec<NaiveDateTime>> {
        let months = match rule.end {
            EndCondition::Never => self.config.default_horizon_months,
            EndCondition::AfterCount { .. } | EndCondition::ByDate { .. } => {
                self.config.max_horizon_months
            }
        };
        let window = GenerationWindow {
            anchor: start_date,
            not_before: start_date.and_time(NaiveTime::MIN).max(timeline.now_local),
            horizon_end: add_months(start_date.max(timeline.today), months)?,
            max_occurrences: self.config.max_occurrences,
        };
        generate(rule, &window, exceptions)
    }

    /// Book each start in order through the atomic store primitive.
    ///
    /// A storage error stops the batch but keeps what was already booked, so
    /// the caller can record it before failing.
    async fn materialize(
        &self,
        series: &RecurringSeries,
        service: &ServiceRef,
        starts: &[NaiveDateTime],
        resolutions: &HashMap<NaiveDate, DateResolution>,
        timeline: &Timeline,
    ) -> Materialized {
        let tz: Tz = timeline.settings.timezone;
        let mut batch = Materialized::default();

        for &planned in starts {
            let date = planned.date();
            let (local_start, miss) = match resolutions.get(&date) {
                Some(DateResolution::Skip) => {
                    debug!(%date, "Skipped by request");
                    batch.skipped.push(SkippedDate {
                        date,
                        requested_start: planned,
                        reason: SkipReason::SkippedByRequest,
                    });
                    continue;
                }
                Some(DateResolution::Alternative { time_of_day }) => {
                    (date.and_time(*time_of_day), SkipReason::AlternativeUnavailable)
                }
                None => (planned, SkipReason::TimeSlotConflict),
            };

            let Some(start_time) = localize(tz, local_start) else {
                batch.skipped.push(SkippedDate {
                    date,
                    requested_start: local_start,
                    reason: SkipReason::NonexistentLocalTime,
                });
                continue;
            };
            if start_time < timeline.now {
                batch.skipped.push(SkippedDate { date, requested_start: local_start, reason: miss });
                continue;
            }

            let booking = instance_booking(series, service, start_time);
            let attempt = match self.bookings.create_if_free(booking).await {
                Ok(attempt) => attempt,
                Err(err) => {
                    batch.interrupted = Some(err);
                    break;
                }
            };
            match attempt {
                BookingAttempt::Booked(appointment) => {
                    debug!(%date, appointment_id = %appointment.id, "Instance created");
                    batch.created.push(appointment);
                }
                BookingAttempt::Conflict { conflicting_ids } => {
                    warn!(%date, ?conflicting_ids, reason = %miss, "Date skipped");
                    batch.skipped.push(SkippedDate { date, requested_start: local_start, reason: miss });
                }
            }
        }
        batch
    }

    /// Apply `update` to `series`, returning a field-level diff.
    async fn apply_update(
        &self,
        series: &mut RecurringSeries,
        update: &SeriesUpdate,
    ) -> Result<Map<String, Value>> {
        if update.is_empty() {
            return Err(CadenceError::Validation("no changes supplied".into()));
        }
        let mut diff = Map::new();
        if let Some(staff_id) = &update.staff_id {
            if *staff_id != series.staff_id {
                references::active_staff(self.references.as_ref(), staff_id).await?;
                diff.insert("staff_id".into(), json!({ "from": series.staff_id, "to": staff_id }));
                series.staff_id.clone_from(staff_id);
            }
        }
        if let Some(time_of_day) = update.time_of_day {
            if time_of_day != series.rule.time_of_day {
                diff.insert(
                    "time_of_day".into(),
                    json!({ "from": series.rule.time_of_day, "to": time_of_day }),
                );
                series.rule.time_of_day = time_of_day;
            }
        }
        if let Some(buffer) = update.buffer_minutes {
            if buffer != series.buffer_minutes {
                diff.insert(
                    "buffer_minutes".into(),
                    json!({ "from": series.buffer_minutes, "to": buffer }),
                );
                series.buffer_minutes = buffer;
            }
        }
        if let Some(notes) = &update.notes {
            if series.notes.as_ref() != Some(notes) {
                diff.insert("notes".into(), json!({ "from": series.notes, "to": notes }));
                series.notes = Some(notes.clone());
            }
        }
        Ok(diff)
    }

    async fn cancel_instances(&self, ids: &[String]) -> Result<Vec<String>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.bookings.cancel_appointments(ids).await
    }

    /// Audit failures never undo a completed operation.
    async fn emit(&self, series_id: &str, action: SeriesAuditAction, actor: &str, changes: Value) {
        let event = AuditEvent {
            id: new_id(),
            series_id: series_id.to_string(),
            action,
            actor: actor.to_string(),
            changes,
            created_at: self.clock.now(),
        };
        if let Err(err) = self.audit.record(event).await {
            error!(series_id, %action, error = %err, "Failed to record series audit event");
        }
    }
}

fn pinned_rule(rule: &RecurrenceRule, start_date: NaiveDate) -> RecurrenceRule {
    RecurrenceRule { pattern: rule.pattern.pinned_to(start_date), ..rule.clone() }
}

fn instance_booking(
    series: &RecurringSeries,
    service: &ServiceRef,
    start_time: DateTime<Utc>,
) -> NewBooking {
    NewBooking {
        client_id: series.client_id.clone(),
        service_id: series.service_id.clone(),
        staff_id: series.staff_id.clone(),
        start_time,
        end_time: start_time + minutes(service.duration_minutes),
        buffer_minutes: series.buffer_minutes,
        price_cents: series.locked_price_cents.or(service.price_cents),
        series_id: Some(series.id.clone()),
        notes: series.notes.clone(),
    }
}

fn minutes(value: u32) -> Duration {
    Duration::minutes(i64::from(value))
}

fn count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| CadenceError::Validation(format!("{date} + {months} months is out of range")))
}

/// UTC range wide enough to cover one local calendar day in any timezone.
fn day_range(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.pred_opt().unwrap_or(date).and_time(NaiveTime::MIN);
    let end = date
        .succ_opt()
        .and_then(|d| d.succ_opt())
        .unwrap_or(date)
        .and_time(NaiveTime::MIN);
    (Utc.from_utc_datetime(&start), Utc.from_utc_datetime(&end))
}
