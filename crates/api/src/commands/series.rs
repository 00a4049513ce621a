//! Recurring series commands
//!
//! Thin wrappers over [`SeriesLifecycleService`](cadence_core::SeriesLifecycleService)
//! that add per-command timing and outcome logging.

use cadence_domain::{
    AlternativeSlot, AlternativesRequest, Appointment, AuditEvent, CancellationOutcome,
    CloneOverrides, ConflictPreview, CreateSeriesRequest, ExceptionDate, ExceptionOutcome,
    ExtensionOutcome, FutureUpdateOutcome, RecurringSeries, Result, SeriesCreationOutcome,
    SeriesDetails, SeriesUpdate,
};
use chrono::NaiveDate;

use crate::context::AppContext;
use crate::utils::command_helpers::execute_with_logging;

pub async fn create_series(
    ctx: &AppContext,
    request: CreateSeriesRequest,
    actor: &str,
) -> Result<SeriesCreationOutcome> {
    execute_with_logging("series::create", || ctx.lifecycle.create_series(request, actor)).await
}

/// Dry run of [`create_series`]; writes nothing.
pub async fn preview_conflicts(
    ctx: &AppContext,
    request: &CreateSeriesRequest,
) -> Result<ConflictPreview> {
    execute_with_logging("series::preview_conflicts", || ctx.lifecycle.preview_conflicts(request))
        .await
}

pub async fn clone_series(
    ctx: &AppContext,
    source_id: &str,
    overrides: CloneOverrides,
    actor: &str,
) -> Result<SeriesCreationOutcome> {
    execute_with_logging("series::clone", || ctx.lifecycle.clone_series(source_id, overrides, actor))
        .await
}

/// Change series configuration only; instances are left alone.
pub async fn update_series(
    ctx: &AppContext,
    series_id: &str,
    update: SeriesUpdate,
    actor: &str,
) -> Result<RecurringSeries> {
    execute_with_logging("series::update", || ctx.lifecycle.update_series(series_id, update, actor))
        .await
}

/// Change series configuration and move every eligible future instance.
pub async fn update_future_instances(
    ctx: &AppContext,
    series_id: &str,
    update: SeriesUpdate,
    actor: &str,
) -> Result<FutureUpdateOutcome> {
    execute_with_logging("series::update_future_instances", || {
        ctx.lifecycle.update_future_instances(series_id, update, actor)
    })
    .await
}

pub async fn cancel_series(
    ctx: &AppContext,
    series_id: &str,
    actor: &str,
) -> Result<CancellationOutcome> {
    execute_with_logging("series::cancel", || ctx.lifecycle.cancel_series(series_id, actor)).await
}

pub async fn pause_series(
    ctx: &AppContext,
    series_id: &str,
    paused_until: Option<NaiveDate>,
    actor: &str,
) -> Result<RecurringSeries> {
    execute_with_logging("series::pause", || {
        ctx.lifecycle.pause_series(series_id, paused_until, actor)
    })
    .await
}

pub async fn resume_series(ctx: &AppContext, series_id: &str, actor: &str) -> Result<RecurringSeries> {
    execute_with_logging("series::resume", || ctx.lifecycle.resume_series(series_id, actor)).await
}

pub async fn extend_series(
    ctx: &AppContext,
    series_id: &str,
    additional_months: u32,
    actor: &str,
) -> Result<ExtensionOutcome> {
    execute_with_logging("series::extend", || {
        ctx.lifecycle.extend_series(series_id, additional_months, actor)
    })
    .await
}

pub async fn add_exception(
    ctx: &AppContext,
    series_id: &str,
    date: NaiveDate,
    reason: Option<String>,
    actor: &str,
) -> Result<ExceptionOutcome> {
    execute_with_logging("series::add_exception", || {
        ctx.lifecycle.add_exception(series_id, date, reason, actor)
    })
    .await
}

pub async fn remove_exception(
    ctx: &AppContext,
    series_id: &str,
    date: NaiveDate,
    actor: &str,
) -> Result<ExceptionDate> {
    execute_with_logging("series::remove_exception", || {
        ctx.lifecycle.remove_exception(series_id, date, actor)
    })
    .await
}

pub async fn detach_occurrence(
    ctx: &AppContext,
    appointment_id: &str,
    actor: &str,
) -> Result<Appointment> {
    execute_with_logging("series::detach_occurrence", || {
        ctx.lifecycle.detach_occurrence(appointment_id, actor)
    })
    .await
}

pub async fn cancel_from_date(
    ctx: &AppContext,
    series_id: &str,
    from_date: NaiveDate,
    actor: &str,
) -> Result<CancellationOutcome> {
    execute_with_logging("series::cancel_from_date", || {
        ctx.lifecycle.cancel_from_date(series_id, from_date, actor)
    })
    .await
}

pub async fn find_alternatives(
    ctx: &AppContext,
    request: &AlternativesRequest,
) -> Result<Vec<AlternativeSlot>> {
    execute_with_logging("series::find_alternatives", || ctx.lifecycle.find_alternatives(request))
        .await
}

pub async fn get_series(ctx: &AppContext, series_id: &str) -> Result<SeriesDetails> {
    execute_with_logging("series::get", || ctx.lifecycle.series_details(series_id)).await
}

pub async fn audit_history(ctx: &AppContext, series_id: &str) -> Result<Vec<AuditEvent>> {
    execute_with_logging("series::audit_history", || ctx.lifecycle.audit_history(series_id)).await
}
