//! JSON-lines command protocol
//!
//! One request object per line, tagged by `op`:
//!
//! ```json
//! {"op": "pause_series", "series_id": "…", "paused_until": "2026-05-01", "actor": "front-desk"}
//! ```
//!
//! Every request gets one response line, either `{"ok": true, "data": …}` or
//! `{"ok": false, "error": {"type": "…", "message": "…"}}`.

use cadence_domain::{
    AlternativesRequest, AppointmentStatus, BookAppointmentRequest, CadenceError, ClientRef,
    CloneOverrides, CreateSeriesRequest, Result, SeriesUpdate, ServiceRef, StaffRef,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::{appointments, health, references, series};
use crate::context::AppContext;
use crate::utils::logging::error_label;

const DEFAULT_ACTOR: &str = "system";

fn default_actor() -> String {
    DEFAULT_ACTOR.to_string()
}

/// Every operation reachable over the line protocol.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    CreateSeries {
        request: CreateSeriesRequest,
        #[serde(default = "default_actor")]
        actor: String,
    },
    PreviewConflicts {
        request: CreateSeriesRequest,
    },
    CloneSeries {
        series_id: String,
        #[serde(default)]
        overrides: CloneOverrides,
        #[serde(default = "default_actor")]
        actor: String,
    },
    UpdateSeries {
        series_id: String,
        update: SeriesUpdate,
        #[serde(default = "default_actor")]
        actor: String,
    },
    UpdateFutureInstances {
        series_id: String,
        update: SeriesUpdate,
        #[serde(default = "default_actor")]
        actor: String,
    },
    CancelSeries {
        series_id: String,
        #[serde(default = "default_actor")]
        actor: String,
    },
    PauseSeries {
        series_id: String,
        #[serde(default)]
        paused_until: Option<NaiveDate>,
        #[serde(default = "default_actor")]
        actor: String,
    },
    ResumeSeries {
        series_id: String,
        #[serde(default = "default_actor")]
        actor: String,
    },
    ExtendSeries {
        series_id: String,
        additional_months: u32,
        #[serde(default = "default_actor")]
        actor: String,
    },
    AddException {
        series_id: String,
        date: NaiveDate,
        #[serde(default)]
        reason: Option<String>,
        #[serde(default = "default_actor")]
        actor: String,
    },
    RemoveException {
        series_id: String,
        date: NaiveDate,
        #[serde(default = "default_actor")]
        actor: String,
    },
    DetachOccurrence {
        appointment_id: String,
        #[serde(default = "default_actor")]
        actor: String,
    },
    CancelFromDate {
        series_id: String,
        from_date: NaiveDate,
        #[serde(default = "default_actor")]
        actor: String,
    },
    FindAlternatives {
        request: AlternativesRequest,
    },
    GetSeries {
        series_id: String,
    },
    AuditHistory {
        series_id: String,
    },
    BookAppointment {
        request: BookAppointmentRequest,
    },
    ChangeStatus {
        appointment_id: String,
        status: AppointmentStatus,
    },
    RescheduleAppointment {
        appointment_id: String,
        start_time: DateTime<Utc>,
    },
    GetAppointment {
        appointment_id: String,
    },
    SaveClient {
        client: ClientRef,
    },
    SaveService {
        service: ServiceRef,
    },
    SaveStaff {
        staff: StaffRef,
    },
    Health,
}

impl Command {
    /// Wire name of the operation, for logs.
    pub const fn op(&self) -> &'static str {
        match self {
            Self::CreateSeries { .. } => "create_series",
            Self::PreviewConflicts { .. } => "preview_conflicts",
            Self::CloneSeries { .. } => "clone_series",
            Self::UpdateSeries { .. } => "update_series",
            Self::UpdateFutureInstances { .. } => "update_future_instances",
            Self::CancelSeries { .. } => "cancel_series",
            Self::PauseSeries { .. } => "pause_series",
            Self::ResumeSeries { .. } => "resume_series",
            Self::ExtendSeries { .. } => "extend_series",
            Self::AddException { .. } => "add_exception",
            Self::RemoveException { .. } => "remove_exception",
            Self::DetachOccurrence { .. } => "detach_occurrence",
            Self::CancelFromDate { .. } => "cancel_from_date",
            Self::FindAlternatives { .. } => "find_alternatives",
            Self::GetSeries { .. } => "get_series",
            Self::AuditHistory { .. } => "audit_history",
            Self::BookAppointment { .. } => "book_appointment",
            Self::ChangeStatus { .. } => "change_status",
            Self::RescheduleAppointment { .. } => "reschedule_appointment",
            Self::GetAppointment { .. } => "get_appointment",
            Self::SaveClient { .. } => "save_client",
            Self::SaveService { .. } => "save_service",
            Self::SaveStaff { .. } => "save_staff",
            Self::Health => "health",
        }
    }
}

/// Error half of a response line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

impl From<&CadenceError> for ErrorBody {
    fn from(err: &CadenceError) -> Self {
        Self { kind: error_label(err).to_string(), message: err.to_string() }
    }
}

/// One response line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl Response {
    pub const fn success(data: Value) -> Self {
        Self { ok: true, data: Some(data), error: None }
    }

    pub fn failure(err: &CadenceError) -> Self {
        Self { ok: false, data: None, error: Some(ErrorBody::from(err)) }
    }

    fn from_result<T: Serialize>(result: Result<T>) -> Self {
        match result.and_then(|value| {
            serde_json::to_value(value)
                .map_err(|e| CadenceError::Internal(format!("failed to encode response: {e}")))
        }) {
            Ok(data) => Self::success(data),
            Err(err) => Self::failure(&err),
        }
    }
}

/// Run one decoded command against the context.
pub async fn dispatch(ctx: &AppContext, command: Command) -> Response {
    debug!(op = command.op(), "dispatching command");

    match command {
        Command::CreateSeries { request, actor } => {
            Response::from_result(series::create_series(ctx, request, &actor).await)
        }
        Command::PreviewConflicts { request } => {
            Response::from_result(series::preview_conflicts(ctx, &request).await)
        }
        Command::CloneSeries { series_id, overrides, actor } => {
            Response::from_result(series::clone_series(ctx, &series_id, overrides, &actor).await)
        }
        Command::UpdateSeries { series_id, update, actor } => {
            Response::from_result(series::update_series(ctx, &series_id, update, &actor).await)
        }
        Command::UpdateFutureInstances { series_id, update, actor } => Response::from_result(
            series::update_future_instances(ctx, &series_id, update, &actor).await,
        ),
        Command::CancelSeries { series_id, actor } => {
            Response::from_result(series::cancel_series(ctx, &series_id, &actor).await)
        }
        Command::PauseSeries { series_id, paused_until, actor } => {
            Response::from_result(series::pause_series(ctx, &series_id, paused_until, &actor).await)
        }
        Command::ResumeSeries { series_id, actor } => {
            Response::from_result(series::resume_series(ctx, &series_id, &actor).await)
        }
        Command::ExtendSeries { series_id, additional_months, actor } => Response::from_result(
            series::extend_series(ctx, &series_id, additional_months, &actor).await,
        ),
        Command::AddException { series_id, date, reason, actor } => {
            Response::from_result(series::add_exception(ctx, &series_id, date, reason, &actor).await)
        }
        Command::RemoveException { series_id, date, actor } => {
            Response::from_result(series::remove_exception(ctx, &series_id, date, &actor).await)
        }
        Command::DetachOccurrence { appointment_id, actor } => {
            Response::from_result(series::detach_occurrence(ctx, &appointment_id, &actor).await)
        }
        Command::CancelFromDate { series_id, from_date, actor } => {
            Response::from_result(series::cancel_from_date(ctx, &series_id, from_date, &actor).await)
        }
        Command::FindAlternatives { request } => {
            Response::from_result(series::find_alternatives(ctx, &request).await)
        }
        Command::GetSeries { series_id } => {
            Response::from_result(series::get_series(ctx, &series_id).await)
        }
        Command::AuditHistory { series_id } => {
            Response::from_result(series::audit_history(ctx, &series_id).await)
        }
        Command::BookAppointment { request } => {
            Response::from_result(appointments::book_appointment(ctx, request).await)
        }
        Command::ChangeStatus { appointment_id, status } => {
            Response::from_result(appointments::change_status(ctx, &appointment_id, status).await)
        }
        Command::RescheduleAppointment { appointment_id, start_time } => Response::from_result(
            appointments::reschedule_appointment(ctx, &appointment_id, start_time).await,
        ),
        Command::GetAppointment { appointment_id } => {
            Response::from_result(appointments::get_appointment(ctx, &appointment_id).await)
        }
        Command::SaveClient { client } => {
            Response::from_result(references::save_client(ctx, client).await)
        }
        Command::SaveService { service } => {
            Response::from_result(references::save_service(ctx, service).await)
        }
        Command::SaveStaff { staff } => Response::from_result(references::save_staff(ctx, staff).await),
        Command::Health => Response::from_result(health::health_check(ctx).await),
    }
}

/// Decode one request line, run it and encode the response line.
pub async fn handle_line(ctx: &AppContext, line: &str) -> String {
    let response = match serde_json::from_str::<Command>(line) {
        Ok(command) => dispatch(ctx, command).await,
        Err(e) => {
            warn!(error = %e, "rejected malformed command");
            Response::failure(&CadenceError::Validation(format!("invalid command: {e}")))
        }
    };
    encode(&response)
}

fn encode(response: &Response) -> String {
    serde_json::to_string(response).unwrap_or_else(|e| {
        format!(r#"{{"ok":false,"error":{{"type":"internal","message":"failed to encode response: {e}"}}}}"#)
    })
}
