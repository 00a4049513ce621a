//! Health check command

use cadence_domain::{CadenceError, Result};
use serde::Serialize;

use crate::context::AppContext;
use crate::utils::command_helpers::execute_with_logging;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    pub database_path: String,
    pub schema_version: Option<i32>,
}

pub async fn health_check(ctx: &AppContext) -> Result<HealthStatus> {
    execute_with_logging("health::check", || async {
        ctx.health_check()?;
        Ok::<_, CadenceError>(HealthStatus {
            database_path: ctx.db.path().display().to_string(),
            schema_version: ctx.db.schema_version()?,
        })
    })
    .await
}
