//! Append-only series audit log.

use std::sync::Arc;

use async_trait::async_trait;
use cadence_core::AuditSink;
use cadence_domain::{AuditEvent, Result as DomainResult, SeriesAuditAction};
use rusqlite::types::Type;
use rusqlite::{params, Row};
use tokio::task;
use tracing::instrument;

use super::columns::{conversion_error, instant, timestamp};
use super::manager::DbManager;
use crate::errors::to_domain;

pub struct SqliteAuditLog {
    db: Arc<DbManager>,
}

impl SqliteAuditLog {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AuditSink for SqliteAuditLog {
    #[instrument(skip(self, event), fields(series_id = %event.series_id, action = %event.action))]
    async fn record(&self, event: AuditEvent) -> DomainResult<()> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<()> {
            let changes = serde_json::to_string(&event.changes).map_err(to_domain)?;
            let conn = db.get_connection()?;
            conn.execute(
                "INSERT INTO series_audit_log (id, series_id, action, actor, changes_json, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    event.id,
                    event.series_id,
                    event.action.as_str(),
                    event.actor,
                    changes,
                    timestamp(event.created_at),
                ],
            )
            .map_err(to_domain)?;
            Ok(())
        })
        .await
        .map_err(to_domain)?
    }

    async fn history(&self, series_id: &str) -> DomainResult<Vec<AuditEvent>> {
        let db = Arc::clone(&self.db);
        let series_id = series_id.to_owned();

        task::spawn_blocking(move || -> DomainResult<Vec<AuditEvent>> {
            let conn = db.get_connection()?;
            // ids are UUIDv7, so they break ties within the same second
            let mut stmt = conn
                .prepare(
                    "SELECT id, series_id, action, actor, changes_json, created_at
                     FROM series_audit_log
                     WHERE series_id = ?1
                     ORDER BY created_at, id",
                )
                .map_err(to_domain)?;
            let rows = stmt.query_map([&series_id], map_audit_row).map_err(to_domain)?;
            rows.collect::<Result<Vec<_>, _>>().map_err(to_domain)
        })
        .await
        .map_err(to_domain)?
    }
}

fn map_audit_row(row: &Row<'_>) -> rusqlite::Result<AuditEvent> {
    let action_raw: String = row.get(2)?;
    let action = action_raw
        .parse::<SeriesAuditAction>()
        .map_err(|err| conversion_error(2, Type::Text, err.to_string()))?;
    let changes_raw: String = row.get(4)?;
    let changes = serde_json::from_str(&changes_raw)
        .map_err(|err| conversion_error(4, Type::Text, format!("invalid changes: {err}")))?;

    Ok(AuditEvent {
        id: row.get(0)?,
        series_id: row.get(1)?,
        action,
        actor: row.get(3)?,
        changes,
        created_at: instant(5, row.get(5)?)?,
    })
}
