//! Clients, services and staff as seen by the booking engine.
//!
//! These rows are owned by whatever system manages the business's people and
//! catalogue; the engine only reads them. The `save_*` methods exist for
//! importing that data and for arranging fixtures.

use std::sync::Arc;

use async_trait::async_trait;
use cadence_core::ReferenceDirectory;
use cadence_domain::{ClientRef, Result as DomainResult, ServiceRef, StaffRef};
use rusqlite::{params, OptionalExtension, Row};
use tokio::task;

use super::columns::{flag, minutes};
use super::manager::DbManager;
use crate::errors::to_domain;

pub struct SqliteReferenceDirectory {
    db: Arc<DbManager>,
}

impl SqliteReferenceDirectory {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Insert or replace a client row.
    pub async fn save_client(&self, client: &ClientRef) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let client = client.clone();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            conn.execute(
                "INSERT OR REPLACE INTO clients (id, name, is_active) VALUES (?1, ?2, ?3)",
                params![client.id, client.name, flag(client.is_active)],
            )
            .map_err(to_domain)?;
            Ok(())
        })
        .await
        .map_err(to_domain)?
    }

    /// Insert or replace a service row.
    pub async fn save_service(&self, service: &ServiceRef) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let service = service.clone();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            conn.execute(
                "INSERT OR REPLACE INTO services (id, name, duration_minutes, price_cents, is_active)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    service.id,
                    service.name,
                    service.duration_minutes,
                    service.price_cents,
                    flag(service.is_active),
                ],
            )
            .map_err(to_domain)?;
            Ok(())
        })
        .await
        .map_err(to_domain)?
    }

    /// Insert or replace a staff row.
    pub async fn save_staff(&self, staff: &StaffRef) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let staff = staff.clone();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            conn.execute(
                "INSERT OR REPLACE INTO staff (id, name, is_active) VALUES (?1, ?2, ?3)",
                params![staff.id, staff.name, flag(staff.is_active)],
            )
            .map_err(to_domain)?;
            Ok(())
        })
        .await
        .map_err(to_domain)?
    }
}

#[async_trait]
impl ReferenceDirectory for SqliteReferenceDirectory {
    async fn client(&self, id: &str) -> DomainResult<Option<ClientRef>> {
        let db = Arc::clone(&self.db);
        let id = id.to_owned();

        task::spawn_blocking(move || -> DomainResult<Option<ClientRef>> {
            let conn = db.get_connection()?;
            conn.query_row(
                "SELECT id, name, is_active FROM clients WHERE id = ?1",
                [&id],
                |row| {
                    Ok(ClientRef {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        is_active: row.get::<_, i64>(2)? != 0,
                    })
                },
            )
            .optional()
            .map_err(to_domain)
        })
        .await
        .map_err(to_domain)?
    }

    async fn service(&self, id: &str) -> DomainResult<Option<ServiceRef>> {
        let db = Arc::clone(&self.db);
        let id = id.to_owned();

        task::spawn_blocking(move || -> DomainResult<Option<ServiceRef>> {
            let conn = db.get_connection()?;
            conn.query_row(
                "SELECT id, name, duration_minutes, price_cents, is_active FROM services WHERE id = ?1",
                [&id],
                map_service_row,
            )
            .optional()
            .map_err(to_domain)
        })
        .await
        .map_err(to_domain)?
    }

    async fn staff(&self, id: &str) -> DomainResult<Option<StaffRef>> {
        let db = Arc::clone(&self.db);
        let id = id.to_owned();

        task::spawn_blocking(move || -> DomainResult<Option<StaffRef>> {
            let conn = db.get_connection()?;
            conn.query_row("SELECT id, name, is_active FROM staff WHERE id = ?1", [&id], |row| {
                Ok(StaffRef {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    is_active: row.get::<_, i64>(2)? != 0,
                })
            })
            .optional()
            .map_err(to_domain)
        })
        .await
        .map_err(to_domain)?
    }
}

fn map_service_row(row: &Row<'_>) -> rusqlite::Result<ServiceRef> {
    Ok(ServiceRef {
        id: row.get(0)?,
        name: row.get(1)?,
        duration_minutes: minutes(2, row.get(2)?)?,
        price_cents: row.get(3)?,
        is_active: row.get::<_, i64>(4)? != 0,
    })
}
