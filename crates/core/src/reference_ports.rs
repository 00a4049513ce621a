//! Read-only collaborators: reference entities, settings and time

use async_trait::async_trait;
use cadence_domain::{BusinessSettings, ClientRef, Result, ServiceRef, StaffRef};
use chrono::{DateTime, Utc};

/// Lookup of clients, services and staff owned elsewhere
#[async_trait]
pub trait ReferenceDirectory: Send + Sync {
    async fn client(&self, id: &str) -> Result<Option<ClientRef>>;

    async fn service(&self, id: &str) -> Result<Option<ServiceRef>>;

    async fn staff(&self, id: &str) -> Result<Option<StaffRef>>;
}

/// Business hours and timezone
pub trait SettingsProvider: Send + Sync {
    fn business_settings(&self) -> Result<BusinessSettings>;
}

/// Source of "now"
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
