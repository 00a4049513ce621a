//! Port interfaces for series persistence and auditing

use async_trait::async_trait;
use cadence_domain::{AuditEvent, ExceptionDate, RecurringSeries, Result};
use chrono::NaiveDate;

/// Persistence for series rows and their exception dates
#[async_trait]
pub trait SeriesRepository: Send + Sync {
    /// Insert a new series together with its initial exception dates
    async fn insert_series(&self, series: &RecurringSeries, exceptions: &[ExceptionDate])
        -> Result<()>;

    async fn get_series(&self, id: &str) -> Result<Option<RecurringSeries>>;

    /// Overwrite the mutable fields of an existing series row
    async fn update_series(&self, series: &RecurringSeries) -> Result<()>;

    /// Exception dates of a series, ordered by date
    async fn list_exceptions(&self, series_id: &str) -> Result<Vec<ExceptionDate>>;

    /// Returns `false` when the (series, date) pair already exists.
    async fn insert_exception(&self, exception: &ExceptionDate) -> Result<bool>;

    /// Returns the removed row, if there was one.
    async fn delete_exception(
        &self,
        series_id: &str,
        date: NaiveDate,
    ) -> Result<Option<ExceptionDate>>;
}

/// Append-only audit log
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, event: AuditEvent) -> Result<()>;

    /// Events for one series, oldest first
    async fn history(&self, series_id: &str) -> Result<Vec<AuditEvent>>;
}
