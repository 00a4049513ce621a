//! Application context - dependency injection container

use std::sync::Arc;

use cadence_core::{AppointmentService, Clock, SeriesLifecycleService};
use cadence_domain::{Config, Result};
use cadence_infra::{
    ConfigSettings, DbManager, SqliteAuditLog, SqliteBookingStore, SqliteReferenceDirectory,
    SqliteSeriesRepository, SystemClock,
};
use tracing::info;

/// Holds the configuration, the database and the services built on it.
pub struct AppContext {
    pub config: Config,
    pub db: Arc<DbManager>,
    pub lifecycle: Arc<SeriesLifecycleService>,
    pub appointments: Arc<AppointmentService>,
    pub references: Arc<SqliteReferenceDirectory>,
}

impl AppContext {
    /// Open the configured database, apply migrations and wire the services
    /// against the system clock.
    pub fn new(config: Config) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Same as [`Self::new`] with an injected time source.
    pub fn with_clock(config: Config, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;

        let db = Arc::new(DbManager::from_config(&config.database)?);
        db.run_migrations()?;

        let settings = Arc::new(ConfigSettings::from_config(&config.business)?);
        let bookings = Arc::new(SqliteBookingStore::new(Arc::clone(&db)));
        let references = Arc::new(SqliteReferenceDirectory::new(Arc::clone(&db)));

        let lifecycle = SeriesLifecycleService::new(
            Arc::new(SqliteSeriesRepository::new(Arc::clone(&db))),
            bookings.clone(),
            references.clone(),
            settings,
            Arc::new(SqliteAuditLog::new(Arc::clone(&db))),
            Arc::clone(&clock),
        )
        .with_config(config.scheduling.clone());
        let appointments = AppointmentService::new(bookings, references.clone(), clock);

        info!(db_path = %db.path().display(), timezone = %config.business.timezone, "application context ready");

        Ok(Self {
            config,
            db,
            lifecycle: Arc::new(lifecycle),
            appointments: Arc::new(appointments),
            references,
        })
    }

    /// Database reachable and schema applied.
    pub fn health_check(&self) -> Result<()> {
        self.db.health_check()
    }
}
