//! SQLite implementations of the storage ports

mod columns;

pub mod audit_repository;
pub mod booking_repository;
pub mod manager;
pub mod reference_repository;
pub mod series_repository;

pub use audit_repository::SqliteAuditLog;
pub use booking_repository::{import_appointment, SqliteBookingStore};
pub use manager::{DbManager, SqliteConnection, SqlitePool};
pub use reference_repository::SqliteReferenceDirectory;
pub use series_repository::SqliteSeriesRepository;
