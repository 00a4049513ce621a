//! Conversions from external infrastructure errors into domain errors.

use cadence_domain::CadenceError;
use r2d2::Error as PoolError;
use rusqlite::Error as SqlError;
use serde_json::Error as JsonError;
use tokio::task::JoinError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub CadenceError);

impl From<InfraError> for CadenceError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<CadenceError> for InfraError {
    fn from(value: CadenceError) -> Self {
        Self(value)
    }
}

trait IntoCadenceError {
    fn into_cadence(self) -> CadenceError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → CadenceError */
/* -------------------------------------------------------------------------- */

impl IntoCadenceError for SqlError {
    fn into_cadence(self) -> CadenceError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => CadenceError::Database("database is busy".into()),
                    (ErrorCode::DatabaseLocked, _) => {
                        CadenceError::Database("database is locked".into())
                    }
                    // SQLITE_CONSTRAINT_UNIQUE / SQLITE_CONSTRAINT_PRIMARYKEY
                    (ErrorCode::ConstraintViolation, 2067 | 1555) => {
                        CadenceError::Database(format!("unique constraint violation: {message}"))
                    }
                    (ErrorCode::ConstraintViolation, 787) => {
                        CadenceError::Database(format!("foreign key constraint violation: {message}"))
                    }
                    _ => CadenceError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => CadenceError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                CadenceError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, name, ty) => {
                CadenceError::Database(format!("invalid column type for {name}: {ty}"))
            }
            RE::InvalidPath(path) => CadenceError::Database(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            other => CadenceError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        Self(value.into_cadence())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2 / serde_json / tokio → CadenceError */
/* -------------------------------------------------------------------------- */

impl From<PoolError> for InfraError {
    fn from(value: PoolError) -> Self {
        Self(CadenceError::Database(format!("connection pool: {value}")))
    }
}

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        Self(CadenceError::Database(format!("stored JSON is invalid: {value}")))
    }
}

impl From<JoinError> for InfraError {
    fn from(value: JoinError) -> Self {
        Self(CadenceError::Internal(format!("blocking task failed: {value}")))
    }
}

#[cfg(test)]
mod tests {
    use rusqlite::ffi::{Error as FfiError, ErrorCode};

    use super::*;

    fn failure(code: ErrorCode, extended_code: i32) -> SqlError {
        SqlError::SqliteFailure(FfiError { code, extended_code }, Some("boom".into()))
    }

    #[test]
    fn sqlite_busy_maps_to_database_error() {
        let mapped: CadenceError = InfraError::from(failure(ErrorCode::DatabaseBusy, 5)).into();
        match mapped {
            CadenceError::Database(msg) => assert!(msg.contains("busy")),
            other => panic!("expected database error, got {other:?}"),
        }
    }

    #[test]
    fn unique_violation_is_named() {
        let mapped: CadenceError =
            InfraError::from(failure(ErrorCode::ConstraintViolation, 2067)).into();
        assert!(matches!(mapped, CadenceError::Database(msg) if msg.contains("unique")));
    }

    #[test]
    fn no_rows_maps_to_not_found() {
        let mapped: CadenceError = InfraError::from(SqlError::QueryReturnedNoRows).into();
        assert!(matches!(mapped, CadenceError::NotFound(_)));
    }

    #[test]
    fn bad_json_maps_to_database_error() {
        let err = serde_json::from_str::<serde_json::Value>("{nope").unwrap_err();
        let mapped: CadenceError = InfraError::from(err).into();
        assert!(matches!(mapped, CadenceError::Database(_)));
    }
}
