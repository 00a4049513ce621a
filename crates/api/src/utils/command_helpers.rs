//! Timing and logging wrapper shared by every command function.

use std::future::Future;
use std::time::Instant;

use cadence_domain::Result as DomainResult;
use tracing::debug;

use crate::utils::logging::{error_label, log_command_execution};

/// Run `command_fn`, then log its duration and outcome under `command_name`.
pub async fn execute_with_logging<F, Fut, T>(command_name: &str, command_fn: F) -> DomainResult<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = DomainResult<T>>,
{
    let start = Instant::now();
    let result = command_fn().await;

    log_command_execution(command_name, start.elapsed(), result.is_ok());
    if let Err(err) = &result {
        debug!(command = command_name, error_type = error_label(err), error = %err, "command failed");
    }
    result
}

#[cfg(test)]
mod tests {
    use cadence_domain::CadenceError;

    use super::*;

    #[test]
    fn passes_results_through_unchanged() {
        let ok = tokio_test::block_on(execute_with_logging("test::ok", || async {
            Ok::<_, CadenceError>(7)
        }));
        assert_eq!(ok, Ok(7));

        let err = tokio_test::block_on(execute_with_logging("test::err", || async {
            Err::<u8, _>(CadenceError::NotFound("thing".into()))
        }));
        assert_eq!(err, Err(CadenceError::NotFound("thing".into())));
    }
}
