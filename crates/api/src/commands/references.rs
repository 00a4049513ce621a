//! Import of clients, services and staff
//!
//! The booking engine only reads these; the commands let an operator load
//! them from whatever system owns the data.

use cadence_domain::{CadenceError, ClientRef, Result, ServiceRef, StaffRef};

use crate::context::AppContext;
use crate::utils::command_helpers::execute_with_logging;

pub async fn save_client(ctx: &AppContext, client: ClientRef) -> Result<ClientRef> {
    execute_with_logging("references::save_client", || async {
        ctx.references.save_client(&client).await?;
        Ok::<_, CadenceError>(client)
    })
    .await
}

pub async fn save_service(ctx: &AppContext, service: ServiceRef) -> Result<ServiceRef> {
    execute_with_logging("references::save_service", || async {
        if service.duration_minutes == 0 {
            return Err(CadenceError::Validation(format!(
                "service {} must have a positive duration",
                service.id
            )));
        }
        ctx.references.save_service(&service).await?;
        Ok::<_, CadenceError>(service)
    })
    .await
}

pub async fn save_staff(ctx: &AppContext, staff: StaffRef) -> Result<StaffRef> {
    execute_with_logging("references::save_staff", || async {
        ctx.references.save_staff(&staff).await?;
        Ok::<_, CadenceError>(staff)
    })
    .await
}
