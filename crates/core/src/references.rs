//! Existence and activity checks for referenced entities

use cadence_domain::{CadenceError, ClientRef, Result, ServiceRef, StaffRef};

use crate::reference_ports::ReferenceDirectory;

/// Referenced client, service and staff member of a booking or series.
#[derive(Debug, Clone)]
pub struct ResolvedReferences {
    pub client: ClientRef,
    pub service: ServiceRef,
    pub staff: StaffRef,
}

pub async fn existing_client(directory: &dyn ReferenceDirectory, id: &str) -> Result<ClientRef> {
    directory.client(id).await?.ok_or_else(|| CadenceError::NotFound(format!("client {id}")))
}

pub async fn existing_service(directory: &dyn ReferenceDirectory, id: &str) -> Result<ServiceRef> {
    directory.service(id).await?.ok_or_else(|| CadenceError::NotFound(format!("service {id}")))
}

pub async fn existing_staff(directory: &dyn ReferenceDirectory, id: &str) -> Result<StaffRef> {
    directory.staff(id).await?.ok_or_else(|| CadenceError::NotFound(format!("staff member {id}")))
}

pub async fn active_staff(directory: &dyn ReferenceDirectory, id: &str) -> Result<StaffRef> {
    let staff = existing_staff(directory, id).await?;
    if !staff.is_active {
        return Err(CadenceError::InactiveReference(format!("staff member {id}")));
    }
    Ok(staff)
}

/// Resolve all three references; with `require_active`, disabled entities
/// fail with [`CadenceError::InactiveReference`].
pub async fn resolve(
    directory: &dyn ReferenceDirectory,
    client_id: &str,
    service_id: &str,
    staff_id: &str,
    require_active: bool,
) -> Result<ResolvedReferences> {
    let client = existing_client(directory, client_id).await?;
    let service = existing_service(directory, service_id).await?;
    let staff = existing_staff(directory, staff_id).await?;

    if require_active {
        if !client.is_active {
            return Err(CadenceError::InactiveReference(format!("client {client_id}")));
        }
        if !service.is_active {
            return Err(CadenceError::InactiveReference(format!("service {service_id}")));
        }
        if !staff.is_active {
            return Err(CadenceError::InactiveReference(format!("staff member {staff_id}")));
        }
    }
    Ok(ResolvedReferences { client, service, staff })
}
