//! Infrastructure error conversions

pub mod conversions;

pub use conversions::InfraError;

use cadence_domain::CadenceError;

/// Convert any foreign error with an [`InfraError`] mapping into the domain error.
pub(crate) fn to_domain<E>(err: E) -> CadenceError
where
    InfraError: From<E>,
{
    InfraError::from(err).into()
}
