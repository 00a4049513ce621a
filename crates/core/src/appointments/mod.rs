//! Single appointments and their status rules

pub mod ports;
pub mod service;
pub mod status;

pub use ports::*;
pub use service::*;
