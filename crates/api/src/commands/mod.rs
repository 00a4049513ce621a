//! Command surface
//!
//! Each operation is an async function taking the [`AppContext`](crate::context::AppContext);
//! [`dispatch`] maps the JSON-lines protocol onto them.

pub mod appointments;
pub mod dispatch;
pub mod health;
pub mod references;
pub mod series;

pub use dispatch::{dispatch, handle_line, Command, ErrorBody, Response};
