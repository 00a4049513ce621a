//! Shared test helpers for `cadence-core` integration tests.
//!
//! Mocks for every port plus a [`fixtures::Harness`] that wires them into
//! the services, so scenario tests can focus on behaviour.

#![allow(dead_code)]

pub mod fixtures;
pub mod repositories;
