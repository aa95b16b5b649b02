//! Shared infrastructure for end-to-end tests
//!
//! - Maven-layout mock repositories served over `file://` or httpmock
//! - A test environment wiring a local repository into a session
//! - Event collection

#![allow(dead_code)]

pub mod repo_simulation;
pub mod test_helpers;

pub use repo_simulation::{MockRepository, Pom};
pub use test_helpers::{file_names, EventCollector, TestEnvironment};
