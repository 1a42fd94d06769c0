//! konvoi library crate — re-exports for integration tests.
//!
//! The primary interface is the `konvoi` binary. This lib.rs exposes the
//! engine modules so that integration tests can exercise composition,
//! cost allocation, the store contract, and the unmerge flow directly
//! without going through the CLI.

pub mod cli;
pub mod config;
pub mod depot;
pub mod error;
pub mod format;
pub mod merge;
pub mod model;
pub mod providers;
pub mod render;
pub mod route;
pub mod store;
pub mod telemetry;
