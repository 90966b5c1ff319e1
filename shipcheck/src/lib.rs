//! shipcheck library.
//!
//! This library exposes internal modules for integration testing.
//! In production, `shipcheck` is used as a binary (main.rs).

pub mod cli;
pub mod error;
pub mod executor;
pub mod logging;
pub mod orchestrator;
pub mod report;
pub mod runner;
