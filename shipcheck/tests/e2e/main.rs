//! E2E integration tests for shipcheck.
//!
//! These tests run the Test Runner, Plan Executor and Orchestrator against
//! a fake package manager and a scripted URL probe, in paused tokio time.
//!
//! # Test Structure
//!
//! - `helpers/` -- Shared test utilities (fakes, plan builders)
//! - `scenarios/` -- Test files organized by component
//!
//! # Running
//!
//! ```bash
//! cargo test -p shipcheck --test e2e
//! ```

mod helpers;
