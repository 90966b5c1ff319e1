//! Shared E2E test helpers.
//!
//! Provides a recording package manager, a scripted URL probe,
//! and builders for plans and the component stack.

pub mod plans;
