//! CLI argument definitions for shipcheck.
//!
//! Uses `clap` v4 derive macros to parse command-line arguments.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use shipcheck_core::error::{ConfigError, ShipcheckError};

/// Install Helm charts and wait for their URLs to become ready, in parallel.
///
/// Every plan in the plan document runs concurrently. The first failing plan
/// cancels the rest. Requires the `JOB_NUMBER` environment variable.
#[derive(Parser, Debug)]
#[command(name = "shipcheck")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the YAML plan document.
    pub plan_file: PathBuf,

    /// Path to shipcheck.toml configuration file.
    ///
    /// Defaults plus `SHIPCHECK_*` environment variables are used when omitted.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override log format (json, pretty).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_format: Option<String>,

    /// Run report format.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Validate the plan document and configuration, then exit without running.
    #[arg(long)]
    pub validate: bool,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

/// CI job number from `JOB_NUMBER` (required, non-empty).
pub fn job_number() -> Result<String, ShipcheckError> {
    std::env::var("JOB_NUMBER")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| {
            ConfigError::MissingEnv {
                name: "JOB_NUMBER".to_owned(),
            }
            .into()
        })
}

/// GitHub Actions run id, logged when present.
pub fn github_run_id() -> Option<String> {
    std::env::var("GITHUB_RUN_ID").ok().filter(|v| !v.is_empty())
}
