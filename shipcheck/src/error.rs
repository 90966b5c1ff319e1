//! CLI-specific error types and exit code mapping

use shipcheck_core::error::ShipcheckError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration or process contract failure (missing env var, bad flag value).
    #[error("configuration error: {0}")]
    Config(String),

    /// At least one plan failed.
    #[error("{failed} of {total} plans failed")]
    PlansFailed { failed: usize, total: usize },

    /// JSON serialisation failed during report rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from shipcheck-core.
    #[error("{0}")]
    Core(#[from] ShipcheckError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                                   |
    /// |------|-------------------------------------------|
    /// | 0    | Success                                   |
    /// | 1    | A plan failed, or output could not be written |
    /// | 2    | Configuration error (before any plan ran) |
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 2,
            Self::Core(e) if e.is_config() => 2,
            Self::Core(_) | Self::PlansFailed { .. } | Self::JsonSerialize(_) | Self::Io(_) => 1,
        }
    }
}
