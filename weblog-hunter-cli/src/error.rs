//! CLI-specific error types and exit code mapping

use weblog_hunter_core::error::HunterError;
use weblog_hunter_engine::EngineError;

/// CLI-specific error type.
///
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// The signature catalog could not be built.
    #[error("signature catalog error: {0}")]
    Catalog(String),

    /// Ingest or analysis failed for a reason other than configuration.
    #[error("analysis error: {0}")]
    Analysis(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (report write, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from weblog-hunter-core.
    #[error("{0}")]
    Core(#[from] HunterError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                      |
    /// |------|------------------------------|
    /// | 0    | Success                      |
    /// | 1    | General / command error      |
    /// | 2    | Configuration error          |
    /// | 3    | Signature catalog error      |
    /// | 10   | IO error                     |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Core(HunterError::Config(_)) => 2,
            Self::Catalog(_) => 3,
            Self::Io(_) | Self::Core(HunterError::Io(_)) => 10,
            Self::JsonSerialize(_) | Self::Command(_) | Self::Analysis(_) | Self::Core(_) => 1,
        }
    }
}

impl From<EngineError> for CliError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Signature { .. } | EngineError::Regex(_) => Self::Catalog(e.to_string()),
            EngineError::Config { .. } => Self::Config(e.to_string()),
            EngineError::Io(io) => Self::Io(io),
            other => Self::Analysis(other.to_string()),
        }
    }
}
