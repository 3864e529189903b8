//! Command errors and their exit codes.

use crate::config::ConfigError;
use crate::exit_codes::ExitCode;
use deconfig_core::DeconfigError;
use deconfig_store::StoreError;
use thiserror::Error;

/// Errors surfaced by a CLI command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Deconfig(#[from] DeconfigError),

    #[error("record not found: {0}")]
    NotFound(String),

    #[error("redaction is disabled; '{0}' needs a deconfig-wrapped export store")]
    RedactionDisabled(&'static str),

    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),

    #[error("failed to render output: {0}")]
    Render(String),
}

impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        CliError::Deconfig(err.into())
    }
}

impl CliError {
    /// Exit code reported for this error.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            CliError::Config(_) | CliError::RedactionDisabled(_) => ExitCode::ConfigError,
            CliError::Deconfig(err) if err.is_violation() => ExitCode::Violations,
            CliError::Deconfig(_) | CliError::Output(_) => ExitCode::IoError,
            CliError::NotFound(_) => ExitCode::ArgsError,
            CliError::Render(_) => ExitCode::InternalError,
        }
    }
}
