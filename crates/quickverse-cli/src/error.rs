//! CLI error handling.

use std::process::ExitCode;

use quickverse_common_config::ConfigError;
use quickverse_common_log::LogError;
use thiserror::Error;

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{message}")]
    Config {
        message: String,
        #[source]
        source: Option<ConfigError>,
        hint: Option<String>,
    },

    #[error("{0}")]
    Sdk(#[from] quickverse_sdk::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Log(#[from] LogError),
}

impl From<ConfigError> for CliError {
    fn from(source: ConfigError) -> Self {
        Self::Config {
            message: format!("failed to load configuration: {source}"),
            source: Some(source),
            hint: Some("check .quickverse/config.yaml and QUICKVERSE_* variables".to_string()),
        }
    }
}

impl CliError {
    /// Short stable code printed alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config { .. } => "E001",
            Self::Sdk(quickverse_sdk::Error::Unconfigured { .. }) => "E002",
            Self::Sdk(_) => "E003",
            Self::Io(_) | Self::Json(_) => "E004",
            Self::Log(_) => "E005",
        }
    }

    /// Numeric exit status for this error.
    pub fn status(&self) -> u8 {
        match self {
            Self::Config { .. } => 2,
            Self::Sdk(quickverse_sdk::Error::Unconfigured { .. }) => 2,
            Self::Io(_) | Self::Json(_) => 3,
            Self::Sdk(_) => 4,
            Self::Log(_) => 1,
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.status())
    }

    /// Follow-up advice, if any.
    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::Config { hint, .. } => hint.as_deref(),
            Self::Sdk(quickverse_sdk::Error::Unconfigured { .. }) => {
                Some("set QUICKVERSE_API_KEY and QUICKVERSE_PACKAGE_NAME, or add them to .quickverse/config.yaml")
            }
            Self::Sdk(e) if e.is_retryable() => Some("the request can be retried"),
            _ => None,
        }
    }

    /// Message with code and hint, as printed to stderr.
    pub fn render(&self) -> String {
        match self.hint() {
            Some(hint) => format!("error[{}]: {self}\n  hint: {hint}", self.code()),
            None => format!("error[{}]: {self}", self.code()),
        }
    }
}
