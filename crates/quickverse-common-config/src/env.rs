//! Environment variable handling.

use std::env;
use thiserror::Error;

/// Environment variable errors.
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },
}

/// Environment variable names.
pub mod vars {
    pub const API_KEY: &str = "QUICKVERSE_API_KEY";
    pub const PACKAGE_NAME: &str = "QUICKVERSE_PACKAGE_NAME";
    pub const BASE_URL: &str = "QUICKVERSE_BASE_URL";
    pub const DEBUG: &str = "QUICKVERSE_DEBUG";
    pub const DEVICE_ID: &str = "QUICKVERSE_DEVICE_ID";
    pub const REQUEST_TIMEOUT: &str = "QUICKVERSE_REQUEST_TIMEOUT_SECS";
    pub const CONFIG_PATH: &str = "QUICKVERSE_CONFIG";
}

/// Access to the process environment.
pub struct Environment {
    _guard: (),
}

impl Environment {
    /// Load `.env` then `.env.local` from the working directory.
    ///
    /// Missing files are not an error. Variables already set in the process
    /// are never overwritten.
    pub fn init() -> Self {
        for file in [".env", ".env.local"] {
            match dotenvy::from_filename(file) {
                Ok(path) => tracing::debug!(path = %path.display(), "loaded environment file"),
                Err(e) if e.not_found() => {}
                Err(e) => tracing::warn!(file, error = %e, "ignoring unreadable environment file"),
            }
        }

        Self { _guard: () }
    }

    /// Get an optional string variable. Empty values count as unset.
    pub fn get(var: &str) -> Option<String> {
        env::var(var).ok().filter(|v| !v.trim().is_empty())
    }

    /// Get a boolean variable.
    pub fn get_bool(var: &str) -> Option<bool> {
        Self::get(var).map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
    }

    /// Get an integer variable.
    pub fn get_int<T: std::str::FromStr>(var: &str) -> Result<Option<T>, EnvError> {
        match Self::get(var) {
            Some(v) => v.trim().parse().map(Some).map_err(|_| EnvError::InvalidValue {
                var: var.to_string(),
                message: format!("expected integer, got {v:?}"),
            }),
            None => Ok(None),
        }
    }
}
