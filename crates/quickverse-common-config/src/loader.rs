//! Configuration file loading and parsing.

use crate::env::{vars, EnvError, Environment};
use crate::types::ClientConfig;
use quickverse_common_secret::SecretString;
use regex::Regex;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read config: {source}")]
    ReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("invalid YAML at line {}: {message}", line.map(|l| l.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    ParseError { line: Option<usize>, message: String },

    #[error("validation error: {message}")]
    ValidationError { message: String },

    #[error("environment variable not found: {var}")]
    EnvVarNotFound { var: String },

    #[error(transparent)]
    Env(#[from] EnvError),
}

/// Configuration loader.
pub struct ConfigLoader {
    base_path: PathBuf,
}

impl ConfigLoader {
    /// Relative location of the config file inside a project.
    pub const CONFIG_FILE: &'static str = ".quickverse/config.yaml";

    /// Create a loader for the given project directory.
    pub fn new(project_dir: impl AsRef<Path>) -> Self {
        Self {
            base_path: project_dir.as_ref().to_path_buf(),
        }
    }

    /// Load `.quickverse/config.yaml`, falling back to defaults when absent,
    /// then apply environment overrides and validate.
    pub fn load(&self) -> Result<ClientConfig, ConfigError> {
        let config_path = self.base_path.join(Self::CONFIG_FILE);

        let mut config = if config_path.exists() {
            Self::load_file(&config_path)?
        } else {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            ClientConfig::default()
        };

        Self::apply_env(&mut config)?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Load an explicit config file without environment overrides.
    pub fn load_file(path: &Path) -> Result<ClientConfig, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let contents = std::fs::read_to_string(path)?;
        let expanded = Self::expand_env_vars(&contents)?;

        serde_yaml::from_str(&expanded).map_err(|e| ConfigError::ParseError {
            line: e.location().map(|l| l.line()),
            message: e.to_string(),
        })
    }

    /// Expand environment variables in the form `${VAR}` or `${VAR:-default}`.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let mut result = content.to_string();
        let re = Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}").map_err(|e| ConfigError::ParseError {
            line: None,
            message: e.to_string(),
        })?;

        for cap in re.captures_iter(content) {
            let full_match = &cap[0];
            let var_name = &cap[1];
            let default = cap.get(2).map(|m| m.as_str());

            let value = match std::env::var(var_name) {
                Ok(v) => v,
                Err(_) => match default {
                    Some(d) => d.to_string(),
                    None => {
                        return Err(ConfigError::EnvVarNotFound {
                            var: var_name.to_string(),
                        })
                    }
                },
            };

            result = result.replace(full_match, &value);
        }

        Ok(result)
    }

    /// Override file values with `QUICKVERSE_*` variables.
    pub fn apply_env(config: &mut ClientConfig) -> Result<(), ConfigError> {
        if let Some(key) = Environment::get(vars::API_KEY) {
            config.api_key = SecretString::new(key);
        }
        if let Some(package) = Environment::get(vars::PACKAGE_NAME) {
            config.package_name = package;
        }
        if let Some(url) = Environment::get(vars::BASE_URL) {
            config.base_url = url;
        }
        if let Some(debug) = Environment::get_bool(vars::DEBUG) {
            config.debug = debug;
        }
        if let Some(device_id) = Environment::get(vars::DEVICE_ID) {
            config.device_id = Some(device_id);
        }
        if let Some(timeout) = Environment::get_int(vars::REQUEST_TIMEOUT)? {
            config.request_timeout_secs = timeout;
        }
        Ok(())
    }

    /// Validate configuration values.
    ///
    /// Credentials are not checked here; the SDK reports a missing key or
    /// package name as `Unconfigured` when a request is attempted.
    pub fn validate(config: &ClientConfig) -> Result<(), ConfigError> {
        if config.report_threshold == 0 {
            return Err(ConfigError::ValidationError {
                message: "report_threshold must be greater than 0".to_string(),
            });
        }

        if config.connect_timeout_secs == 0 || config.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError {
                message: "timeouts must be greater than 0".to_string(),
            });
        }

        if config.flush_interval_secs == Some(0) {
            return Err(ConfigError::ValidationError {
                message: "flush_interval_secs must be greater than 0".to_string(),
            });
        }

        if let Err(e) = url::Url::parse(&config.base_url) {
            return Err(ConfigError::ValidationError {
                message: format!("base_url {:?} is not a valid URL: {e}", config.base_url),
            });
        }

        Ok(())
    }
}
