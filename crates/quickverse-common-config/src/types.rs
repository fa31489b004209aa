//! Configuration types.

use quickverse_common_secret::SecretString;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default service endpoint.
pub const DEFAULT_BASE_URL: &str = "https://quickverse.io/sdk/api/";

/// Default number of observations that makes a usage report due.
pub const DEFAULT_REPORT_THRESHOLD: usize = 4;

/// Client configuration, as found in `.quickverse/config.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// API key issued by quickverse.io.
    pub api_key: SecretString,
    /// Application identifier registered with the service.
    pub package_name: String,
    /// Service base URL.
    pub base_url: String,
    /// Connection timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Observations before a usage report is sent.
    pub report_threshold: usize,
    /// Interval for flushing pending usage regardless of the threshold.
    pub flush_interval_secs: Option<u64>,
    /// Verbose SDK diagnostics.
    pub debug: bool,
    /// Optional device identifier sent with every request.
    pub device_id: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: SecretString::default(),
            package_name: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            report_threshold: DEFAULT_REPORT_THRESHOLD,
            flush_interval_secs: None,
            debug: false,
            device_id: None,
        }
    }
}

impl ClientConfig {
    /// Connection timeout.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Whole-request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Periodic flush interval, if enabled.
    pub fn flush_interval(&self) -> Option<Duration> {
        self.flush_interval_secs.map(Duration::from_secs)
    }
}
