//! Error types for the QuickVerse SDK.

use crate::gateway::GatewayError;
use std::fmt;
use thiserror::Error;

/// Why a network operation could not be attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnconfiguredReason {
    /// `configure` was never called.
    NotConfigured,
    /// The API key is empty.
    MissingApiKey,
    /// The package name is empty.
    MissingPackageName,
}

impl fmt::Display for UnconfiguredReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Self::NotConfigured => "configure() must be called with your API key and package name first",
            Self::MissingApiKey => "API key not provided; configure the SDK with your key from https://quickverse.io",
            Self::MissingPackageName => "package name not provided; configure the SDK with your app's package name",
        };
        f.write_str(message)
    }
}

/// The SDK error type.
#[derive(Error, Debug)]
pub enum Error {
    /// No usable credential. Caller error; retrying without reconfiguring
    /// cannot succeed.
    #[error("QuickVerse is not configured: {reason}")]
    Unconfigured { reason: UnconfiguredReason },

    /// The localization fetch failed. The store is unchanged and the caller
    /// may retry.
    #[error("localization fetch unsuccessful: {0}")]
    FetchFailed(#[source] GatewayError),

    /// A usage report was rejected or never arrived. Only ever logged by the
    /// usage aggregator; public operations do not return it.
    #[error("usage report unsuccessful: {0}")]
    ReportFailed(#[source] GatewayError),

    /// The network gateway could not be constructed.
    #[error("failed to set up network gateway: {0}")]
    Setup(#[source] GatewayError),
}

impl Error {
    /// Shorthand for [`Error::Unconfigured`].
    pub fn unconfigured(reason: UnconfiguredReason) -> Self {
        Self::Unconfigured { reason }
    }

    /// True for errors the caller can recover from by retrying the same call.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::FetchFailed(_) | Self::ReportFailed(_))
    }
}

/// Result type alias using the SDK error.
pub type Result<T> = std::result::Result<T, Error>;
