//! Network gateway: the two remote operations the SDK needs.

mod http;

pub use http::HttpGateway;

use crate::credential::AuthToken;
use crate::model::{LocalizationEntry, ReportBatch};
use async_trait::async_trait;
use quickverse_common_http::{HttpError, ResponseError, UrlError};

/// Gateway errors. Every variant is a failure of a single exchange.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error(transparent)]
    Response(#[from] ResponseError),

    #[error(transparent)]
    Url(#[from] UrlError),

    #[error("gateway unavailable: {0}")]
    Unavailable(String),
}

impl GatewayError {
    /// True when the exchange gave up waiting for the service.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Http(HttpError::Timeout))
    }

    /// HTTP status returned by the service, if it answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http(e) => e.status(),
            Self::Response(ResponseError::Parse { status, .. }) => Some(*status),
            _ => None,
        }
    }
}

/// Performs the remote operations given an already derived token.
///
/// Implementations resolve each call exactly once and must not retry on
/// their own: the service does not guarantee report submission is idempotent.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Fetch localizations. `language_codes` is a comma-joined preference
    /// list, most preferred first.
    async fn fetch_localizations(
        &self,
        token: &AuthToken,
        language_codes: &str,
    ) -> Result<Vec<LocalizationEntry>, GatewayError>;

    /// Submit one usage report.
    async fn submit_report(&self, token: &AuthToken, batch: &ReportBatch) -> Result<(), GatewayError>;
}
