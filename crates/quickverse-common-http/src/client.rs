//! HTTP client configuration.

use reqwest::header::HeaderMap;
use reqwest::{Client, ClientBuilder, StatusCode};
use std::time::Duration;
use url::Url;

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Whole-request timeout. A request exceeding it fails with [`HttpError::Timeout`].
    pub request_timeout: Duration,
    /// User agent string.
    pub user_agent: String,
    /// Maximum idle connections kept per host.
    pub pool_max_idle_per_host: usize,
    /// Enable gzip decompression.
    pub gzip: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            user_agent: format!("quickverse-rust/{}", env!("CARGO_PKG_VERSION")),
            pool_max_idle_per_host: 2,
            gzip: true,
        }
    }
}

/// Build a configured reqwest client.
pub fn build_client(config: &HttpConfig) -> Result<Client, HttpError> {
    ClientBuilder::new()
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout)
        .user_agent(&config.user_agent)
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .gzip(config.gzip)
        .build()
        .map_err(HttpError::ClientBuild)
}

/// HTTP errors.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("request timed out")]
    Timeout,

    #[error("rate limited (retry after {retry_after:?})")]
    RateLimited { retry_after: Option<Duration> },

    #[error("server error: {status}")]
    ServerError { status: u16, body: String },

    #[error("client error: {status}")]
    ClientError { status: u16, body: String },
}

impl HttpError {
    /// Status code carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RateLimited { .. } => Some(StatusCode::TOO_MANY_REQUESTS.as_u16()),
            Self::ServerError { status, .. } | Self::ClientError { status, .. } => Some(*status),
            Self::ClientBuild(_) | Self::Request(_) | Self::Timeout => None,
        }
    }
}

impl From<reqwest::Error> for HttpError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            HttpError::Timeout
        } else {
            HttpError::Request(e)
        }
    }
}

/// Thin wrapper around a configured reqwest client.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
}

impl HttpClient {
    /// Create a new HTTP client with default config.
    pub fn new() -> Result<Self, HttpError> {
        Self::with_config(&HttpConfig::default())
    }

    /// Create a new HTTP client with custom config.
    pub fn with_config(config: &HttpConfig) -> Result<Self, HttpError> {
        let inner = build_client(config)?;
        Ok(Self { inner })
    }

    /// Send a GET request. Non-success statuses are returned as errors.
    pub async fn get(&self, url: Url, headers: HeaderMap) -> Result<reqwest::Response, HttpError> {
        tracing::debug!(%url, "sending GET request");
        let response = self.inner.get(url.clone()).headers(headers).send().await?;
        tracing::debug!(%url, status = %response.status(), "GET response");
        Self::check_response(response).await
    }

    /// Send a POST request with a JSON body. Non-success statuses are returned as errors.
    pub async fn post_json<T: serde::Serialize + ?Sized>(
        &self,
        url: Url,
        headers: HeaderMap,
        body: &T,
    ) -> Result<reqwest::Response, HttpError> {
        tracing::debug!(%url, "sending POST request");
        let response = self
            .inner
            .post(url.clone())
            .headers(headers)
            .json(body)
            .send()
            .await?;
        tracing::debug!(%url, status = %response.status(), "POST response");
        Self::check_response(response).await
    }

    /// Check response status and convert errors.
    pub async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, HttpError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs);

            return Err(HttpError::RateLimited { retry_after });
        }

        let body = response.text().await.unwrap_or_default();

        if status.is_server_error() {
            Err(HttpError::ServerError {
                status: status.as_u16(),
                body,
            })
        } else {
            Err(HttpError::ClientError {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HttpConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("quickverse-rust/"));
        assert!(config.gzip);
    }

    #[test]
    fn test_client_with_custom_config() {
        let config = HttpConfig {
            connect_timeout: Duration::from_secs(1),
            request_timeout: Duration::from_secs(2),
            user_agent: "test-agent".to_string(),
            pool_max_idle_per_host: 1,
            gzip: false,
        };

        assert!(HttpClient::with_config(&config).is_ok());
    }

    #[test]
    fn test_error_status() {
        assert_eq!(HttpError::Timeout.status(), None);
        assert_eq!(HttpError::RateLimited { retry_after: None }.status(), Some(429));
        let err = HttpError::ServerError {
            status: 503,
            body: String::new(),
        };
        assert_eq!(err.status(), Some(503));
    }
}
