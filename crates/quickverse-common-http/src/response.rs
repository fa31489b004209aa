//! HTTP response decoding.

use serde::de::DeserializeOwned;

/// Parse a JSON response body.
pub async fn parse_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ResponseError> {
    let status = response.status();
    let bytes = response.bytes().await.map_err(ResponseError::Read)?;

    serde_json::from_slice(&bytes).map_err(|e| ResponseError::Parse {
        status: status.as_u16(),
        body: String::from_utf8_lossy(&bytes).into_owned(),
        source: e,
    })
}

/// Response decoding errors.
#[derive(Debug, thiserror::Error)]
pub enum ResponseError {
    #[error("failed to read response body: {0}")]
    Read(#[source] reqwest::Error),

    #[error("failed to parse JSON (status {status}): {source}")]
    Parse {
        status: u16,
        body: String,
        #[source]
        source: serde_json::Error,
    },
}
