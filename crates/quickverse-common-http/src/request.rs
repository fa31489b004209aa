//! Request headers and URL construction.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use url::Url;

/// Header names and values the QuickVerse service expects.
pub mod headers {
    pub const CONTENT_TYPE_JSON: &str = "application/json";
    pub const PLATFORM: &str = "platform";
    pub const PLATFORM_RUST: &str = "Rust";
    pub const SDK_VERSION: &str = "x_quickverse_version";
    pub const DEVICE_ID: &str = "x-quickverse-deviceid";
}

/// URL construction errors.
#[derive(Debug, thiserror::Error)]
pub enum UrlError {
    #[error("invalid base URL: {0}")]
    Parse(#[from] url::ParseError),

    #[error("base URL cannot carry path segments: {0}")]
    CannotBeABase(String),
}

/// Accumulates the headers shared by every request and resolves endpoint URLs
/// against a base.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    headers: HeaderMap,
    base_url: Url,
}

impl RequestBuilder {
    /// Create a builder rooted at `base_url`.
    pub fn new(base_url: &str) -> Result<Self, UrlError> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(UrlError::CannotBeABase(base_url.to_string()));
        }
        Ok(Self {
            headers: HeaderMap::new(),
            base_url,
        })
    }

    /// Add a header. Names or values that are not valid HTTP tokens are ignored.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name.as_ref()),
            HeaderValue::try_from(value.as_ref()),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Add bearer token authorization.
    pub fn bearer_auth(mut self, token: impl AsRef<str>) -> Self {
        if let Ok(mut value) = HeaderValue::try_from(format!("Bearer {}", token.as_ref())) {
            value.set_sensitive(true);
            self.headers.insert(AUTHORIZATION, value);
        }
        self
    }

    /// Set content type to JSON.
    pub fn json_content(mut self) -> Self {
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(headers::CONTENT_TYPE_JSON));
        self
    }

    /// Get the built headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Append percent-encoded path segments to the base URL.
    ///
    /// A trailing slash on the base is treated as a directory, so
    /// `https://host/api/` + `["report"]` gives `https://host/api/report`.
    pub fn url(&self, segments: &[&str]) -> Result<Url, UrlError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| UrlError::CannotBeABase(self.base_url.to_string()))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }
}
