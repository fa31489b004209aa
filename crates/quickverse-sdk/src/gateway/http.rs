//! HTTP implementation of the gateway.

use super::{Gateway, GatewayError};
use crate::credential::AuthToken;
use crate::model::{LocalizationEntry, ReportBatch};
use async_trait::async_trait;
use quickverse_common_config::ClientConfig;
use quickverse_common_http::{headers, parse_json, HttpClient, HttpConfig, RequestBuilder};
use quickverse_common_log::spans::Timer;
use reqwest::header::HeaderMap;
use serde::Deserialize;

const LOCALISATION_PATH: &str = "localisation";
const REPORT_PATH: &str = "report";

#[derive(Debug, Deserialize)]
struct LocalizationResponse {
    data: LocalizationData,
}

#[derive(Debug, Deserialize)]
struct LocalizationData {
    localisations: Vec<LocalizationEntry>,
}

/// Talks to the QuickVerse REST API.
///
/// `GET {base}/localisation/{codes}` returns
/// `{"data": {"localisations": [...]}}`; `POST {base}/report` takes a
/// [`ReportBatch`] as JSON. A 2xx body without that shape is a failure.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: HttpClient,
    requests: RequestBuilder,
}

impl HttpGateway {
    /// Gateway with default timeouts.
    pub fn new(base_url: &str) -> Result<Self, GatewayError> {
        Self::with_config(base_url, &HttpConfig::default(), None)
    }

    /// Gateway with explicit HTTP settings and an optional device id header.
    pub fn with_config(
        base_url: &str,
        http: &HttpConfig,
        device_id: Option<&str>,
    ) -> Result<Self, GatewayError> {
        let mut requests = RequestBuilder::new(base_url)?
            .json_content()
            .header(headers::PLATFORM, headers::PLATFORM_RUST)
            .header(headers::SDK_VERSION, env!("CARGO_PKG_VERSION"));
        if let Some(device_id) = device_id {
            requests = requests.header(headers::DEVICE_ID, device_id);
        }

        Ok(Self {
            client: HttpClient::with_config(http)?,
            requests,
        })
    }

    /// Gateway built from a loaded client configuration.
    pub fn from_config(config: &ClientConfig) -> Result<Self, GatewayError> {
        let http = HttpConfig {
            connect_timeout: config.connect_timeout(),
            request_timeout: config.request_timeout(),
            ..HttpConfig::default()
        };
        Self::with_config(&config.base_url, &http, config.device_id.as_deref())
    }

    fn headers(&self, token: &AuthToken) -> HeaderMap {
        self.requests.clone().bearer_auth(token.expose()).headers().clone()
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn fetch_localizations(
        &self,
        token: &AuthToken,
        language_codes: &str,
    ) -> Result<Vec<LocalizationEntry>, GatewayError> {
        let timer = Timer::start("fetch_localizations");
        let url = self.requests.url(&[LOCALISATION_PATH, language_codes])?;
        let response = self.client.get(url, self.headers(token)).await?;
        let body: LocalizationResponse = parse_json(response).await?;
        timer.finish();
        Ok(body.data.localisations)
    }

    async fn submit_report(&self, token: &AuthToken, batch: &ReportBatch) -> Result<(), GatewayError> {
        let timer = Timer::start("submit_report");
        let url = self.requests.url(&[REPORT_PATH])?;
        self.client.post_json(url, self.headers(token), batch).await?;
        timer.finish();
        Ok(())
    }
}
