//! Posting update requests to the interview server.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, warn};
use url::Url;

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::response::{InterviewStateResponse, UpdateRequest};

/// Sends one update request and returns the server's next response.
#[async_trait]
pub trait InterviewTransport: Send + Sync {
    async fn post_update(
        &self,
        update_url: &str,
        request: &UpdateRequest,
    ) -> Result<InterviewStateResponse, SessionError>;
}

/// JSON-over-HTTP transport.
///
/// Relative update URLs are resolved against the configured base URL.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Option<Url>,
}

impl HttpTransport {
    pub fn new(config: &SessionConfig) -> Result<Self, SessionError> {
        let base_url = config
            .base_url
            .as_deref()
            .map(|raw| {
                Url::parse(raw).map_err(|source| SessionError::InvalidUrl {
                    url: raw.to_string(),
                    source,
                })
            })
            .transpose()?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|err| SessionError::transport("failed to build HTTP client", err))?;
        Ok(Self { client, base_url })
    }

    pub fn with_client(client: reqwest::Client, base_url: Option<Url>) -> Self {
        Self { client, base_url }
    }

    /// Absolute URL for an update URL.
    pub fn resolve(&self, update_url: &str) -> Result<Url, SessionError> {
        let invalid = |source| SessionError::InvalidUrl {
            url: update_url.to_string(),
            source,
        };
        match Url::parse(update_url) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => match &self.base_url {
                Some(base) => base.join(update_url).map_err(invalid),
                None => Err(invalid(url::ParseError::RelativeUrlWithoutBase)),
            },
            Err(source) => Err(invalid(source)),
        }
    }
}

#[async_trait]
impl InterviewTransport for HttpTransport {
    async fn post_update(
        &self,
        update_url: &str,
        request: &UpdateRequest,
    ) -> Result<InterviewStateResponse, SessionError> {
        let url = self.resolve(update_url)?;
        let response = self
            .client
            .post(url.clone())
            .json(request)
            .send()
            .await
            .map_err(|err| SessionError::transport(format!("POST {url} failed"), err))?;

        let status = response.status();
        debug!(status = %status, url = %url, "update response received");
        let body = response
            .text()
            .await
            .map_err(|err| SessionError::transport(format!("reading body from {url} failed"), err))?;

        if !status.is_success() {
            warn!(status = %status, url = %url, "update request failed");
            return Err(status_error(status, body));
        }
        Ok(serde_json::from_str(&body)?)
    }
}

fn status_error(status: StatusCode, body: String) -> SessionError {
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => SessionError::Rejected {
            status: status.as_u16(),
            body,
        },
        StatusCode::CONFLICT => SessionError::Expired,
        _ => SessionError::Status {
            status: status.as_u16(),
            body,
        },
    }
}
