//! Outbound JSON API client for handlers that call external services.
//!
//! Retry and backoff policy stays with the caller; this wrapper only
//! handles URL joining, auth headers, timeouts, and status/decode error
//! mapping.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde_json::Value;
use url::Url;

use crate::error::ClientError;

/// Default request timeout when the caller does not pick one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Url,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        Self::build(base_url, timeout, None)
    }

    /// Client sending `Authorization: Bearer <token>` on every request.
    pub fn with_bearer_token(
        base_url: &str,
        timeout: Duration,
        token: &str,
    ) -> Result<Self, ClientError> {
        Self::build(base_url, timeout, Some(token))
    }

    fn build(base_url: &str, timeout: Duration, token: Option<&str>) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url).map_err(|e| ClientError::InvalidUrl {
            url: base_url.to_string(),
            message: e.to_string(),
        })?;

        let mut headers = HeaderMap::new();
        if let Some(token) = token {
            let value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| {
                ClientError::InvalidUrl {
                    url: base_url.to_string(),
                    message: format!("invalid bearer token: {e}"),
                }
            })?;
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| ClientError::InvalidUrl {
                url: base_url.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self { base_url, http })
    }

    /// Resolve `path` against the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::InvalidUrl {
                url: format!("{}{path}", self.base_url),
                message: e.to_string(),
            })
    }

    /// GET `path` with query parameters, expecting a JSON response.
    pub async fn get_json(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<Value, ClientError> {
        let url = self.endpoint(path)?;
        let response = self
            .http
            .get(url.clone())
            .query(params)
            .send()
            .await
            .map_err(|e| ClientError::Request {
                url: url.to_string(),
                source: e,
            })?;
        Self::decode(url, response).await
    }

    /// POST a JSON body to `path`, expecting a JSON response.
    pub async fn post_json(&self, path: &str, body: &Value) -> Result<Value, ClientError> {
        let url = self.endpoint(path)?;
        let response = self
            .http
            .post(url.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| ClientError::Request {
                url: url.to_string(),
                source: e,
            })?;
        Self::decode(url, response).await
    }

    async fn decode(url: Url, response: reqwest::Response) -> Result<Value, ClientError> {
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                url: url.to_string(),
                status,
            });
        }
        response.json().await.map_err(|e| ClientError::Decode {
            url: url.to_string(),
            source: e,
        })
    }
}
