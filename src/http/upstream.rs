//! Client for the upstream page platform.
//!
//! # Responsibilities
//! - Fetch client bundles for host rebranding
//! - Forward platform API calls as JSON POSTs
//! - Forward page requests with the caller's method, headers and body
//!
//! # Design Decisions
//! - One pooled `reqwest::Client` shared by all requests
//! - Redirects are passed through to the caller, never followed
//! - Timeouts map to 504, every other failure to 502

use axum::http::header::{self, HeaderMap, HeaderValue};
use axum::http::{Method, StatusCode};
use bytes::Bytes;
use std::time::Duration;
use thiserror::Error;

use crate::config::UpstreamConfig;

pub const API_CONTENT_TYPE: &str = "application/json;charset=UTF-8";

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream timed out")]
    Timeout,

    #[error("upstream request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("invalid upstream header value: {0}")]
    InvalidHeader(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            UpstreamError::Timeout
        } else {
            UpstreamError::Request(e)
        }
    }
}

impl UpstreamError {
    /// Status returned to the client for this failure.
    pub fn status(&self) -> StatusCode {
        match self {
            UpstreamError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::BAD_GATEWAY,
        }
    }
}

pub struct UpstreamClient {
    client: reqwest::Client,
    base_url: String,
    user_agent: HeaderValue,
    public_page_data_path: String,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig, timeout: Duration) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(UpstreamError::Request)?;
        let user_agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|_| UpstreamError::InvalidHeader(config.user_agent.clone()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            user_agent,
            public_page_data_path: config.public_page_data_path.clone(),
        })
    }

    /// Absolute upstream URL for a request path and query.
    pub fn url_for(&self, path_and_query: &str) -> String {
        format!("{}{}", self.base_url, path_and_query)
    }

    pub async fn fetch_asset(&self, path_and_query: &str) -> Result<reqwest::Response, UpstreamError> {
        let response = self.client.get(self.url_for(path_and_query)).send().await?;
        Ok(response)
    }

    /// Forward an API call. The public page data endpoint is sent without a
    /// body; every other call carries the caller's body.
    pub async fn forward_api(
        &self,
        path: &str,
        path_and_query: &str,
        body: Bytes,
    ) -> Result<reqwest::Response, UpstreamError> {
        let mut request = self
            .client
            .post(self.url_for(path_and_query))
            .header(header::CONTENT_TYPE, HeaderValue::from_static(API_CONTENT_TYPE))
            .header(header::USER_AGENT, self.user_agent.clone());
        if !path.starts_with(&self.public_page_data_path) {
            request = request.body(body);
        }
        Ok(request.send().await?)
    }

    pub async fn forward_page(
        &self,
        method: Method,
        headers: HeaderMap,
        path_and_query: &str,
        body: Bytes,
    ) -> Result<reqwest::Response, UpstreamError> {
        let mut request = self
            .client
            .request(method, self.url_for(path_and_query))
            .headers(headers);
        if !body.is_empty() {
            request = request.body(body);
        }
        Ok(request.send().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for_joins_without_double_slash() {
        let config = UpstreamConfig {
            base_url: "https://www.notion.so/".into(),
            ..UpstreamConfig::default()
        };
        let client = UpstreamClient::new(&config, Duration::from_secs(5)).unwrap();
        assert_eq!(
            client.url_for("/api/v3/getPublicPageData?x=1"),
            "https://www.notion.so/api/v3/getPublicPageData?x=1"
        );
    }

    #[test]
    fn test_rejects_invalid_user_agent() {
        let config = UpstreamConfig {
            user_agent: "bad\nagent".into(),
            ..UpstreamConfig::default()
        };
        assert!(matches!(
            UpstreamClient::new(&config, Duration::from_secs(5)),
            Err(UpstreamError::InvalidHeader(_))
        ));
    }

    #[test]
    fn test_error_status() {
        assert_eq!(UpstreamError::Timeout.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            UpstreamError::InvalidHeader("x".into()).status(),
            StatusCode::BAD_GATEWAY
        );
    }
}
