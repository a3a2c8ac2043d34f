//! Request/response exchange adapter.
//!
//! Implements the [`fetch::Exchange`] trait over `reqwest`. The JSON and
//! binary strategies in [`fetch`] both run on top of this exchange; they only
//! differ in the codec and content marker they hand it.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Connection handling, TLS and timeouts live here (all
//! inherited from `reqwest`). Status classification and decoding do not: the
//! exchange returns whatever came back and [`fetch::FetchClient`] decides
//! what it means.

use std::error::Error as _;
use std::time::Duration;

use async_trait::async_trait;
use fetch::{canonical_reason, Exchange, ExchangeRequest, HttpMethod, RawResponse, TransportError};
use hyper::ext::ReasonPhrase;
use thiserror::Error;
use tracing::debug;

/// Default request timeout, matching the application's API timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Settings for the underlying HTTP client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeConfig {
    /// Whole-request timeout.
    pub timeout: Duration,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// The HTTP client could not be constructed.
#[derive(Debug, Error)]
#[error("Failed to build HTTP client: {0}")]
pub struct ExchangeBuildError(#[from] reqwest::Error);

/// [`Exchange`] over a `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestExchange {
    client: reqwest::Client,
}

impl ReqwestExchange {
    /// Builds a client from `config`.
    pub fn new(config: &ExchangeConfig) -> Result<Self, ExchangeBuildError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }

    /// Wraps an existing client.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn to_reqwest(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

/// The reason phrase the server sent, or the registered phrase for the status
/// when the server sent the canonical one (hyper only records non-canonical
/// phrases) or none at all.
fn status_text(response: &reqwest::Response) -> String {
    response
        .extensions()
        .get::<ReasonPhrase>()
        .and_then(|reason| std::str::from_utf8(reason.as_bytes()).ok())
        .or_else(|| canonical_reason(response.status().as_u16()))
        .unwrap_or_default()
        .to_string()
}

/// Flattens a reqwest error and its sources into one message.
fn describe(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[async_trait]
impl Exchange for ReqwestExchange {
    async fn exchange(&self, request: ExchangeRequest) -> Result<RawResponse, TransportError> {
        let mut builder = self
            .client
            .request(to_reqwest(request.method), request.endpoint.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::unknown(describe(&e)))?;

        let status = response.status();
        let status_text = status_text(&response);
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::unknown(describe(&e)))?;

        debug!(status = status.as_u16(), bytes = body.len(), "exchange completed");
        Ok(RawResponse::new(status.as_u16(), status_text, body.to_vec()))
    }
}
