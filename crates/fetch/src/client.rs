//! The orchestration shared by every codec-based strategy.
//!
//! [`FetchClient::execute`] builds a request, invokes the [`Exchange`] port
//! exactly once, classifies the outcome, and decodes the body. It never
//! retries, caches, or deduplicates: calling it twice issues two requests.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info_span, warn, Instrument};

use crate::{
    Codec, Endpoint, ExchangeRequest, FetchError, HttpMethod, InvocationId, RawResponse,
    TransportError,
};

/// Header carrying the [`InvocationId`] of the cycle that issued a request.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// The request/response exchange collaborator.
///
/// Implementations carry the request to the remote endpoint and return
/// whatever came back, success or not. Classification of the status happens
/// in [`FetchClient`]; an `Err` here means the exchange itself failed.
#[async_trait]
pub trait Exchange: Send + Sync {
    /// Performs one exchange.
    async fn exchange(&self, request: ExchangeRequest) -> Result<RawResponse, TransportError>;
}

/// Codec-agnostic orchestration over an [`Exchange`].
#[derive(Clone)]
pub struct FetchClient {
    exchange: Arc<dyn Exchange>,
}

impl FetchClient {
    /// Creates a client over `exchange`.
    pub fn new(exchange: Arc<dyn Exchange>) -> Self {
        Self { exchange }
    }

    /// Runs one invocation cycle.
    ///
    /// `payload` is encoded with `codec` when present; pass `None` to send no
    /// body. An empty `endpoint` or an encoding failure returns before the
    /// exchange is contacted.
    pub async fn execute<C: Codec>(
        &self,
        endpoint: &str,
        method: HttpMethod,
        payload: Option<&C::Request>,
        codec: &C,
    ) -> Result<C::Response, FetchError> {
        let invocation_id = InvocationId::new_random();
        let span = info_span!(
            "fetch.invoke",
            %invocation_id,
            endpoint,
            %method,
            content_type = %codec.content_type()
        );

        async move {
            let result = self
                .run(invocation_id, endpoint, method, payload, codec)
                .await;
            match &result {
                Ok(_) => debug!("invocation succeeded"),
                Err(err) => warn!(error = %err, class = ?err.class(), "invocation failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run<C: Codec>(
        &self,
        invocation_id: InvocationId,
        endpoint: &str,
        method: HttpMethod,
        payload: Option<&C::Request>,
        codec: &C,
    ) -> Result<C::Response, FetchError> {
        let endpoint = Endpoint::new(endpoint)
            .ok_or_else(|| TransportError::unknown("endpoint must not be empty"))?;
        let body = payload.map(|p| codec.encode(p)).transpose()?;

        let marker = codec.content_type().as_str().to_string();
        let headers = BTreeMap::from([
            ("accept".to_string(), marker.clone()),
            ("content-type".to_string(), marker),
            (REQUEST_ID_HEADER.to_string(), invocation_id.to_string()),
        ]);

        let response = self
            .exchange
            .exchange(ExchangeRequest {
                endpoint,
                method,
                headers,
                body,
            })
            .await?;

        if !response.is_success() {
            return Err(TransportError::rejected(response.status, response.status_text).into());
        }
        debug!(status = response.status, bytes = response.body.len(), "response received");

        codec.decode(&response.body)
    }
}

impl std::fmt::Debug for FetchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchClient").finish_non_exhaustive()
    }
}
