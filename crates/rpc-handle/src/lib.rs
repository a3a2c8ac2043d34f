//! Remote-procedure handle adapter.
//!
//! Implements the [`fetch::RemoteProcedure`] trait for services that expose
//! each method as a JSON endpoint at `{address}/{service}/{method}`. A handle
//! is bound to one address and one service when it is created; the method is
//! chosen per call by [`fetch::StubCall`].
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Marshaling (JSON in both directions) and the mapping of
//! failures onto the `(error, response)` callback live here. The request is
//! carried by any [`fetch::Exchange`]; [`HttpProcedure::connect`] uses the
//! reqwest exchange from `http-exchange`.
//!
//! ## Completion
//!
//! [`RemoteProcedure::invoke`] returns immediately. The callback is called
//! exactly once, from a task spawned on the current tokio runtime, or inline
//! when the request cannot even be built.

use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;

use fetch::{
    Callback, ContentType, Endpoint, Exchange, ExchangeRequest, HttpMethod, MethodName,
    ProcedureError, RawResponse, RemoteProcedure,
};
use http_exchange::{ExchangeBuildError, ExchangeConfig, ReqwestExchange};
use reqwest::Url;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// A handle could not be created.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// The service name was empty.
    #[error("Service name must not be empty")]
    MissingService,

    /// The address does not parse as an `http://` or `https://` URL with a host.
    #[error("Invalid address '{address}': expected an http:// or https:// URL")]
    InvalidAddress {
        /// The rejected address.
        address: String,
    },

    /// The underlying HTTP client could not be built.
    #[error(transparent)]
    Client(#[from] ExchangeBuildError),
}

/// JSON error body a service may return with a non-success status.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    code: Option<i32>,
}

/// A [`RemoteProcedure`] bound to one service at one address.
pub struct HttpProcedure<Req, Resp> {
    exchange: Arc<dyn Exchange>,
    address: String,
    service: String,
    _types: PhantomData<fn(Req) -> Resp>,
}

impl<Req, Resp> HttpProcedure<Req, Resp> {
    /// Binds `service` at `address` over a reqwest exchange built from `config`.
    pub fn connect(
        address: &str,
        service: &str,
        config: &ExchangeConfig,
    ) -> Result<Self, ConnectError> {
        let exchange = ReqwestExchange::new(config)?;
        Self::with_exchange(Arc::new(exchange), address, service)
    }

    /// Binds `service` at `address` over an existing exchange.
    pub fn with_exchange(
        exchange: Arc<dyn Exchange>,
        address: &str,
        service: &str,
    ) -> Result<Self, ConnectError> {
        let service = service.trim();
        if service.is_empty() {
            return Err(ConnectError::MissingService);
        }
        let address = address.trim().trim_end_matches('/');
        let usable = Url::parse(address).is_ok_and(|url| {
            matches!(url.scheme(), "http" | "https")
                && url.host_str().is_some_and(|host| !host.is_empty())
        });
        if !usable {
            return Err(ConnectError::InvalidAddress {
                address: address.to_string(),
            });
        }

        Ok(Self {
            exchange,
            address: address.to_string(),
            service: service.to_string(),
            _types: PhantomData,
        })
    }

    /// The URL `method` is served at.
    pub fn url_for(&self, method: &MethodName) -> String {
        format!("{}/{}/{}", self.address, self.service, method)
    }

    /// The bound service name.
    pub fn service(&self) -> &str {
        &self.service
    }
}

/// Maps a non-success response onto the callback's error argument.
fn error_from_response(response: &RawResponse) -> ProcedureError {
    let status = i32::from(response.status);
    if let Ok(body) = serde_json::from_slice::<ErrorBody>(&response.body) {
        return ProcedureError::new(body.message).with_code(body.code.unwrap_or(status));
    }
    let message = if response.status_text.trim().is_empty() {
        response.status.to_string()
    } else {
        response.status_text.clone()
    };
    ProcedureError::new(message).with_code(status)
}

impl<Req, Resp> RemoteProcedure for HttpProcedure<Req, Resp>
where
    Req: Serialize + Send,
    Resp: DeserializeOwned + Send + 'static,
{
    type Request = Req;
    type Response = Resp;

    fn invoke(&self, method: &MethodName, request: Req, callback: Callback<Resp>) {
        let url = self.url_for(method);
        let body = match serde_json::to_vec(&request) {
            Ok(body) => body,
            Err(err) => {
                callback(
                    Some(ProcedureError::new(format!("Failed to encode request: {err}"))),
                    None,
                );
                return;
            }
        };
        let Some(endpoint) = Endpoint::new(url) else {
            callback(Some(ProcedureError::new("empty procedure URL")), None);
            return;
        };

        let marker = ContentType::Json.as_str().to_string();
        let request = ExchangeRequest {
            endpoint,
            method: HttpMethod::Post,
            headers: BTreeMap::from([
                ("accept".to_string(), marker.clone()),
                ("content-type".to_string(), marker),
            ]),
            body: Some(body),
        };
        let exchange = Arc::clone(&self.exchange);

        tokio::spawn(async move {
            debug!(endpoint = %request.endpoint, "calling remote procedure");
            match exchange.exchange(request).await {
                Err(err) => callback(Some(ProcedureError::new(err.to_string())), None),
                Ok(response) if !response.is_success() => {
                    callback(Some(error_from_response(&response)), None)
                }
                Ok(response) => match serde_json::from_slice::<Resp>(&response.body) {
                    Ok(value) => callback(None, Some(value)),
                    Err(err) => callback(
                        Some(ProcedureError::new(format!(
                            "Failed to decode response: {err}"
                        ))),
                        None,
                    ),
                },
            }
        });
    }
}

impl<Req, Resp> std::fmt::Debug for HttpProcedure<Req, Resp> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpProcedure")
            .field("address", &self.address)
            .field("service", &self.service)
            .finish_non_exhaustive()
    }
}
