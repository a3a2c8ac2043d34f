//! Scripted [`Exchange`] doubles shared by the integration suites.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fetch::{Exchange, ExchangeRequest, FetchClient, RawResponse, TransportError};
use tokio::sync::Notify;

/// How a [`ScriptedExchange`] answers.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Always return this outcome.
    Fixed(Result<RawResponse, TransportError>),
    /// Return 200 with the request body as the response body.
    Echo,
    /// Return 200 with `{"token":"<endpoint>"}`.
    EndpointToken,
}

/// Records every request and answers according to its [`Reply`].
#[derive(Debug)]
pub struct ScriptedExchange {
    reply: Reply,
    requests: Mutex<Vec<ExchangeRequest>>,
    gate: Option<(String, Arc<Notify>)>,
}

impl ScriptedExchange {
    pub fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            requests: Mutex::new(Vec::new()),
            gate: None,
        })
    }

    pub fn ok(body: &str) -> Arc<Self> {
        Self::new(Reply::Fixed(Ok(RawResponse::new(200, "OK", body.as_bytes()))))
    }

    /// Requests to `endpoint` wait for `gate` before answering.
    pub fn gated(reply: Reply, endpoint: &str, gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self {
            reply,
            requests: Mutex::new(Vec::new()),
            gate: Some((endpoint.to_string(), gate)),
        })
    }

    pub fn requests(&self) -> Vec<ExchangeRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Exchange for ScriptedExchange {
    async fn exchange(&self, request: ExchangeRequest) -> Result<RawResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());

        if let Some((endpoint, gate)) = &self.gate {
            if request.endpoint.as_str() == endpoint {
                gate.notified().await;
            }
        }

        match &self.reply {
            Reply::Fixed(outcome) => outcome.clone(),
            Reply::Echo => Ok(RawResponse::new(200, "OK", request.body.unwrap_or_default())),
            Reply::EndpointToken => Ok(RawResponse::new(
                200,
                "OK",
                format!(r#"{{"token":"{}"}}"#, request.endpoint).into_bytes(),
            )),
        }
    }
}

pub fn client(exchange: &Arc<ScriptedExchange>) -> FetchClient {
    FetchClient::new(exchange.clone())
}
