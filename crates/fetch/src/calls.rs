//! The three interchangeable strategies behind one lifecycle.
//!
//! Each strategy implements [`RemoteCall`]: given its parameters it produces
//! a typed `Result`, and [`RemoteCall::invoke`] collapses that into a
//! [`ResultState`]. Nothing is thrown past `invoke`.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{info_span, warn, Instrument};

use crate::procedure::{call_procedure, RemoteProcedure};
use crate::{
    BinaryCodec, DeserializeFromBuffer, FetchClient, FetchError, HttpMethod, MethodName,
    ResultState, SerializeToBuffer, TextCodec,
};

/// A remote call strategy with a uniform pending → success/error lifecycle.
#[async_trait]
pub trait RemoteCall: Send + Sync + 'static {
    /// Everything that identifies one invocation cycle. A change in any of it
    /// starts a new cycle under a [`Trigger`](crate::Trigger).
    type Params: Clone + PartialEq + Send + Sync + 'static;
    /// The decoded response.
    type Output: Send + 'static;

    /// Runs one cycle and returns the typed outcome.
    async fn call(&self, params: &Self::Params) -> Result<Self::Output, FetchError>;

    /// Runs one cycle and returns the published form.
    async fn invoke(&self, params: &Self::Params) -> ResultState<Self::Output> {
        ResultState::from_result(self.call(params).await)
    }
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

/// Parameters of a [`JsonCall`].
#[derive(Debug, Clone, PartialEq)]
pub struct JsonParams<Req> {
    /// Call target.
    pub endpoint: String,
    /// HTTP method; `GET` sends no body.
    pub method: HttpMethod,
    /// Structured payload.
    pub payload: Req,
}

/// JSON text over a request/response exchange.
#[derive(Debug, Clone)]
pub struct JsonCall<Req, Resp> {
    client: FetchClient,
    codec: TextCodec<Req, Resp>,
}

impl<Req, Resp> JsonCall<Req, Resp> {
    /// Creates the strategy over `client`.
    pub fn new(client: FetchClient) -> Self {
        Self {
            client,
            codec: TextCodec::new(),
        }
    }
}

#[async_trait]
impl<Req, Resp> RemoteCall for JsonCall<Req, Resp>
where
    Req: Serialize + Clone + PartialEq + Send + Sync + 'static,
    Resp: DeserializeOwned + Send + 'static,
{
    type Params = JsonParams<Req>;
    type Output = Resp;

    async fn call(&self, params: &JsonParams<Req>) -> Result<Resp, FetchError> {
        let payload = (!params.method.is_retrieval()).then_some(&params.payload);
        self.client
            .execute(&params.endpoint, params.method, payload, &self.codec)
            .await
    }
}

// ---------------------------------------------------------------------------
// Binary
// ---------------------------------------------------------------------------

/// Parameters of a [`BinaryCall`].
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryParams<Req> {
    /// Call target.
    pub endpoint: String,
    /// Payload; serializes itself.
    pub payload: Req,
}

/// Self-serializing binary payloads, always sent with `POST`.
///
/// `Resp` is the caller-nominated response type whose
/// [`DeserializeFromBuffer`] capability decodes the raw response bytes.
#[derive(Debug, Clone)]
pub struct BinaryCall<Req, Resp> {
    client: FetchClient,
    codec: BinaryCodec<Req, Resp>,
}

impl<Req, Resp> BinaryCall<Req, Resp> {
    /// Creates the strategy over `client`.
    pub fn new(client: FetchClient) -> Self {
        Self {
            client,
            codec: BinaryCodec::new(),
        }
    }
}

#[async_trait]
impl<Req, Resp> RemoteCall for BinaryCall<Req, Resp>
where
    Req: SerializeToBuffer + Clone + PartialEq + Send + Sync + 'static,
    Resp: DeserializeFromBuffer + Send + 'static,
{
    type Params = BinaryParams<Req>;
    type Output = Resp;

    async fn call(&self, params: &BinaryParams<Req>) -> Result<Resp, FetchError> {
        self.client
            .execute(
                &params.endpoint,
                HttpMethod::Post,
                Some(&params.payload),
                &self.codec,
            )
            .await
    }
}

// ---------------------------------------------------------------------------
// Stub
// ---------------------------------------------------------------------------

/// Delegates marshaling to a pre-bound [`RemoteProcedure`] handle.
pub struct StubCall<P> {
    handle: P,
    method: MethodName,
}

impl<P> StubCall<P> {
    /// Binds `handle` with the conventional method name.
    pub fn new(handle: P) -> Self {
        Self::with_method(handle, MethodName::conventional())
    }

    /// Binds `handle` with an explicit method name.
    pub fn with_method(handle: P, method: MethodName) -> Self {
        Self { handle, method }
    }

    /// Returns the bound method name.
    pub fn method(&self) -> &MethodName {
        &self.method
    }
}

#[async_trait]
impl<P> RemoteCall for StubCall<P>
where
    P: RemoteProcedure + 'static,
    P::Request: Clone + PartialEq + Sync + 'static,
{
    type Params = P::Request;
    type Output = P::Response;

    async fn call(&self, params: &P::Request) -> Result<P::Response, FetchError> {
        let span = info_span!("fetch.procedure", method = %self.method);
        async move {
            let result = call_procedure(&self.handle, &self.method, params.clone()).await;
            if let Err(err) = &result {
                warn!(error = %err, code = ?err.procedure_code(), "remote procedure failed");
            }
            result
        }
        .instrument(span)
        .await
    }
}
