//! Pluggable remote-call client.
//!
//! This crate contains the policy around invoking a remote endpoint: when to
//! invoke, how to serialize, how to interpret success or failure, and how to
//! expose a stable two-field [`ResultState`] to callers. It never performs
//! network I/O itself; transports implement the [`Exchange`] and
//! [`RemoteProcedure`] ports.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** Infrastructure crates
//! (`http-exchange`, `rpc-handle`) implement the ports defined here; they
//! never add classification or decoding rules.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`Endpoint`, `MethodName`, `InvocationId`) |
//! | [`types`] | `ResultState`, `HttpMethod`, `ContentType`, request/response shapes |
//! | [`errors`] | Error taxonomy and classification |
//! | [`codec`] | `TextCodec`, `BinaryCodec`, binary buffer capabilities |
//! | [`procedure`] | Remote-procedure port and callback-to-future bridge |
//! | [`client`] | `Exchange` port and the `FetchClient` orchestration |
//! | [`calls`] | `RemoteCall` and the JSON, binary, and stub strategies |
//! | [`trigger`] | Re-invocation on parameter change |

pub mod calls;
pub mod client;
pub mod codec;
pub mod errors;
pub mod identifiers;
pub mod procedure;
pub mod trigger;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use calls::{BinaryCall, BinaryParams, JsonCall, JsonParams, RemoteCall, StubCall};
pub use client::{Exchange, FetchClient, REQUEST_ID_HEADER};
pub use codec::{BinaryCodec, Codec, DeserializeFromBuffer, SerializeToBuffer, TextCodec};
pub use errors::{
    canonical_reason, BufferError, ErrorClass, FetchError, ProcedureError, TransportError,
};
pub use identifiers::{Endpoint, InvocationId, MethodName};
pub use procedure::{call_procedure, Callback, RemoteProcedure};
pub use trigger::Trigger;
pub use types::{ContentType, ExchangeRequest, HttpMethod, RawResponse, ResultState};
