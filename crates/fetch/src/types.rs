//! Shared value types for remote calls.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! meaningful values with invariants (a [`ResultState`] never holds both data
//! and an error, a [`RawResponse`] knows whether its status is a success) and
//! participate in the orchestration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Endpoint, FetchError};

// ---------------------------------------------------------------------------
// Result lifecycle
// ---------------------------------------------------------------------------

/// The published outcome of one invocation cycle.
///
/// Both fields are `None` while a request is in flight or before the first
/// invocation. At most one of them is ever `Some`; the constructors below are
/// the only producers used in this workspace and all of them uphold that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultState<T> {
    /// The decoded response, on success.
    pub data: Option<T>,
    /// The human-readable failure, on error.
    pub error: Option<String>,
}

impl<T> ResultState<T> {
    /// A fresh state: nothing resolved yet.
    pub fn pending() -> Self {
        Self {
            data: None,
            error: None,
        }
    }

    /// A successful outcome.
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    /// A failed outcome.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            data: None,
            error: Some(message.into()),
        }
    }

    /// Collapses a typed outcome into the two-field form.
    pub fn from_result(result: Result<T, FetchError>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(err) => Self::failure(err.to_string()),
        }
    }

    /// Returns `true` while neither field is populated.
    pub fn is_pending(&self) -> bool {
        self.data.is_none() && self.error.is_none()
    }

    /// Returns `true` if the cycle resolved with data.
    pub fn is_success(&self) -> bool {
        self.data.is_some()
    }

    /// Returns `true` if the cycle resolved with an error.
    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

impl<T> Default for ResultState<T> {
    fn default() -> Self {
        Self::pending()
    }
}

// ---------------------------------------------------------------------------
// Request shape
// ---------------------------------------------------------------------------

/// HTTP method of a request/response exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// Pure retrieval; never carries a body.
    Get,
    /// Create or submit.
    Post,
    /// Replace.
    Put,
    /// Remove.
    Delete,
}

impl HttpMethod {
    /// Returns the method token as sent on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Returns `true` for methods that must not send a request body.
    pub fn is_retrieval(self) -> bool {
        matches!(self, HttpMethod::Get)
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content marker sent with a request and expected on its response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentType {
    /// `application/json`
    Json,
    /// `application/x-protobuf`
    Protobuf,
}

impl ContentType {
    /// Returns the MIME type string.
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Json => "application/json",
            ContentType::Protobuf => "application/x-protobuf",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully built request handed to an [`Exchange`](crate::Exchange).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeRequest {
    /// Where the request goes.
    pub endpoint: Endpoint,
    /// HTTP method.
    pub method: HttpMethod,
    /// Header name → value. Names are lowercase.
    pub headers: BTreeMap<String, String>,
    /// Encoded payload; `None` when no body is sent.
    pub body: Option<Vec<u8>>,
}

impl ExchangeRequest {
    /// Returns the value of header `name`, if set.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

/// The raw outcome of an exchange, before classification or decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// Numeric status.
    pub status: u16,
    /// Status description (e.g. `"Unauthorized"`). May be empty.
    pub status_text: String,
    /// Response body, unmodified.
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Creates a response from its parts.
    pub fn new(status: u16, status_text: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            body: body.into(),
        }
    }

    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
