//! Error taxonomy for remote calls.
//!
//! [`FetchError`] covers every way an invocation cycle can fail: the payload
//! could not be encoded, the exchange could not be completed or was rejected,
//! or the response could not be decoded. At the orchestration boundary every
//! variant collapses into the single `error` string of a
//! [`ResultState`](crate::ResultState); the distinction survives only in the
//! message text and in [`FetchError::class`].

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Coarse classification of a failure.
///
/// No retry metadata is attached; every failure is terminal for its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// The remote answered and declared the request unsuccessful.
    Rejected,
    /// Any other failure.
    Unknown,
}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

/// A failure reported by, or derived from, the transport collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum TransportError {
    /// The remote responded with a non-success status.
    #[error("Error: {status_text}")]
    Rejected {
        /// Numeric status, when the transport has one.
        status: Option<u16>,
        /// Human-readable status description (e.g. `"Unauthorized"`).
        status_text: String,
    },

    /// The exchange could not be completed.
    #[error("{message}")]
    Unknown {
        /// Best-effort description of the underlying failure.
        message: String,
    },
}

impl TransportError {
    /// Creates a [`TransportError::Rejected`] for `status`.
    ///
    /// An empty `status_text` is replaced with the canonical reason phrase for
    /// the status, or the bare number when no phrase is known.
    pub fn rejected(status: u16, status_text: impl Into<String>) -> Self {
        let text = status_text.into();
        let status_text = if text.trim().is_empty() {
            canonical_reason(status)
                .map(str::to_string)
                .unwrap_or_else(|| status.to_string())
        } else {
            text
        };
        Self::Rejected {
            status: Some(status),
            status_text,
        }
    }

    /// Creates a [`TransportError::Unknown`] from any displayable failure.
    pub fn unknown(message: impl std::fmt::Display) -> Self {
        Self::Unknown {
            message: message.to_string(),
        }
    }
}

/// Registered reason phrase for `status`, if it has one.
pub fn canonical_reason(status: u16) -> Option<&'static str> {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
}

// ---------------------------------------------------------------------------
// Capability errors
// ---------------------------------------------------------------------------

/// A binary buffer capability failed to serialize or deserialize a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct BufferError {
    /// Description of the failure.
    pub message: String,
}

impl BufferError {
    /// Creates a new [`BufferError`].
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<prost::DecodeError> for BufferError {
    fn from(err: prost::DecodeError) -> Self {
        Self::new(err.to_string())
    }
}

/// The error argument passed to a remote-procedure completion callback.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ProcedureError {
    /// Message reported by the remote procedure.
    pub message: String,
    /// Status code reported alongside the message, if any.
    pub code: Option<i32>,
}

impl ProcedureError {
    /// Creates a [`ProcedureError`] without a status code.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    /// Attaches a status code.
    #[must_use]
    pub fn with_code(mut self, code: i32) -> Self {
        self.code = Some(code);
        self
    }
}

// ---------------------------------------------------------------------------
// Invocation errors
// ---------------------------------------------------------------------------

/// Every failure an invocation cycle can end in.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The payload could not be converted to wire form. The transport was
    /// never contacted.
    #[error("Failed to encode request: {message}")]
    Encoding {
        /// Description of the encoding failure.
        message: String,
    },

    /// The exchange failed or the remote declared the request unsuccessful.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response arrived but could not be converted to the expected type.
    #[error("Failed to decode response: {message}")]
    Decoding {
        /// Description of the decoding failure.
        message: String,
    },

    /// A remote-procedure handle completed with an error. Rendered as the
    /// procedure's message, verbatim.
    #[error(transparent)]
    Procedure(#[from] ProcedureError),
}

impl FetchError {
    /// Creates a [`FetchError::Encoding`].
    pub fn encoding(message: impl std::fmt::Display) -> Self {
        Self::Encoding {
            message: message.to_string(),
        }
    }

    /// Creates a [`FetchError::Decoding`].
    pub fn decoding(message: impl std::fmt::Display) -> Self {
        Self::Decoding {
            message: message.to_string(),
        }
    }

    /// Returns the coarse classification of this error.
    ///
    /// Only a remote rejection is [`ErrorClass::Rejected`]; encoding and
    /// decoding failures are [`ErrorClass::Unknown`].
    pub fn class(&self) -> ErrorClass {
        match self {
            FetchError::Transport(TransportError::Rejected { .. }) => ErrorClass::Rejected,
            _ => ErrorClass::Unknown,
        }
    }

    /// Status code reported by a failed remote procedure, if any.
    pub fn procedure_code(&self) -> Option<i32> {
        match self {
            FetchError::Procedure(err) => err.code,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_renders_status_text() {
        let err = FetchError::from(TransportError::rejected(401, "Unauthorized"));
        assert_eq!(err.to_string(), "Error: Unauthorized");
        assert_eq!(err.class(), ErrorClass::Rejected);
    }

    #[test]
    fn rejected_falls_back_to_reason_phrase_then_number() {
        assert_eq!(
            TransportError::rejected(503, "").to_string(),
            "Error: Service Unavailable"
        );
        assert_eq!(TransportError::rejected(599, " ").to_string(), "Error: 599");
    }

    #[test]
    fn rejected_fallback_covers_every_registered_status() {
        assert_eq!(TransportError::rejected(418, "").to_string(), "Error: I'm a teapot");
        assert_eq!(
            TransportError::rejected(429, "").to_string(),
            "Error: Too Many Requests"
        );
        assert_eq!(canonical_reason(499), None);
        assert_eq!(canonical_reason(1000), None);
    }

    #[test]
    fn procedure_error_message_passes_through_with_its_code() {
        let err = FetchError::from(ProcedureError::new("unavailable").with_code(14));
        assert_eq!(err.to_string(), "unavailable");
        assert_eq!(err.class(), ErrorClass::Unknown);
        assert_eq!(err.procedure_code(), Some(14));
        assert_eq!(FetchError::decoding("boom").procedure_code(), None);
    }

    #[test]
    fn codec_failures_classify_as_unknown() {
        assert_eq!(FetchError::encoding("boom").class(), ErrorClass::Unknown);
        assert_eq!(FetchError::decoding("boom").class(), ErrorClass::Unknown);
    }
}
