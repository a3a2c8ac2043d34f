//! Newtype identifiers for remote-call targets.
//!
//! Every concept that names something on the remote side is a distinct newtype
//! wrapping a primitive. This prevents accidentally passing, for example, a
//! [`MethodName`] where an [`Endpoint`] is expected even though both are
//! strings under the hood.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id! {
    /// The remote call target of an invocation (e.g. `"https://api.example.com/auth/login"`).
    ///
    /// Opaque to the client: it is handed to the transport unchanged.
    Endpoint
}

string_id! {
    /// Name of the method invoked on a pre-bound remote-procedure handle.
    ///
    /// Fixed per handle by convention; see [`MethodName::conventional`].
    MethodName
}

impl MethodName {
    /// The method name used when a handle is created without an explicit one.
    pub const CONVENTIONAL: &'static str = "getYourData";

    /// Returns the conventional method name.
    pub fn conventional() -> Self {
        Self(Self::CONVENTIONAL.to_string())
    }
}

/// Identifies a single invocation cycle.
///
/// Generated fresh for every call to the transport; recorded on the tracing
/// span and forwarded as the `x-request-id` header so the request can be
/// correlated on both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvocationId(Uuid);

impl InvocationId {
    /// Generates a new random invocation identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for InvocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
