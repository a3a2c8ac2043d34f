//! Login API messages.
//!
//! Each message derives both `serde` and `prost::Message`, so the same value
//! can be sent over every transport: JSON text, the binary codec, or the
//! remote-procedure handle.

use serde::{Deserialize, Serialize};

/// Credentials submitted to the login and register endpoints.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, prost::Message)]
pub struct LoginRequest {
    /// Account name.
    #[prost(string, tag = "1")]
    pub username: String,
    /// Account password.
    #[prost(string, tag = "2")]
    pub password: String,
}

/// Session token returned on successful login.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, prost::Message)]
pub struct LoginResponse {
    /// Bearer token.
    #[prost(string, tag = "1")]
    pub token: String,
}
