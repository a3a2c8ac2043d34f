//! Encode/decode strategies.
//!
//! A [`Codec`] pairs a payload representation with a wire representation and a
//! content marker. Two codecs are provided:
//!
//! | Codec | Wire form | Capability required |
//! |-------|-----------|---------------------|
//! | [`TextCodec`] | JSON text | `Serialize` / `DeserializeOwned` |
//! | [`BinaryCodec`] | opaque bytes | [`SerializeToBuffer`] / [`DeserializeFromBuffer`] |
//!
//! The third strategy, where marshaling is delegated to a remote-procedure
//! handle, has no codec; see [`crate::procedure`].

use std::marker::PhantomData;

use serde::{de::DeserializeOwned, Serialize};

use crate::{BufferError, ContentType, FetchError};

/// An encode/decode strategy.
pub trait Codec: Send + Sync {
    /// The payload type this codec can encode.
    type Request: Send + Sync;
    /// The response type this codec produces.
    type Response: Send;

    /// Content marker for both the request body and the expected response.
    fn content_type(&self) -> ContentType;

    /// Converts a payload to wire bytes.
    fn encode(&self, request: &Self::Request) -> Result<Vec<u8>, FetchError>;

    /// Converts wire bytes to a response value.
    fn decode(&self, body: &[u8]) -> Result<Self::Response, FetchError>;
}

// ---------------------------------------------------------------------------
// JSON text
// ---------------------------------------------------------------------------

/// JSON text codec backed by `serde_json`.
pub struct TextCodec<Req, Resp> {
    _types: PhantomData<fn(&Req) -> Resp>,
}

impl<Req, Resp> TextCodec<Req, Resp> {
    /// Creates the codec.
    pub fn new() -> Self {
        Self {
            _types: PhantomData,
        }
    }
}

impl<Req, Resp> Default for TextCodec<Req, Resp> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Req, Resp> Clone for TextCodec<Req, Resp> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<Req, Resp> std::fmt::Debug for TextCodec<Req, Resp> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TextCodec")
    }
}

impl<Req, Resp> Codec for TextCodec<Req, Resp>
where
    Req: Serialize + Send + Sync,
    Resp: DeserializeOwned + Send,
{
    type Request = Req;
    type Response = Resp;

    fn content_type(&self) -> ContentType {
        ContentType::Json
    }

    fn encode(&self, request: &Req) -> Result<Vec<u8>, FetchError> {
        serde_json::to_vec(request).map_err(FetchError::encoding)
    }

    fn decode(&self, body: &[u8]) -> Result<Resp, FetchError> {
        serde_json::from_slice(body).map_err(FetchError::decoding)
    }
}

// ---------------------------------------------------------------------------
// Binary buffers
// ---------------------------------------------------------------------------

/// A value that can serialize itself to a binary buffer.
pub trait SerializeToBuffer {
    /// Serializes `self`.
    fn serialize_to_buffer(&self) -> Result<Vec<u8>, BufferError>;
}

/// A type that can reconstruct a value of itself from a binary buffer.
pub trait DeserializeFromBuffer: Sized {
    /// Deserializes a value from `bytes`.
    fn deserialize_from_buffer(bytes: &[u8]) -> Result<Self, BufferError>;
}

impl<M: prost::Message> SerializeToBuffer for M {
    fn serialize_to_buffer(&self) -> Result<Vec<u8>, BufferError> {
        Ok(self.encode_to_vec())
    }
}

impl<M: prost::Message + Default> DeserializeFromBuffer for M {
    fn deserialize_from_buffer(bytes: &[u8]) -> Result<Self, BufferError> {
        Ok(M::decode(bytes)?)
    }
}

/// Binary codec: the payload serializes itself, and the caller-nominated
/// response type `Resp` deserializes the raw response bytes.
pub struct BinaryCodec<Req, Resp> {
    _types: PhantomData<fn(&Req) -> Resp>,
}

impl<Req, Resp> BinaryCodec<Req, Resp> {
    /// Creates the codec.
    pub fn new() -> Self {
        Self {
            _types: PhantomData,
        }
    }
}

impl<Req, Resp> Default for BinaryCodec<Req, Resp> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Req, Resp> Clone for BinaryCodec<Req, Resp> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<Req, Resp> std::fmt::Debug for BinaryCodec<Req, Resp> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BinaryCodec")
    }
}

impl<Req, Resp> Codec for BinaryCodec<Req, Resp>
where
    Req: SerializeToBuffer + Send + Sync,
    Resp: DeserializeFromBuffer + Send,
{
    type Request = Req;
    type Response = Resp;

    fn content_type(&self) -> ContentType {
        ContentType::Protobuf
    }

    fn encode(&self, request: &Req) -> Result<Vec<u8>, FetchError> {
        request.serialize_to_buffer().map_err(FetchError::encoding)
    }

    fn decode(&self, body: &[u8]) -> Result<Resp, FetchError> {
        Resp::deserialize_from_buffer(body).map_err(FetchError::decoding)
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Token {
        token: String,
    }

    #[derive(Clone, PartialEq, prost::Message)]
    struct TokenMessage {
        #[prost(string, tag = "1")]
        token: String,
    }

    #[test]
    fn text_codec_decodes_json_body() {
        let codec = TextCodec::<Token, Token>::new();
        let decoded = codec.decode(br#"{"token":"xyz"}"#);
        assert_eq!(
            decoded,
            Ok(Token {
                token: "xyz".into()
            })
        );
        assert_eq!(codec.content_type().as_str(), "application/json");
    }

    #[test]
    fn text_codec_reports_malformed_json_as_decoding_error() {
        let codec = TextCodec::<Token, Token>::new();
        let err = codec.decode(b"{not json").unwrap_err();
        assert!(matches!(err, FetchError::Decoding { .. }), "{err:?}");
    }

    #[test]
    fn binary_codec_uses_message_capabilities() {
        let codec = BinaryCodec::<TokenMessage, TokenMessage>::new();
        let msg = TokenMessage {
            token: "xyz".into(),
        };
        let bytes = codec.encode(&msg).unwrap();
        assert_eq!(codec.decode(&bytes).unwrap(), msg);
        assert_eq!(codec.content_type().as_str(), "application/x-protobuf");
    }

    #[test]
    fn binary_codec_rejects_malformed_buffer() {
        let codec = BinaryCodec::<TokenMessage, TokenMessage>::new();
        // Field 1, wire type 2 (length-delimited), declared length past the end.
        let err = codec.decode(&[0x0a, 0x05, b'x']).unwrap_err();
        assert!(matches!(err, FetchError::Decoding { .. }), "{err:?}");
    }
}
