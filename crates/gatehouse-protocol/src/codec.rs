//! Codec trait and implementations for decoding directory replies.
//!
//! A "codec" (coder/decoder) converts between Rust types and raw bytes.
//! The rest of Gatehouse doesn't care HOW a response body is serialized;
//! it just needs something that implements [`Codec`]. A directory backed
//! by a different format plugs in its own implementation.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// - `Send + Sync` → safe to share between the tasks that call the
///   directory.
/// - `'static` → the codec owns everything it needs, so it can live
///   inside a long-lived directory client.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] if the bytes are malformed or
    /// don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// Behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use gatehouse_protocol::{BaseResponse, Codec, Identity, JsonCodec};
///
/// let body = br#"{"code":0,"data":{"displayName":"alice","role":"user"}}"#;
/// let reply: BaseResponse<Identity> = JsonCodec.decode(body).unwrap();
/// assert_eq!(reply.code, 0);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(|e| ProtocolError::Encode(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(|e| ProtocolError::Decode(e.to_string()))
    }
}
