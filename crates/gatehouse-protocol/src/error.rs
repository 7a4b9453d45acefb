//! Error types for the protocol layer.
//!
//! Each crate in Gatehouse defines its own error enum. A `ProtocolError`
//! always means "the bytes the directory sent do not describe a valid
//! reply", never "the user is not logged in" (that is a normal
//! [`DirectoryReply::Rejected`](crate::DirectoryReply::Rejected)).

/// Errors that can occur while decoding or validating a directory reply.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    ///
    /// The underlying `serde_json::Error` is not `Clone`, so only its
    /// message is kept. Replies are shared between coalesced callers,
    /// which requires every error on that path to be cloneable.
    #[error("encode failed: {0}")]
    Encode(String),

    /// Deserialization failed: malformed JSON, wrong field types, or an
    /// unknown role string.
    #[error("decode failed: {0}")]
    Decode(String),

    /// The envelope reported success (`code == 0`) but carried no payload
    /// where one is required.
    #[error("reply with code 0 carried no data")]
    MissingData,
}
