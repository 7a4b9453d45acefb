//! Unified error type for Gatehouse.

use gatehouse_protocol::ProtocolError;
use gatehouse_router::RouterError;
use gatehouse_session::SessionError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `gatehouse` meta-crate, you deal with this single
/// error type instead of importing errors from each sub-crate.
/// The `#[from]` attribute on each variant generates the `From` impls,
/// so `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum GatehouseError {
    /// A directory reply could not be decoded or validated.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session operation failed (fetch, logout).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The route catalog or guard configuration is invalid.
    #[error(transparent)]
    Router(#[from] RouterError),

    /// A configuration document could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}
