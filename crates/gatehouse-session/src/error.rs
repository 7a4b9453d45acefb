//! Error types for the session layer.
//!
//! Everything here derives `Clone`: a coalesced refresh hands the same
//! result to every caller that joined it.

use gatehouse_protocol::ProtocolError;

/// A failure talking to the User Directory Service.
///
/// Distinct from a `Rejected` reply: these mean the question never got a
/// valid answer.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DirectoryError {
    /// The request never reached the backend, or the connection broke.
    #[error("directory unreachable: {0}")]
    Transport(String),

    /// The backend did not answer in time.
    #[error("directory request timed out")]
    Timeout,

    /// The backend answered with something that didn't validate.
    #[error("malformed directory reply: {0}")]
    Malformed(#[from] ProtocolError),
}

/// Errors surfaced by [`SessionStore`](crate::SessionStore) operations.
///
/// "Not logged in" is never one of these. It is a normal state.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SessionError {
    /// Refreshing the session failed. The state the store held before the
    /// refresh has been restored; callers may retry.
    #[error("session fetch failed: {0}")]
    Fetch(#[source] DirectoryError),

    /// The logout request failed in transport. State is unchanged.
    #[error("logout failed: {0}")]
    Logout(#[source] DirectoryError),

    /// The backend refused to log out (non-zero code). State is unchanged.
    #[error("logout rejected by directory (code {code})")]
    LogoutRejected { code: i32, message: Option<String> },
}

impl SessionError {
    /// Returns `true` for the logout variants.
    pub fn is_logout(&self) -> bool {
        matches!(self, Self::Logout(_) | Self::LogoutRejected { .. })
    }
}
