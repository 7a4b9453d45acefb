//! The User Directory Service: the backend that knows who is logged in.
//!
//! Gatehouse doesn't talk HTTP itself. That's the host application's job
//! (a generated API client, `reqwest`, `gloo-net`, a test double...).
//!
//! Instead, Gatehouse defines the [`UserDirectory`] trait: two async
//! methods that answer with an already-validated
//! [`DirectoryReply`](gatehouse_protocol::DirectoryReply). Implementations
//! usually fetch a body and hand it to
//! [`decode_reply`](gatehouse_protocol::decode_reply), which does the
//! validation.

use gatehouse_protocol::{DirectoryReply, Identity};

use crate::DirectoryError;

/// Backend collaborator providing "who is logged in" and "log out".
///
/// # The two kinds of failure
///
/// - `Ok(DirectoryReply::Rejected { .. })` → the backend answered with a
///   non-zero code. For [`current_user`](Self::current_user) this is the
///   normal "nobody is logged in" answer.
/// - `Err(DirectoryError)` → the backend could not be reached, timed out,
///   or sent something that didn't validate.
///
/// Timeouts are the implementation's responsibility; report them as
/// [`DirectoryError::Timeout`].
///
/// # Trait bounds
///
/// - `Send + Sync` → the directory is shared between every task that
///   refreshes or logs out.
/// - `'static` → it lives as long as the session store that owns it.
///
/// # Example
///
/// ```rust
/// use gatehouse_protocol::{DirectoryReply, Identity, Role};
/// use gatehouse_session::{DirectoryError, UserDirectory};
///
/// /// Always reports the same user. Handy for demos.
/// struct FixedUser(Identity);
///
/// impl UserDirectory for FixedUser {
///     async fn current_user(&self) -> Result<DirectoryReply<Identity>, DirectoryError> {
///         Ok(DirectoryReply::Ok(self.0.clone()))
///     }
///
///     async fn logout(&self) -> Result<DirectoryReply<()>, DirectoryError> {
///         Ok(DirectoryReply::Ok(()))
///     }
/// }
/// ```
pub trait UserDirectory: Send + Sync + 'static {
    /// Asks the backend who is currently logged in.
    fn current_user(
        &self,
    ) -> impl std::future::Future<Output = Result<DirectoryReply<Identity>, DirectoryError>> + Send;

    /// Asks the backend to end the current session.
    fn logout(
        &self,
    ) -> impl std::future::Future<Output = Result<DirectoryReply<()>, DirectoryError>> + Send;
}
