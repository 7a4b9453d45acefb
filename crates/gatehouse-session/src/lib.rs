//! Session state management for Gatehouse.
//!
//! This crate keeps track of who is using the application:
//!
//! 1. **Directory** — asking the backend who is logged in ([`UserDirectory`] trait)
//! 2. **State** — the session lifecycle ([`SessionState`], [`SessionStatus`])
//! 3. **Store** — the one place that state lives, with coalesced refreshes,
//!    logout, and ordered observer callbacks ([`SessionStore`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Router layer (above)   ← reads the current role on every navigation
//!     ↕
//! Session layer (this crate)  ← owns the session state
//!     ↕
//! Protocol layer (below) ← provides Role, Identity, DirectoryReply
//! ```

mod directory;
mod error;
mod observer;
mod state;
mod store;

pub use directory::UserDirectory;
pub use error::{DirectoryError, SessionError};
pub use observer::Subscription;
pub use state::{SessionConfig, SessionState, SessionStatus};
pub use store::{RefreshResult, SessionStore};
