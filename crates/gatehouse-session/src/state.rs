//! Session types: what the application currently knows about its user.
//!
//! There is one [`SessionState`] per running application. It answers:
//! - WHETHER we know who the user is yet (uninitialized, loading)
//! - WHO they are, if anyone (authenticated with an [`Identity`])
//! - WHAT they may do ([`SessionState::role`])

use std::fmt;

use gatehouse_protocol::{Identity, Role};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for the session store.
///
/// `#[serde(default)]` lets a config file set only the fields it cares
/// about; the rest come from [`Default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Label shown instead of a user name when nobody is logged in.
    ///
    /// Default: `"Not logged in"`.
    pub anonymous_display_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            anonymous_display_name: "Not logged in".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// SessionStatus
// ---------------------------------------------------------------------------

/// The lifecycle phase of the session, without the identity payload.
///
/// ```text
///                   refresh            ok reply
///   Uninitialized ──────────→ Loading ──────────→ Authenticated
///                               │  ↑                    │
///                   rejected    │  │ refresh            │ logout
///                               ▼  │                    ▼
///                            Anonymous ←────────────────┘
/// ```
///
/// A failed refresh goes back to whatever preceded `Loading`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionStatus {
    Uninitialized,
    Loading,
    Authenticated,
    Anonymous,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "uninitialized"),
            Self::Loading => write!(f, "loading"),
            Self::Authenticated => write!(f, "authenticated"),
            Self::Anonymous => write!(f, "anonymous"),
        }
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// The session as a whole: status plus, when authenticated, who.
///
/// Only [`SessionState::Authenticated`] carries an [`Identity`]. Because
/// the identity lives *inside* that variant, "identity present ⟺
/// authenticated" can't be violated: there is simply no way to build an
/// `Anonymous` state that has one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Nothing has been asked yet. The state at application start.
    #[default]
    Uninitialized,

    /// A request to the directory is in flight.
    Loading,

    /// The directory confirmed a logged-in user.
    Authenticated(Identity),

    /// The directory said nobody is logged in, or the user logged out.
    Anonymous,
}

impl SessionState {
    /// The lifecycle phase.
    pub fn status(&self) -> SessionStatus {
        match self {
            Self::Uninitialized => SessionStatus::Uninitialized,
            Self::Loading => SessionStatus::Loading,
            Self::Authenticated(_) => SessionStatus::Authenticated,
            Self::Anonymous => SessionStatus::Anonymous,
        }
    }

    /// The logged-in user, present only when authenticated.
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }

    /// The effective role: the identity's role when authenticated,
    /// [`Role::NotLogin`] in every other phase (including while loading).
    pub fn role(&self) -> Role {
        self.identity().map_or(Role::NotLogin, |identity| identity.role)
    }

    /// Returns `true` once a directory answer has been applied
    /// (authenticated or anonymous).
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Authenticated(_) | Self::Anonymous)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authenticated(identity) => write!(f, "authenticated as {identity}"),
            other => write!(f, "{}", other.status()),
        }
    }
}
