//! Core identity types: who is logged in, and with which access level.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// An access level attached to a user identity.
///
/// Roles form a total order: `NotLogin < User < Admin`. The order comes
/// from the declaration order of the variants (`#[derive(PartialOrd, Ord)]`
/// compares enum variants by their position), so adding a role means
/// inserting it at the right place in this list.
///
/// On the wire a role is a lower-camel-case string (`"notLogin"`,
/// `"user"`, `"admin"`). The upper-case spellings some backends use
/// (`"NOT_LOGIN"`, `"USER"`, `"ADMIN"`) are accepted as aliases when
/// decoding. Anything else fails to decode.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub enum Role {
    /// No authenticated user. Every visitor has at least this role.
    #[default]
    #[serde(rename = "notLogin", alias = "NOT_LOGIN")]
    NotLogin,

    /// A regular logged-in user.
    #[serde(rename = "user", alias = "USER")]
    User,

    /// An administrator.
    #[serde(rename = "admin", alias = "ADMIN")]
    Admin,
}

impl Role {
    /// Every role, lowest first.
    pub const ALL: [Role; 3] = [Role::NotLogin, Role::User, Role::Admin];

    /// The canonical wire spelling of this role.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotLogin => "notLogin",
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    /// Returns `true` for every role except [`Role::NotLogin`].
    pub fn is_logged_in(self) -> bool {
        self != Self::NotLogin
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "notLogin" | "NOT_LOGIN" => Ok(Self::NotLogin),
            "user" | "USER" => Ok(Self::User),
            "admin" | "ADMIN" => Ok(Self::Admin),
            other => Err(ProtocolError::Decode(format!("unknown role {other:?}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// The logged-in user as reported by the User Directory Service.
///
/// Only `display_name` and `role` are required. Backends usually send a
/// richer user record; the optional fields keep the parts a UI commonly
/// shows, and any other keys are ignored.
///
/// Several backends name these fields differently (`userName`,
/// `userRole`, `userAvatar`); `#[serde(alias)]` accepts those too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Human-readable name shown in the UI.
    #[serde(alias = "userName")]
    pub display_name: String,

    /// Access level used by the access policy.
    #[serde(alias = "userRole")]
    pub role: Role,

    /// Backend user ID, if the directory sends one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,

    /// Avatar URL, if any.
    #[serde(default, alias = "userAvatar", skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl Identity {
    /// Creates an identity with just a name and a role.
    pub fn new(display_name: impl Into<String>, role: Role) -> Self {
        Self {
            display_name: display_name.into(),
            role,
            id: None,
            avatar: None,
        }
    }

    /// Sets the backend user ID.
    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name, self.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_order_is_total_and_ascending() {
        assert!(Role::NotLogin < Role::User);
        assert!(Role::User < Role::Admin);
        assert!(Role::NotLogin < Role::Admin);
        let mut sorted = Role::ALL;
        sorted.sort();
        assert_eq!(sorted, Role::ALL);
    }

    #[test]
    fn test_role_default_is_not_login() {
        assert_eq!(Role::default(), Role::NotLogin);
        assert!(!Role::default().is_logged_in());
    }

    #[test]
    fn test_role_from_str_accepts_both_spellings() {
        assert_eq!("user".parse::<Role>().unwrap(), Role::User);
        assert_eq!("USER".parse::<Role>().unwrap(), Role::User);
        assert_eq!("NOT_LOGIN".parse::<Role>().unwrap(), Role::NotLogin);
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
    }

    #[test]
    fn test_role_from_str_unknown_returns_decode_error() {
        let result = "superuser".parse::<Role>();
        assert!(matches!(result, Err(ProtocolError::Decode(msg)) if msg.contains("superuser")));
    }

    #[test]
    fn test_role_display_matches_wire_form() {
        for role in Role::ALL {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{role}\""));
        }
    }

    #[test]
    fn test_role_deserialize_upper_case_alias() {
        let role: Role = serde_json::from_str("\"ADMIN\"").unwrap();
        assert_eq!(role, Role::Admin);
    }

    #[test]
    fn test_identity_deserialize_accepts_legacy_field_names() {
        let json = r#"{"userName":"bob","userRole":"user","userAvatar":"a.png","id":7,"createTime":"x"}"#;

        let identity: Identity = serde_json::from_str(json).unwrap();

        assert_eq!(identity.display_name, "bob");
        assert_eq!(identity.role, Role::User);
        assert_eq!(identity.avatar.as_deref(), Some("a.png"));
        assert_eq!(identity.id, Some(7));
    }

    #[test]
    fn test_identity_deserialize_missing_role_fails() {
        let result: Result<Identity, _> = serde_json::from_str(r#"{"displayName":"x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_identity_display() {
        let identity = Identity::new("alice", Role::User);
        assert_eq!(identity.to_string(), "alice (user)");
    }
}
