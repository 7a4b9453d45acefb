//! Access policy evaluation for Gatehouse.
//!
//! One pure function, [`evaluate`], decides whether a user holding a given
//! [`Role`] may enter something that requires another. It has no state,
//! no I/O and no logging, so the navigation guard, a menu renderer, and a
//! test can all call it and get the same answer.

use std::fmt;

use gatehouse_protocol::Role;
use serde::{Deserialize, Serialize};

/// The outcome of an access check.
///
/// The two deny variants are kept apart because callers react
/// differently: an unauthenticated visitor is sent to log in, a logged-in
/// user without the right role is sent to a "forbidden" page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decision {
    /// Access granted.
    Allow,

    /// Access requires a login and nobody is logged in.
    DenyUnauthenticated,

    /// Somebody is logged in, but their role ranks below the requirement.
    DenyInsufficientRole,
}

impl Decision {
    /// Returns `true` only for [`Decision::Allow`].
    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow => write!(f, "allow"),
            Self::DenyUnauthenticated => write!(f, "deny (unauthenticated)"),
            Self::DenyInsufficientRole => write!(f, "deny (insufficient role)"),
        }
    }
}

/// Decides whether `actual` satisfies `required`.
///
/// | required      | actual            | decision                 |
/// |---------------|-------------------|--------------------------|
/// | `None`        | anything          | `Allow`                  |
/// | `Some(_)`     | `NotLogin`        | `DenyUnauthenticated`    |
/// | `Some(r)`     | `a < r`           | `DenyInsufficientRole`   |
/// | `Some(r)`     | `a >= r`          | `Allow`                  |
///
/// Rows are checked top to bottom. The function is total over every
/// `(required, actual)` pair.
///
/// ```rust
/// use gatehouse_access::{evaluate, Decision};
/// use gatehouse_protocol::Role;
///
/// assert_eq!(evaluate(Some(Role::Admin), Role::User), Decision::DenyInsufficientRole);
/// assert_eq!(evaluate(None, Role::NotLogin), Decision::Allow);
/// ```
pub fn evaluate(required: Option<Role>, actual: Role) -> Decision {
    let Some(required) = required else {
        return Decision::Allow;
    };
    if actual == Role::NotLogin {
        Decision::DenyUnauthenticated
    } else if actual < required {
        Decision::DenyInsufficientRole
    } else {
        Decision::Allow
    }
}

/// `true` when [`evaluate`] would allow.
///
/// Handy for filtering lists (menus, links) where the reason for a denial
/// doesn't matter.
pub fn check_access(required: Option<Role>, actual: Role) -> bool {
    evaluate(required, actual).is_allowed()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate_no_requirement_always_allows() {
        for actual in Role::ALL {
            assert_eq!(evaluate(None, actual), Decision::Allow, "actual = {actual}");
        }
    }

    #[test]
    fn test_evaluate_not_login_with_requirement_is_unauthenticated() {
        assert_eq!(evaluate(Some(Role::User), Role::NotLogin), Decision::DenyUnauthenticated);
        assert_eq!(evaluate(Some(Role::Admin), Role::NotLogin), Decision::DenyUnauthenticated);
    }

    #[test]
    fn test_evaluate_user_on_admin_route_is_insufficient() {
        assert_eq!(evaluate(Some(Role::Admin), Role::User), Decision::DenyInsufficientRole);
    }

    #[test]
    fn test_evaluate_equal_or_higher_role_allows() {
        assert_eq!(evaluate(Some(Role::User), Role::User), Decision::Allow);
        assert_eq!(evaluate(Some(Role::User), Role::Admin), Decision::Allow);
        assert_eq!(evaluate(Some(Role::Admin), Role::Admin), Decision::Allow);
    }

    #[test]
    fn test_check_access_matches_evaluate() {
        assert!(check_access(None, Role::NotLogin));
        assert!(!check_access(Some(Role::User), Role::NotLogin));
        assert!(!check_access(Some(Role::Admin), Role::User));
    }

    #[test]
    fn test_decision_display() {
        assert_eq!(Decision::Allow.to_string(), "allow");
        assert_eq!(Decision::DenyInsufficientRole.to_string(), "deny (insufficient role)");
    }
}
