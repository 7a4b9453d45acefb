//! Guard configuration and the per-navigation phase machine.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// GuardConfig
// ---------------------------------------------------------------------------

/// Where the navigation guard sends people it turns away.
///
/// Both paths must be declared in the route catalog, without a role
/// requirement; [`NavigationGuard::new`](crate::NavigationGuard::new)
/// checks this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Destination for visitors who are not logged in. They get
    /// `?redirect=<where they wanted to go>` appended.
    ///
    /// Default: `/user/login`.
    pub login_path: String,

    /// Destination for logged-in users whose role is too low.
    ///
    /// Default: `/noAuth`.
    pub forbidden_path: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            login_path: "/user/login".to_string(),
            forbidden_path: "/noAuth".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// GuardPhase
// ---------------------------------------------------------------------------

/// Where one navigation attempt is in the guard.
///
/// Every attempt starts fresh and moves strictly forward:
///
/// ```text
/// Idle → Evaluating → Allowed
///                   ↘ Redirected
/// ```
///
/// - **Idle**: the attempt exists, nothing has been checked.
/// - **Evaluating**: waiting for the session to settle, then checking the
///   target's requirement against the current role.
/// - **Allowed** / **Redirected**: terminal. A new navigation starts a new
///   attempt at `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GuardPhase {
    Idle,
    Evaluating,
    Allowed,
    Redirected,
}

impl GuardPhase {
    /// Returns `true` for the two outcomes.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Allowed | Self::Redirected)
    }

    /// Returns `true` if moving to `target` is a valid step.
    pub fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Idle, Self::Evaluating)
                | (Self::Evaluating, Self::Allowed)
                | (Self::Evaluating, Self::Redirected)
        )
    }
}

impl std::fmt::Display for GuardPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Evaluating => write!(f, "evaluating"),
            Self::Allowed => write!(f, "allowed"),
            Self::Redirected => write!(f, "redirected"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_config_default() {
        let config = GuardConfig::default();
        assert_eq!(config.login_path, "/user/login");
        assert_eq!(config.forbidden_path, "/noAuth");
    }

    #[test]
    fn test_guard_config_partial_json_keeps_defaults() {
        let config: GuardConfig = serde_json::from_str(r#"{"login_path":"/login"}"#).unwrap();
        assert_eq!(config.login_path, "/login");
        assert_eq!(config.forbidden_path, "/noAuth");
    }

    #[test]
    fn test_guard_phase_can_transition_to() {
        assert!(GuardPhase::Idle.can_transition_to(GuardPhase::Evaluating));
        assert!(GuardPhase::Evaluating.can_transition_to(GuardPhase::Allowed));
        assert!(GuardPhase::Evaluating.can_transition_to(GuardPhase::Redirected));
        assert!(!GuardPhase::Idle.can_transition_to(GuardPhase::Allowed));
        assert!(!GuardPhase::Allowed.can_transition_to(GuardPhase::Evaluating));
        assert!(!GuardPhase::Redirected.can_transition_to(GuardPhase::Idle));
    }

    #[test]
    fn test_guard_phase_is_terminal() {
        assert!(!GuardPhase::Idle.is_terminal());
        assert!(!GuardPhase::Evaluating.is_terminal());
        assert!(GuardPhase::Allowed.is_terminal());
        assert!(GuardPhase::Redirected.is_terminal());
    }
}
