//! Application-wide configuration.

use gatehouse_router::GuardConfig;
use gatehouse_session::SessionConfig;
use serde::{Deserialize, Serialize};

use crate::GatehouseError;

/// Everything [`Gatehouse`](crate::Gatehouse) can be configured with.
///
/// Each section falls back to its own defaults, so a config document only
/// needs the keys it changes:
///
/// ```rust
/// use gatehouse::GatehouseConfig;
///
/// let config = GatehouseConfig::from_json_str(
///     r#"{ "guard": { "forbidden_path": "/403" }, "initial_path": "/home" }"#,
/// ).unwrap();
/// assert_eq!(config.guard.login_path, "/user/login");
/// assert_eq!(config.guard.forbidden_path, "/403");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatehouseConfig {
    pub session: SessionConfig,
    pub guard: GuardConfig,

    /// Where [`Gatehouse::start`](crate::Gatehouse::start) navigates.
    ///
    /// Default: `/`.
    pub initial_path: String,
}

impl Default for GatehouseConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            guard: GuardConfig::default(),
            initial_path: "/".to_string(),
        }
    }
}

impl GatehouseConfig {
    /// Parses a JSON config document.
    ///
    /// # Errors
    /// [`GatehouseError::Config`] for malformed JSON or mistyped fields.
    pub fn from_json_str(json: &str) -> Result<Self, GatehouseError> {
        Ok(serde_json::from_str(json)?)
    }
}
