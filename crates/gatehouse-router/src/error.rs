//! Error types for the router layer.

/// Errors that can occur while building or using the router.
///
/// Navigation itself never fails: a denied navigation is a redirect, not
/// an error. Everything here is a setup mistake caught at construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouterError {
    /// The route catalog has no routes at all.
    #[error("route catalog is empty")]
    EmptyCatalog,

    /// A route path is not a valid pattern.
    #[error("invalid route path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    /// Two routes declare the same path.
    #[error("duplicate route path {0:?}")]
    DuplicatePath(String),

    /// Two routes declare the same name.
    #[error("duplicate route name {0:?}")]
    DuplicateName(String),

    /// The catalog can't back the guard: a redirect target is missing or
    /// itself restricted.
    #[error("invalid catalog for guard: {0}")]
    InvalidCatalog(String),
}
