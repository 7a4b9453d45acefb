//! Locations: where the application is, or wants to go.
//!
//! The router uses hash history, so the "real" URL looks like
//! `https://host/app/#/question/7?tab=answers`. Everything after the `#` is
//! a [`Location`]: a path plus an optional raw query string.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Query key under which the login redirect stores the intended target.
pub const REDIRECT_PARAM: &str = "redirect";

/// A navigable location inside the application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Always starts with `/`.
    pub path: String,

    /// Raw query string, without the leading `?`.
    pub query: Option<String>,
}

impl Location {
    /// Parses a hash-history URL, a `#/...` fragment, or a plain path.
    ///
    /// ```rust
    /// use gatehouse_router::Location;
    ///
    /// let loc = Location::parse("https://example.com/#/question/7?tab=answers");
    /// assert_eq!(loc.path, "/question/7");
    /// assert_eq!(loc.query.as_deref(), Some("tab=answers"));
    ///
    /// assert_eq!(Location::parse("").path, "/");
    /// ```
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        // Only the fragment matters under hash history.
        let raw = match raw.split_once('#') {
            Some((_, fragment)) => fragment,
            None => raw,
        };

        let (path, query) = match raw.split_once('?') {
            Some((path, query)) => (path, (!query.is_empty()).then(|| query.to_string())),
            None => (raw, None),
        };

        let path = if path.is_empty() {
            "/".to_string()
        } else if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };

        Self { path, query }
    }

    /// The login location for someone who wanted to reach `intended`.
    ///
    /// `self` is the login page; the result is
    /// `<login path>?redirect=<percent-encoded intended>`.
    pub fn with_redirect(&self, intended: &Location) -> Self {
        Self {
            path: self.path.clone(),
            query: Some(format!(
                "{REDIRECT_PARAM}={}",
                urlencoding::encode(&intended.to_string())
            )),
        }
    }

    /// Where to go after logging in, if this location carries a redirect.
    pub fn redirect_target(&self) -> Option<Location> {
        self.query_param(REDIRECT_PARAM)
            .map(|target| Location::parse(&target))
    }

    /// Decoded value of the first `key=value` pair with this key.
    pub fn query_param(&self, key: &str) -> Option<String> {
        self.query
            .as_deref()?
            .split('&')
            .filter_map(|pair| pair.split_once('=').or(Some((pair, ""))))
            .find(|(k, _)| *k == key)
            .and_then(|(_, value)| urlencoding::decode(value).ok())
            .map(|value| value.into_owned())
    }

    /// The `#/...` form, suitable for an `href`.
    pub fn to_hash(&self) -> String {
        format!("#{self}")
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.query {
            Some(query) => write!(f, "{}?{query}", self.path),
            None => write!(f, "{}", self.path),
        }
    }
}

impl From<&str> for Location {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<String> for Location {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<&Location> for Location {
    fn from(location: &Location) -> Self {
        location.clone()
    }
}
