//! The route catalog: every page the application knows about, and who may
//! enter it.
//!
//! A catalog is plain data handed to the router at startup. It is
//! validated once, in [`RouteCatalog::new`], so that nothing at navigation
//! time has to wonder whether a path is well formed.
//!
//! # Path patterns
//!
//! ```text
//! /user/login        literal segments
//! /question/:id      a named parameter (matches exactly one segment)
//! /docs/*            a catch-all (matches the rest, zero or more segments)
//! ```

use std::collections::BTreeMap;

use gatehouse_access::check_access;
use gatehouse_protocol::Role;
use serde::{Deserialize, Serialize};

use crate::RouterError;

/// The key a catch-all segment's capture is stored under.
pub const CATCH_ALL: &str = "*";

// ---------------------------------------------------------------------------
// RouteRecord
// ---------------------------------------------------------------------------

/// One entry in the route catalog.
///
/// ```rust
/// use gatehouse_protocol::Role;
/// use gatehouse_router::RouteRecord;
///
/// let admin = RouteRecord::new("/admin/user", "UserManagePage")
///     .named("userManage")
///     .requires(Role::Admin);
/// assert_eq!(admin.requires, Some(Role::Admin));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRecord {
    /// The path pattern, always starting with `/`.
    pub path: String,

    /// Optional unique name, for lookups that shouldn't depend on the path.
    #[serde(default)]
    pub name: Option<String>,

    /// Opaque reference to whatever renders this route.
    pub component: String,

    /// Minimum role needed to enter. `None` means anyone may.
    #[serde(default, alias = "access")]
    pub requires: Option<Role>,

    /// Keep this route out of navigation menus.
    #[serde(default)]
    pub hide_in_menu: bool,
}

impl RouteRecord {
    /// A public, visible route.
    pub fn new(path: impl Into<String>, component: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: None,
            component: component.into(),
            requires: None,
            hide_in_menu: false,
        }
    }

    /// Gives the route a name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Restricts the route to `role` and above.
    pub fn requires(mut self, role: Role) -> Self {
        self.requires = Some(role);
        self
    }

    /// Hides the route from menus. It can still be navigated to.
    pub fn hidden(mut self) -> Self {
        self.hide_in_menu = true;
        self
    }
}

// ---------------------------------------------------------------------------
// Pattern
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
    CatchAll,
}

/// A compiled path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Pattern(Vec<Segment>);

impl Pattern {
    fn compile(path: &str) -> Result<Self, RouterError> {
        let invalid = |reason: &str| RouterError::InvalidPath {
            path: path.to_string(),
            reason: reason.to_string(),
        };

        if !path.starts_with('/') {
            return Err(invalid("must start with '/'"));
        }

        let raw: Vec<&str> = split_path(path).collect();
        let mut segments = Vec::with_capacity(raw.len());
        for (index, segment) in raw.iter().enumerate() {
            let compiled = if *segment == CATCH_ALL {
                if index + 1 != raw.len() {
                    return Err(invalid("'*' is only allowed as the last segment"));
                }
                Segment::CatchAll
            } else if let Some(name) = segment.strip_prefix(':') {
                if name.is_empty() {
                    return Err(invalid("parameter segment needs a name"));
                }
                Segment::Param(name.to_string())
            } else {
                Segment::Literal(segment.to_string())
            };
            segments.push(compiled);
        }
        Ok(Self(segments))
    }

    /// Matches `path` against the pattern, returning captured params.
    fn captures(&self, path: &str) -> Option<BTreeMap<String, String>> {
        let mut params = BTreeMap::new();
        let mut parts = split_path(path);

        for segment in &self.0 {
            match segment {
                Segment::CatchAll => {
                    let rest: Vec<&str> = parts.by_ref().collect();
                    params.insert(CATCH_ALL.to_string(), rest.join("/"));
                    return Some(params);
                }
                Segment::Literal(literal) => {
                    if parts.next()? != literal.as_str() {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    params.insert(name.clone(), parts.next()?.to_string());
                }
            }
        }

        // Every segment of the path must be consumed.
        parts.next().is_none().then_some(params)
    }
}

/// Path segments, ignoring empty ones (so `/a//b/` is `a`, `b`).
fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

// ---------------------------------------------------------------------------
// RouteMatch
// ---------------------------------------------------------------------------

/// The result of resolving a path against the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    /// The record that matched.
    pub record: &'a RouteRecord,

    /// Captured `:param` values, plus [`CATCH_ALL`] for a catch-all.
    pub params: BTreeMap<String, String>,
}

impl RouteMatch<'_> {
    /// A captured parameter by name.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

// ---------------------------------------------------------------------------
// RouteCatalog
// ---------------------------------------------------------------------------

/// The validated, ordered list of routes.
///
/// Declaration order matters: [`resolve`](Self::resolve) returns the first
/// match, so a catch-all belongs at the end.
#[derive(Debug, Clone)]
pub struct RouteCatalog {
    routes: Vec<(RouteRecord, Pattern)>,
}

impl RouteCatalog {
    /// Validates and compiles `records`.
    ///
    /// A requirement of [`Role::NotLogin`] is normalised to `None`: every
    /// visitor holds at least that role.
    ///
    /// # Errors
    /// - [`RouterError::EmptyCatalog`] if there are no records
    /// - [`RouterError::InvalidPath`] for a malformed path pattern
    /// - [`RouterError::DuplicatePath`] / [`RouterError::DuplicateName`]
    pub fn new(records: impl IntoIterator<Item = RouteRecord>) -> Result<Self, RouterError> {
        let mut routes: Vec<(RouteRecord, Pattern)> = Vec::new();

        for mut record in records {
            let pattern = Pattern::compile(&record.path)?;

            if routes.iter().any(|(existing, _)| existing.path == record.path) {
                return Err(RouterError::DuplicatePath(record.path));
            }
            if let Some(name) = &record.name {
                if routes.iter().any(|(existing, _)| existing.name.as_ref() == Some(name)) {
                    return Err(RouterError::DuplicateName(name.clone()));
                }
            }

            if record.requires == Some(Role::NotLogin) {
                tracing::debug!(path = %record.path, "notLogin requirement treated as public");
                record.requires = None;
            }
            routes.push((record, pattern));
        }

        if routes.is_empty() {
            return Err(RouterError::EmptyCatalog);
        }
        Ok(Self { routes })
    }

    /// The first route whose pattern matches `path`, with its captures.
    ///
    /// Only the path is matched: pass [`Location::path`](crate::Location),
    /// not a string with a query attached.
    pub fn resolve(&self, path: &str) -> Option<RouteMatch<'_>> {
        self.routes.iter().find_map(|(record, pattern)| {
            pattern
                .captures(path)
                .map(|params| RouteMatch { record, params })
        })
    }

    /// The requirement for `path`. Unknown paths have none.
    pub fn requirement_for(&self, path: &str) -> Option<Role> {
        self.resolve(path).and_then(|found| found.record.requires)
    }

    /// The record declared with exactly this path (no pattern matching).
    pub fn get(&self, path: &str) -> Option<&RouteRecord> {
        self.records().find(|record| record.path == path)
    }

    /// The record with this name.
    pub fn by_name(&self, name: &str) -> Option<&RouteRecord> {
        self.records().find(|record| record.name.as_deref() == Some(name))
    }

    /// Routes to show in a menu for `role`: not hidden, and enterable.
    pub fn menu_for(&self, role: Role) -> Vec<&RouteRecord> {
        self.records()
            .filter(|record| !record.hide_in_menu && check_access(record.requires, role))
            .collect()
    }

    /// All records, in declaration order.
    pub fn records(&self) -> impl Iterator<Item = &RouteRecord> {
        self.routes.iter().map(|(record, _)| record)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
