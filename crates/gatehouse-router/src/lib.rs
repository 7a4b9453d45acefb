//! Route catalog, navigation guard, and router for Gatehouse.
//!
//! Every navigation goes through the [`NavigationGuard`], which asks the
//! session store for the current role and the [`RouteCatalog`] for the
//! target's requirement, then lets the navigation through or redirects it.
//!
//! # Key types
//!
//! - [`RouteCatalog`] — validated route table with path matching
//! - [`Location`] — a hash-history location (path + query)
//! - [`NavigationGuard`] — the per-navigation access check
//! - [`Router`] — history stack driven by the guard
//! - [`GuardConfig`] — where denied navigations are sent

mod config;
mod error;
mod guard;
mod location;
mod route;
mod router;

pub use config::{GuardConfig, GuardPhase};
pub use error::RouterError;
pub use guard::{NavigationGuard, NavigationOutcome};
pub use location::{Location, REDIRECT_PARAM};
pub use route::{RouteCatalog, RouteMatch, RouteRecord, CATCH_ALL};
pub use router::Router;
