//! The navigation guard: runs before every navigation and decides whether
//! it goes through.
//!
//! ```text
//! navigation request
//!     │
//!     ▼
//! session unknown? ──yes──→ fetch it (or join the fetch already running)
//!     │                            │
//!     ▼ ◄──────────────────────────┘
//! evaluate(requirement of target, current role)
//!     │
//!     ├── Allow                 → Allowed(target)
//!     ├── DenyUnauthenticated   → Redirected(login?redirect=target)
//!     └── DenyInsufficientRole  → Redirected(forbidden)
//! ```

use std::sync::Arc;

use gatehouse_access::{evaluate, Decision};
use gatehouse_session::{SessionStatus, SessionStore, UserDirectory};

use crate::{GuardConfig, GuardPhase, Location, RouteCatalog, RouterError};

// ---------------------------------------------------------------------------
// NavigationOutcome
// ---------------------------------------------------------------------------

/// What the guard decided for one navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// The navigation goes through unchanged.
    Allowed { to: Location },

    /// The navigation was turned away and sent elsewhere.
    Redirected {
        /// Where the navigation wanted to go.
        from: Location,
        /// Where it was sent instead.
        to: Location,
        /// Why.
        decision: Decision,
    },
}

impl NavigationOutcome {
    /// The location the router should commit.
    pub fn location(&self) -> &Location {
        match self {
            Self::Allowed { to } | Self::Redirected { to, .. } => to,
        }
    }

    /// The terminal phase this attempt reached.
    pub fn phase(&self) -> GuardPhase {
        match self {
            Self::Allowed { .. } => GuardPhase::Allowed,
            Self::Redirected { .. } => GuardPhase::Redirected,
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    /// The access decision behind this outcome.
    pub fn decision(&self) -> Decision {
        match self {
            Self::Allowed { .. } => Decision::Allow,
            Self::Redirected { decision, .. } => *decision,
        }
    }
}

// ---------------------------------------------------------------------------
// NavigationGuard
// ---------------------------------------------------------------------------

/// Checks every navigation against the route catalog and the session.
///
/// The guard holds no per-navigation state: concurrent navigations are
/// independent, and all of them share the session store's single in-flight
/// refresh.
pub struct NavigationGuard<D: UserDirectory> {
    catalog: Arc<RouteCatalog>,
    store: SessionStore<D>,
    config: GuardConfig,
    login: Location,
    forbidden: Location,
}

impl<D: UserDirectory> Clone for NavigationGuard<D> {
    fn clone(&self) -> Self {
        Self {
            catalog: Arc::clone(&self.catalog),
            store: self.store.clone(),
            config: self.config.clone(),
            login: self.login.clone(),
            forbidden: self.forbidden.clone(),
        }
    }
}

impl<D: UserDirectory> NavigationGuard<D> {
    /// Creates a guard over `catalog`, reading roles from `store`.
    ///
    /// # Errors
    /// [`RouterError::InvalidCatalog`] if the login or forbidden route is
    /// not declared in the catalog, or is itself restricted (which would
    /// make every redirect loop).
    pub fn new(
        catalog: RouteCatalog,
        store: SessionStore<D>,
        config: GuardConfig,
    ) -> Result<Self, RouterError> {
        let login = redirect_target(&catalog, "login", &config.login_path)?;
        let forbidden = redirect_target(&catalog, "forbidden", &config.forbidden_path)?;

        Ok(Self {
            catalog: Arc::new(catalog),
            store,
            config,
            login,
            forbidden,
        })
    }

    /// Decides what happens to a navigation towards `to`.
    ///
    /// If the session is still unknown, this waits for it: an
    /// `Uninitialized` store is refreshed (once, however many navigations
    /// ask), and a `Loading` store is waited on without a new request. A
    /// failed refresh is logged and evaluation continues with whatever
    /// role the store then reports.
    pub async fn guard(&self, to: impl Into<Location>) -> NavigationOutcome {
        let to = to.into();
        let phase = step(&to, GuardPhase::Idle, GuardPhase::Evaluating);

        self.settle_session().await;

        let requirement = self.catalog.requirement_for(&to.path);
        let role = self.store.current_role();
        let decision = evaluate(requirement, role);
        tracing::debug!(%to, ?requirement, %role, %decision, "navigation evaluated");

        match decision {
            Decision::Allow => {
                step(&to, phase, GuardPhase::Allowed);
                NavigationOutcome::Allowed { to }
            }
            Decision::DenyUnauthenticated => {
                step(&to, phase, GuardPhase::Redirected);
                let target = self.login.with_redirect(&to);
                tracing::info!(from = %to, to = %target, %decision, "redirecting to login");
                NavigationOutcome::Redirected {
                    from: to,
                    to: target,
                    decision,
                }
            }
            Decision::DenyInsufficientRole => {
                step(&to, phase, GuardPhase::Redirected);
                let target = self.forbidden.clone();
                tracing::info!(from = %to, to = %target, %role, %decision, "redirecting to forbidden page");
                NavigationOutcome::Redirected {
                    from: to,
                    to: target,
                    decision,
                }
            }
        }
    }

    /// Waits until the store holds an answer (or a failed attempt).
    async fn settle_session(&self) {
        let result = match self.store.status() {
            SessionStatus::Uninitialized => {
                tracing::debug!("session unknown, fetching before evaluating");
                self.store.refresh_session().await
            }
            SessionStatus::Loading => match self.store.in_flight() {
                Some(pending) => {
                    tracing::debug!("session loading, joining the in-flight refresh");
                    pending.await
                }
                None => {
                    // The refresh has resolved but its state isn't applied yet.
                    let mut states = self.store.watch();
                    if let Err(err) = states
                        .wait_for(|state| state.status() != SessionStatus::Loading)
                        .await
                    {
                        tracing::warn!(error = %err, "session store closed while loading");
                    }
                    return;
                }
            },
            SessionStatus::Authenticated | SessionStatus::Anonymous => return,
        };

        if let Err(err) = result {
            tracing::warn!(error = %err, "session refresh failed, evaluating with current role");
        }
    }

    pub fn catalog(&self) -> &RouteCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &SessionStore<D> {
        &self.store
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// The login page, without a redirect attached.
    pub fn login_location(&self) -> &Location {
        &self.login
    }

    pub fn forbidden_location(&self) -> &Location {
        &self.forbidden
    }
}

/// Validates a configured redirect path against the catalog.
fn redirect_target(
    catalog: &RouteCatalog,
    what: &str,
    path: &str,
) -> Result<Location, RouterError> {
    let location = Location::parse(path);
    match catalog.get(&location.path) {
        None => Err(RouterError::InvalidCatalog(format!(
            "{what} route {} is not in the catalog",
            location.path
        ))),
        Some(record) => match record.requires {
            Some(role) => Err(RouterError::InvalidCatalog(format!(
                "{what} route {} must be public, but requires {role}",
                location.path
            ))),
            None => Ok(location),
        },
    }
}

/// Records one phase step for a navigation.
fn step(to: &Location, from: GuardPhase, next: GuardPhase) -> GuardPhase {
    debug_assert!(from.can_transition_to(next), "bad guard step {from} -> {next}");
    tracing::trace!(%to, phase = %next, "guard phase");
    next
}
