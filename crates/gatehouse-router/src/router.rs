//! Hash-history router: a stack of committed locations, with every
//! navigation passing through the [`NavigationGuard`] first.

use gatehouse_session::UserDirectory;

use crate::{Location, NavigationGuard, NavigationOutcome, RouteMatch};

/// Navigates between locations and remembers where it has been.
///
/// The history only ever holds locations the guard let through (or sent
/// the navigation to). Nothing is committed until the guard has decided.
pub struct Router<D: UserDirectory> {
    guard: NavigationGuard<D>,
    initial: Location,
    history: Vec<Location>,
}

impl<D: UserDirectory> Router<D> {
    /// Creates a router with an empty history. Call [`start`](Self::start)
    /// to navigate to `initial`.
    pub fn new(guard: NavigationGuard<D>, initial: impl Into<Location>) -> Self {
        Self {
            guard,
            initial: initial.into(),
            history: Vec::new(),
        }
    }

    /// Navigates to the initial location.
    pub async fn start(&mut self) -> NavigationOutcome {
        let initial = self.initial.clone();
        self.push(initial).await
    }

    /// Navigates to `target`, pushing the resulting location onto the
    /// history. On denial, the redirect target is pushed instead.
    pub async fn push(&mut self, target: impl Into<Location>) -> NavigationOutcome {
        let outcome = self.guard.guard(target).await;
        self.commit(outcome.location().clone());
        outcome
    }

    /// Like [`push`](Self::push), but replaces the current entry instead of
    /// adding one.
    pub async fn replace(&mut self, target: impl Into<Location>) -> NavigationOutcome {
        let outcome = self.guard.guard(target).await;
        self.history.pop();
        self.commit(outcome.location().clone());
        outcome
    }

    /// Goes back one entry.
    ///
    /// The previous entry is guarded again, since the session may have
    /// changed since it was committed. Returns `None` when there is
    /// nothing to go back to.
    pub async fn back(&mut self) -> Option<NavigationOutcome> {
        if self.history.len() < 2 {
            return None;
        }
        self.history.pop();
        let previous = self.history.pop()?;
        Some(self.push(previous).await)
    }

    /// Re-runs the guard on the current location and replaces it with the
    /// result. Used after the session changes, e.g. on logout.
    pub async fn revalidate(&mut self) -> Option<NavigationOutcome> {
        let current = self.current()?.clone();
        Some(self.replace(current).await)
    }

    fn commit(&mut self, location: Location) {
        tracing::info!(%location, depth = self.history.len() + 1, "navigation committed");
        self.history.push(location);
    }

    /// The committed location, if any navigation has happened.
    pub fn current(&self) -> Option<&Location> {
        self.history.last()
    }

    /// The catalog entry for the current location.
    pub fn current_route(&self) -> Option<RouteMatch<'_>> {
        self.guard.catalog().resolve(&self.current()?.path)
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn history(&self) -> &[Location] {
        &self.history
    }

    pub fn guard(&self) -> &NavigationGuard<D> {
        &self.guard
    }
}
