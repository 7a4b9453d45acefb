//! The session store: the single source of truth for "who is logged in".
//!
//! This is the central piece of the session layer. It's responsible for:
//! - Asking the [`UserDirectory`] who is logged in, and applying the answer
//! - Coalescing concurrent refreshes into one request
//! - Logging out
//! - Telling observers about every transition, in order, exactly once
//!
//! # Concurrency note
//!
//! `SessionStore` is a cheap handle (`Arc` inside), so every part of the
//! application that needs the session gets a clone of the SAME store. No
//! global: whoever builds the application owns the store and passes it
//! along.
//!
//! Three small locks, none of them held across an `.await`:
//! - `transitions` — serializes "apply new state + notify observers" so
//!   observers see transitions in the order they were applied.
//! - `inflight` — the coalescing slot. `Some` while a refresh runs.
//!   Only ever taken after `transitions`, or on its own for reads.
//! - the observer list lock (see [`observer`](crate::observer)).

use std::future::Future;
use std::sync::{Arc, Mutex};

use futures_util::future::{BoxFuture, FutureExt, Shared};
use gatehouse_protocol::{DirectoryReply, Identity, Role};
use tokio::sync::watch;

use crate::observer::{self, lock, Observers};
use crate::{
    DirectoryError, SessionConfig, SessionError, SessionState, SessionStatus, Subscription,
    UserDirectory,
};

/// What a refresh resolves to: the state it applied, or why it failed.
pub type RefreshResult = Result<SessionState, SessionError>;

/// A refresh shared between every caller that joined it.
type PendingRefresh = Shared<BoxFuture<'static, RefreshResult>>;

/// Holds the application's session and keeps it in sync with the
/// [`UserDirectory`].
///
/// ## Lifecycle
///
/// ```text
/// new() ──→ [Uninitialized] ──refresh_session()──→ [Loading]
///                                                     │
///                     ┌──────── ok reply ─────────────┤
///                     ▼                               ▼ rejected reply
///              [Authenticated] ──logout()──→    [Anonymous]
/// ```
///
/// Cloning the store clones the handle, not the state.
pub struct SessionStore<D: UserDirectory> {
    inner: Arc<Inner<D>>,
}

impl<D: UserDirectory> Clone for SessionStore<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<D> {
    directory: D,
    config: SessionConfig,

    /// The current state. A `watch` channel gives us synchronous reads
    /// (`borrow`) and lets async consumers await changes (`subscribe`).
    state: watch::Sender<SessionState>,

    observers: Observers,
    transitions: Mutex<()>,
    inflight: Mutex<Option<PendingRefresh>>,
}

impl<D: UserDirectory> SessionStore<D> {
    /// Creates a store in [`SessionState::Uninitialized`].
    ///
    /// Nothing is fetched until [`refresh_session`](Self::refresh_session)
    /// is called.
    pub fn new(directory: D, config: SessionConfig) -> Self {
        let (state, _) = watch::channel(SessionState::Uninitialized);
        Self {
            inner: Arc::new(Inner {
                directory,
                config,
                state,
                observers: Observers::default(),
                transitions: Mutex::new(()),
                inflight: Mutex::new(None),
            }),
        }
    }

    /// Creates a store with [`SessionConfig::default`].
    pub fn with_directory(directory: D) -> Self {
        Self::new(directory, SessionConfig::default())
    }

    // =====================================================================
    // Operations
    // =====================================================================

    /// Asks the directory who is logged in and applies the answer.
    ///
    /// The store moves to [`SessionState::Loading`] *now*, when this method
    /// is called, not when the returned future is first polled. Inside a
    /// Tokio runtime the request runs on its own task, so it completes and
    /// its answer is applied even if nobody awaits the returned future.
    /// Outside a runtime the request is sent when the future (or a joiner,
    /// see [`in_flight`](Self::in_flight)) is first awaited.
    ///
    /// Outcomes:
    /// - ok reply → [`SessionState::Authenticated`]
    /// - rejected reply → [`SessionState::Anonymous`] (`Ok`, not an error)
    /// - transport or validation failure → [`SessionError::Fetch`], and
    ///   the store goes back to the state it had before `Loading`
    ///
    /// # Coalescing
    ///
    /// If a refresh is already in flight, no new request is made: the
    /// returned future resolves with the in-flight request's result, and no
    /// extra `Loading` transition is emitted. Dropping a waiting future
    /// never cancels the request.
    ///
    /// # Observers
    ///
    /// The `Loading` notification runs after the coalescing slot is filled,
    /// so observers may read the store (including
    /// [`is_refreshing`](Self::is_refreshing)). Starting another store
    /// operation synchronously from inside a callback is not supported;
    /// spawn a task instead.
    pub fn refresh_session(&self) -> impl Future<Output = RefreshResult> + Send + 'static {
        let _serial = lock(&self.inner.transitions);

        let pending = {
            let mut slot = lock(&self.inner.inflight);
            if let Some(pending) = slot.as_ref() {
                tracing::debug!("refresh already in flight, joining it");
                return pending.clone();
            }

            let previous = self.inner.state.send_replace(SessionState::Loading);
            tracing::info!(from = %previous.status(), to = %SessionStatus::Loading, "session transition");

            let inner = Arc::clone(&self.inner);
            let pending = async move { inner.resolve_refresh(previous).await }
                .boxed()
                .shared();
            *slot = Some(pending.clone());

            match tokio::runtime::Handle::try_current() {
                Ok(runtime) => {
                    // Detached: callers join through `Shared`.
                    runtime.spawn(pending.clone());
                }
                Err(_) => tracing::debug!("no runtime, refresh runs when first awaited"),
            }
            pending
        };

        observer::notify(&self.inner.observers, &SessionState::Loading);
        pending
    }

    /// Ends the session at the directory and, on success, becomes
    /// [`SessionState::Anonymous`].
    ///
    /// The reset happens regardless of the previous state, and emits a
    /// transition even if the store was already anonymous.
    ///
    /// # Errors
    /// - [`SessionError::LogoutRejected`] — the directory answered with a
    ///   non-zero code
    /// - [`SessionError::Logout`] — the request failed
    ///
    /// In both cases the state is left untouched.
    pub async fn logout(&self) -> Result<(), SessionError> {
        match self.inner.directory.logout().await {
            Ok(DirectoryReply::Ok(())) => {
                self.inner.apply(SessionState::Anonymous);
                tracing::info!("logged out");
                Ok(())
            }
            Ok(DirectoryReply::Rejected { code, message }) => {
                tracing::warn!(code, message = message.as_deref(), "logout rejected");
                Err(SessionError::LogoutRejected { code, message })
            }
            Err(err) => {
                tracing::warn!(error = %err, "logout request failed");
                Err(SessionError::Logout(err))
            }
        }
    }

    // =====================================================================
    // Reads
    // =====================================================================

    /// The effective role. [`Role::NotLogin`] unless authenticated.
    ///
    /// Never triggers a fetch.
    pub fn current_role(&self) -> Role {
        self.inner.state.borrow().role()
    }

    /// A snapshot of the current state.
    pub fn state(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    /// The current lifecycle phase.
    pub fn status(&self) -> SessionStatus {
        self.inner.state.borrow().status()
    }

    /// The logged-in user, if any.
    pub fn identity(&self) -> Option<Identity> {
        self.inner.state.borrow().identity().cloned()
    }

    /// Returns `true` when a user is logged in.
    pub fn is_authenticated(&self) -> bool {
        self.status() == SessionStatus::Authenticated
    }

    /// Returns `true` while a refresh is in flight.
    pub fn is_refreshing(&self) -> bool {
        lock(&self.inner.inflight).is_some()
    }

    /// The refresh currently in flight, if any.
    ///
    /// Awaiting it joins the request without ever starting a new one.
    pub fn in_flight(&self) -> Option<impl Future<Output = RefreshResult> + Send + 'static> {
        lock(&self.inner.inflight).clone()
    }

    /// The name to show for the current user: the identity's name, or the
    /// configured anonymous label.
    pub fn display_name(&self) -> String {
        self.inner.state.borrow().identity().map_or_else(
            || self.inner.config.anonymous_display_name.clone(),
            |identity| identity.display_name.clone(),
        )
    }

    /// The store's configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    // =====================================================================
    // Observation
    // =====================================================================

    /// Registers `callback` to run on every transition.
    ///
    /// Callbacks run synchronously, in registration order, exactly once per
    /// transition, with the state that was just applied. The callback stays
    /// registered until the returned [`Subscription`] is dropped.
    ///
    /// Callbacks run while the store holds its transition lock. They may
    /// read the store and subscribe or unsubscribe, but must not call
    /// [`refresh_session`](Self::refresh_session) synchronously: that
    /// deadlocks. Spawn a task for it instead.
    pub fn subscribe(
        &self,
        callback: impl Fn(&SessionState) + Send + Sync + 'static,
    ) -> Subscription {
        observer::subscribe(&self.inner.observers, callback)
    }

    /// Number of registered observers.
    pub fn observer_count(&self) -> usize {
        lock(&self.inner.observers).len()
    }

    /// A receiver that always holds the latest state.
    ///
    /// Unlike [`subscribe`](Self::subscribe), a `watch` receiver may skip
    /// intermediate states if it falls behind. Use it for "render the
    /// latest", not for "count transitions".
    pub fn watch(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }
}

impl<D: UserDirectory> Inner<D> {
    /// Applies `next` and notifies observers.
    fn apply(&self, next: SessionState) {
        let _serial = lock(&self.transitions);
        self.transition(next);
    }

    /// Replaces the state and notifies observers.
    ///
    /// Caller must hold `transitions`.
    fn transition(&self, next: SessionState) {
        let previous = self.state.send_replace(next.clone());
        tracing::info!(from = %previous.status(), to = %next.status(), "session transition");
        observer::notify(&self.observers, &next);
    }

    /// Puts `previous` back, but only if the store is still `Loading`.
    ///
    /// If something else (a logout) landed while the request was in flight,
    /// that newer state wins. Caller must hold `transitions`.
    fn restore(&self, previous: SessionState) {
        if self.state.borrow().status() != SessionStatus::Loading {
            tracing::debug!("state moved on during failed refresh, not restoring");
            return;
        }
        self.state.send_replace(previous.clone());
        tracing::info!(to = %previous.status(), "session restored after failed refresh");
        observer::notify(&self.observers, &previous);
    }

    async fn resolve_refresh(self: Arc<Self>, previous: SessionState) -> RefreshResult {
        let reply = self.directory.current_user().await;
        self.settle(previous, reply)
    }

    /// Frees the coalescing slot and applies the answer in one critical
    /// section, so a refresh started afterwards always sees the result.
    fn settle(
        &self,
        previous: SessionState,
        reply: Result<DirectoryReply<Identity>, DirectoryError>,
    ) -> RefreshResult {
        let _serial = lock(&self.transitions);
        lock(&self.inflight).take();

        match reply {
            Ok(DirectoryReply::Ok(identity)) => {
                tracing::info!(user = %identity.display_name, role = %identity.role, "session authenticated");
                let next = SessionState::Authenticated(identity);
                self.transition(next.clone());
                Ok(next)
            }
            Ok(DirectoryReply::Rejected { code, .. }) => {
                tracing::info!(code, "directory reports no logged-in user");
                self.transition(SessionState::Anonymous);
                Ok(SessionState::Anonymous)
            }
            Err(err) => {
                tracing::warn!(error = %err, "session fetch failed");
                self.restore(previous);
                Err(SessionError::Fetch(err))
            }
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Unit tests for `SessionStore` internals. Scenario and concurrency
    //! tests live in `tests/session_store.rs`.

    use super::*;

    /// A directory that always answers the same way.
    struct Fixed(Result<DirectoryReply<Identity>, DirectoryError>);

    impl UserDirectory for Fixed {
        async fn current_user(&self) -> Result<DirectoryReply<Identity>, DirectoryError> {
            self.0.clone()
        }

        async fn logout(&self) -> Result<DirectoryReply<()>, DirectoryError> {
            Ok(DirectoryReply::Ok(()))
        }
    }

    fn store(reply: Result<DirectoryReply<Identity>, DirectoryError>) -> SessionStore<Fixed> {
        SessionStore::with_directory(Fixed(reply))
    }

    #[test]
    fn test_new_store_is_uninitialized() {
        let store = store(Ok(DirectoryReply::Ok(Identity::new("a", Role::User))));

        assert_eq!(store.status(), SessionStatus::Uninitialized);
        assert_eq!(store.current_role(), Role::NotLogin);
        assert!(!store.is_refreshing());
    }

    #[test]
    fn test_refresh_sets_loading_before_first_poll() {
        let store = store(Ok(DirectoryReply::Ok(Identity::new("a", Role::User))));

        let pending = store.refresh_session();

        assert_eq!(store.status(), SessionStatus::Loading);
        assert!(store.is_refreshing());
        drop(pending);
        // The slot keeps the request alive even with no waiter.
        assert!(store.is_refreshing());
    }

    #[tokio::test]
    async fn test_refresh_ok_reply_authenticates() {
        let store = store(Ok(DirectoryReply::Ok(Identity::new("alice", Role::Admin))));

        let applied = store.refresh_session().await.expect("should succeed");

        assert_eq!(applied, SessionState::Authenticated(Identity::new("alice", Role::Admin)));
        assert_eq!(store.current_role(), Role::Admin);
        assert_eq!(store.display_name(), "alice");
        assert!(!store.is_refreshing());
    }

    #[tokio::test]
    async fn test_refresh_from_uninitialized_failure_restores_uninitialized() {
        let store = store(Err(DirectoryError::Timeout));

        let result = store.refresh_session().await;

        assert!(matches!(result, Err(SessionError::Fetch(DirectoryError::Timeout))));
        assert_eq!(store.status(), SessionStatus::Uninitialized);
    }

    #[tokio::test]
    async fn test_refresh_called_before_yield_joins_same_request() {
        let store = store(Ok(DirectoryReply::Rejected { code: 1, message: None }));
        drop(store.refresh_session());

        let result = store.refresh_session().await;

        assert_eq!(result.unwrap(), SessionState::Anonymous);
        assert_eq!(store.status(), SessionStatus::Anonymous);
    }

    #[tokio::test]
    async fn test_unawaited_refresh_completes_on_its_own() {
        let store = store(Ok(DirectoryReply::Ok(Identity::new("carol", Role::User))));
        let mut rx = store.watch();

        drop(store.refresh_session());
        rx.wait_for(|state| state.status() != SessionStatus::Loading)
            .await
            .unwrap();

        assert_eq!(store.current_role(), Role::User);
        assert!(!store.is_refreshing());
    }

    #[test]
    fn test_refresh_outside_runtime_runs_when_awaited() {
        let store = store(Ok(DirectoryReply::Ok(Identity::new("dave", Role::Admin))));
        let pending = store.refresh_session();
        assert_eq!(store.status(), SessionStatus::Loading);

        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let applied = runtime.block_on(pending).unwrap();

        assert_eq!(applied.role(), Role::Admin);
        assert_eq!(store.status(), SessionStatus::Authenticated);
    }

    #[tokio::test]
    async fn test_in_flight_joins_without_new_request() {
        let store = store(Ok(DirectoryReply::Ok(Identity::new("bob", Role::User))));
        assert!(store.in_flight().is_none());

        let started = store.refresh_session();
        let joined = store.in_flight().expect("refresh should be in flight");

        let (a, b) = tokio::join!(started, joined);
        assert_eq!(a.unwrap(), b.unwrap());
        assert!(store.in_flight().is_none());
    }

    #[test]
    fn test_display_name_falls_back_to_config_label() {
        let store = SessionStore::new(
            Fixed(Err(DirectoryError::Timeout)),
            SessionConfig {
                anonymous_display_name: "Guest".into(),
            },
        );
        assert_eq!(store.display_name(), "Guest");
    }

    #[tokio::test]
    async fn test_watch_receiver_sees_latest_state() {
        let store = store(Ok(DirectoryReply::Rejected { code: 7, message: None }));
        let mut rx = store.watch();

        store.refresh_session().await.unwrap();

        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), SessionState::Anonymous);
    }

    #[test]
    fn test_clone_shares_state() {
        let store = store(Ok(DirectoryReply::Rejected { code: 1, message: None }));
        let other = store.clone();

        let _pending = store.refresh_session();

        assert_eq!(other.status(), SessionStatus::Loading);
        assert!(other.is_refreshing());
    }
}
