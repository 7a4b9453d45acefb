//! Observer registration: callbacks fired on every session transition.
//!
//! Callbacks are kept in registration order and called synchronously.
//! The list lock is released before any callback runs, so a callback may
//! read the store, subscribe another observer, or drop its own
//! [`Subscription`] without deadlocking.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::SessionState;

/// A registered callback.
pub(crate) type Callback = Arc<dyn Fn(&SessionState) + Send + Sync>;

/// The ordered list of observers. Shared between the store and every
/// outstanding [`Subscription`].
#[derive(Default)]
pub(crate) struct ObserverList {
    next_id: u64,
    entries: Vec<(u64, Callback)>,
}

/// Shared handle to the observer list.
pub(crate) type Observers = Arc<Mutex<ObserverList>>;

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panicking observer poisons nothing we rely on: the list and the
    // slots guarded here are valid after any partial update.
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ObserverList {
    fn insert(&mut self, callback: Callback) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, callback));
        id
    }

    fn remove(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Registers `callback` and returns the handle that keeps it alive.
pub(crate) fn subscribe(
    observers: &Observers,
    callback: impl Fn(&SessionState) + Send + Sync + 'static,
) -> Subscription {
    let id = lock(observers).insert(Arc::new(callback));
    Subscription {
        id,
        observers: Arc::downgrade(observers),
    }
}

/// Calls every observer, in registration order, with `state`.
pub(crate) fn notify(observers: &Observers, state: &SessionState) {
    // Snapshot the callbacks (cheap `Arc` clones), then release the lock.
    let callbacks: Vec<Callback> = lock(observers)
        .entries
        .iter()
        .map(|(_, callback)| Arc::clone(callback))
        .collect();

    for callback in callbacks {
        callback(state);
    }
}

/// Keeps an observer registered.
///
/// Dropping the subscription unregisters the callback, so hold on to it
/// for as long as you want notifications. `Weak` is used so that an
/// outstanding subscription doesn't keep the store's observer list alive
/// after the store itself is gone.
#[must_use = "dropping a Subscription unregisters the observer immediately"]
pub struct Subscription {
    id: u64,
    observers: Weak<Mutex<ObserverList>>,
}

impl Subscription {
    /// Unregisters the observer now.
    ///
    /// Equivalent to dropping the handle; provided for readability at
    /// call sites.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(observers) = self.observers.upgrade() {
            lock(&observers).remove(self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
