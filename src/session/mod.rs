//! Process-lifetime cache of the server's view of "who is logged in".
//!
//! The store owns the only piece of shared mutable state in the console: the
//! current identity plus a monotonically incrementing change token. Every
//! mutation notifies the registered listeners synchronously, in registration
//! order, before the mutator returns, so no listener ever observes a torn
//! state. The store itself never touches the network and cannot fail;
//! callers decide what state to set based on network outcomes.

use crate::api::types::User;
use std::sync::{Arc, Mutex, Weak};
use tracing::error;

/// Snapshot handed to listeners on every change.
#[derive(Clone, Debug)]
pub struct Session {
    /// Current identity; `None` means unauthenticated.
    pub identity: Option<User>,
    /// Change token; listeners compare it to detect stale reads.
    pub version: u64,
}

type Listener = Arc<dyn Fn(&Session) -> anyhow::Result<()> + Send + Sync>;

struct Inner {
    identity: Option<User>,
    version: u64,
    listeners: Vec<(u64, Listener)>,
    next_listener_id: u64,
}

/// Observer/subject holder of the authenticated session.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Mutex<Inner>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                identity: None,
                version: 0,
                listeners: Vec::new(),
                next_listener_id: 0,
            })),
        }
    }

    /// Cached identity, no network access.
    #[must_use]
    pub fn current_identity(&self) -> Option<User> {
        self.lock().identity.clone()
    }

    /// Current change token.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.lock().version
    }

    /// Install an identity and notify every listener before returning.
    pub fn set_identity(&self, identity: User) {
        let (snapshot, listeners) = {
            let mut inner = self.lock();
            inner.identity = Some(identity);
            inner.version += 1;
            (
                Session {
                    identity: inner.identity.clone(),
                    version: inner.version,
                },
                inner.listeners.clone(),
            )
        };
        notify(&snapshot, &listeners);
    }

    /// Drop the identity and notify every listener before returning.
    pub fn clear_identity(&self) {
        let (snapshot, listeners) = {
            let mut inner = self.lock();
            inner.identity = None;
            inner.version += 1;
            (
                Session {
                    identity: None,
                    version: inner.version,
                },
                inner.listeners.clone(),
            )
        };
        notify(&snapshot, &listeners);
    }

    /// Register a listener invoked after every mutation, in registration
    /// order. The returned handle unsubscribes; dropping it without calling
    /// `unsubscribe` keeps the listener registered for the life of the
    /// store.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Session) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let mut inner = self.lock();
        let id = inner.next_listener_id;
        inner.next_listener_id += 1;
        inner.listeners.push((id, Arc::new(listener)));
        Subscription {
            inner: Arc::downgrade(&self.inner),
            id,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned lock only means some caller panicked outside the
        // critical section; the state itself is intact.
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Invoke listeners outside the lock so a listener may subscribe or
/// unsubscribe while a notification is in progress.
fn notify(snapshot: &Session, listeners: &[(u64, Listener)]) {
    for (id, listener) in listeners {
        if let Err(err) = listener(snapshot) {
            error!("session listener {id} failed: {err}");
        }
    }
}

/// Handle released by a component on teardown. `unsubscribe` is idempotent
/// and safe to call during a notification in progress.
pub struct Subscription {
    inner: Weak<Mutex<Inner>>,
    id: u64,
}

impl Subscription {
    pub fn unsubscribe(&self) {
        if let Some(inner) = self.inner.upgrade() {
            let mut inner = inner
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            inner.listeners.retain(|(id, _)| *id != self.id);
        }
    }
}
