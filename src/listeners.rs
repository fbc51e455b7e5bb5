// Change listeners for the tree view. A listener receives the ids of the
// items whose children changed and is expected to re-fetch them.

use crate::tree::TreeItemId;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

pub type TreeChangeListener = Arc<dyn Fn(&[TreeItemId]) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, TreeChangeListener)>,
}

/// Listener list owned by one provider.
#[derive(Clone, Default)]
pub struct ListenerRegistry {
    inner: Arc<Mutex<Registry>>,
}

/// Registration token. Dropping it, or calling [`Subscription::dispose`],
/// removes the listener; doing so more than once is harmless.
#[must_use = "the listener is removed as soon as the subscription is dropped"]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    // Listeners never run under the lock, so a poisoned lock still holds a valid list
    registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ListenerRegistry {
    pub fn new() -> ListenerRegistry {
        ListenerRegistry::default()
    }

    pub fn register(&self, listener: TreeChangeListener) -> Subscription {
        let mut registry = lock(&self.inner);
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push((id, listener));
        tracing::debug!(listener = id, "Registered tree change listener");
        Subscription {
            id,
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Call every registered listener with `changed`. A panicking listener is
    /// logged and skipped; the others still run.
    pub fn notify(&self, changed: &[TreeItemId]) {
        let listeners: Vec<(u64, TreeChangeListener)> = lock(&self.inner).listeners.clone();
        for (id, listener) in listeners {
            let result = catch_unwind(AssertUnwindSafe(|| listener(changed)));
            if result.is_err() {
                tracing::error!(listener = id, ?changed, "Tree change listener panicked");
            }
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.inner).listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Subscription {
    pub fn dispose(&self) {
        if let Some(registry) = self.registry.upgrade() {
            let mut registry = lock(&registry);
            let before = registry.listeners.len();
            registry.listeners.retain(|(id, _)| *id != self.id);
            if registry.listeners.len() != before {
                tracing::debug!(listener = self.id, "Removed tree change listener");
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.dispose();
    }
}
