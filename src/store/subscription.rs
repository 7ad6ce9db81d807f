//! RAII handle for a registered subscriber.

use parking_lot::Mutex;

type Detach = Box<dyn FnOnce() + Send>;

/// Keeps a subscriber registered until dropped or unsubscribed.
///
/// Tie one to the lifetime of the consuming component: when the component
/// unmounts, dropping its `Subscription` removes the callback from the store.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    detach: Mutex<Option<Detach>>,
}

impl Subscription {
    pub(crate) fn new(detach: impl FnOnce() + Send + 'static) -> Self {
        Self {
            detach: Mutex::new(Some(Box::new(detach))),
        }
    }

    /// Remove the subscriber. Calling this more than once is a no-op.
    pub fn unsubscribe(&self) {
        let detach = self.detach.lock().take();
        if let Some(detach) = detach {
            detach();
        }
    }

    /// Whether the subscriber is still registered through this handle.
    pub fn is_active(&self) -> bool {
        self.detach.lock().is_some()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}
