use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};

use super::subscription::Subscription;
use crate::error::{StoreError, UpdateSource};
use crate::state::StoreState;

type Updater<S> = Box<dyn FnOnce(&S) -> Result<S, UpdateSource> + Send>;
pub(crate) type Effect<S> = Box<dyn FnOnce(&Arc<S>) + Send>;
type Callback = Arc<dyn Fn() + Send + Sync>;

/// Whether a write was applied before the call returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The snapshot was swapped and subscribers were notified.
    Applied,
    /// Issued while another write was notifying; queued behind it.
    Deferred,
}

struct Write<S> {
    updater: Updater<S>,
    /// Runs right after the swap, before subscribers hear about it.
    effect: Option<Effect<S>>,
}

struct Subscriber {
    id: u64,
    active: Arc<AtomicBool>,
    callback: Callback,
}

struct WriteQueue<S> {
    draining: bool,
    pending: VecDeque<Write<S>>,
}

struct StoreInner<S> {
    snapshot: RwLock<Arc<S>>,
    subscribers: Mutex<Vec<Subscriber>>,
    writes: Mutex<WriteQueue<S>>,
    next_subscriber: AtomicU64,
    version: AtomicU64,
}

/// Shared state container handle.
///
/// Cloning is cheap and every clone observes the same state.
pub struct Store<S: StoreState> {
    inner: Arc<StoreInner<S>>,
}

impl<S: StoreState> Clone for Store<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: StoreState> Default for Store<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S: StoreState> Store<S> {
    pub fn new(initial: S) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                snapshot: RwLock::new(Arc::new(initial)),
                subscribers: Mutex::new(Vec::new()),
                writes: Mutex::new(WriteQueue {
                    draining: false,
                    pending: VecDeque::new(),
                }),
                next_subscriber: AtomicU64::new(0),
                version: AtomicU64::new(0),
            }),
        }
    }

    /// Current snapshot.
    ///
    /// Two calls with no write in between return the same `Arc`.
    pub fn get(&self) -> Arc<S> {
        Arc::clone(&self.inner.snapshot.read())
    }

    /// Number of writes committed so far.
    pub fn version(&self) -> u64 {
        self.inner.version.load(Ordering::SeqCst)
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.lock().len()
    }

    /// Replace the state with `updater(current)` and notify subscribers.
    ///
    /// `updater` must be a pure function of the previous state.
    pub fn set<F>(&self, updater: F) -> WriteOutcome
    where
        F: FnOnce(&S) -> S + Send + 'static,
    {
        self.set_then(updater, None)
    }

    /// Like [`set`](Self::set) for updaters that can fail.
    ///
    /// On failure the snapshot is left unchanged and no subscriber runs.
    /// A failure in a write that had to be queued cannot reach this caller;
    /// it is logged and dropped when the queue drains.
    pub fn try_set<F, E>(&self, updater: F) -> Result<WriteOutcome, StoreError>
    where
        F: FnOnce(&S) -> Result<S, E> + Send + 'static,
        E: Into<UpdateSource>,
    {
        self.try_set_then(updater, None)
    }

    pub(crate) fn set_then<F>(&self, updater: F, effect: Option<Effect<S>>) -> WriteOutcome
    where
        F: FnOnce(&S) -> S + Send + 'static,
    {
        let write = Write {
            updater: Box::new(move |state| Ok(updater(state))),
            effect,
        };
        // Only the updater can fail, and this one cannot.
        self.submit(write).unwrap_or(WriteOutcome::Applied)
    }

    pub(crate) fn try_set_then<F, E>(
        &self,
        updater: F,
        effect: Option<Effect<S>>,
    ) -> Result<WriteOutcome, StoreError>
    where
        F: FnOnce(&S) -> Result<S, E> + Send + 'static,
        E: Into<UpdateSource>,
    {
        let write = Write {
            updater: Box::new(move |state| updater(state).map_err(Into::into)),
            effect,
        };
        self.submit(write)
            .map_err(|source| StoreError::UpdateFailed {
                domain: None,
                source,
            })
    }

    /// Register `callback` to run after every committed write.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = self.inner.next_subscriber.fetch_add(1, Ordering::Relaxed);
        let active = Arc::new(AtomicBool::new(true));
        self.inner.subscribers.lock().push(Subscriber {
            id,
            active: Arc::clone(&active),
            callback: Arc::new(callback),
        });

        let store: Weak<StoreInner<S>> = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            active.store(false, Ordering::SeqCst);
            if let Some(inner) = store.upgrade() {
                inner.subscribers.lock().retain(|s| s.id != id);
            }
        })
    }

    fn submit(&self, write: Write<S>) -> Result<WriteOutcome, UpdateSource> {
        {
            let mut queue = self.inner.writes.lock();
            if queue.draining {
                queue.pending.push_back(write);
                return Ok(WriteOutcome::Deferred);
            }
            queue.draining = true;
        }

        // A panicking updater or subscriber must not wedge the queue.
        let inner = Arc::clone(&self.inner);
        let _reset = scopeguard::guard_on_unwind((), move |()| {
            let mut queue = inner.writes.lock();
            let dropped = queue.pending.len();
            queue.pending.clear();
            queue.draining = false;
            if dropped > 0 {
                tracing::warn!(dropped, "Discarded queued writes after a panic during update");
            }
        });

        let first = self.apply(write);
        while let Some(write) = self.next_pending() {
            if let Err(error) = self.apply(write) {
                tracing::warn!(error = %error, "Deferred state update failed, state unchanged");
            }
        }

        first.map(|()| WriteOutcome::Applied)
    }

    /// Pop the next queued write, or end the drain if there is none.
    fn next_pending(&self) -> Option<Write<S>> {
        let mut queue = self.inner.writes.lock();
        let next = queue.pending.pop_front();
        if next.is_none() {
            queue.draining = false;
        }
        next
    }

    fn apply(&self, write: Write<S>) -> Result<(), UpdateSource> {
        let current = self.get();
        let next = Arc::new((write.updater)(&current)?);
        *self.inner.snapshot.write() = Arc::clone(&next);
        self.inner.version.fetch_add(1, Ordering::SeqCst);

        if let Some(effect) = write.effect {
            effect(&next);
        }
        self.notify();
        Ok(())
    }

    fn notify(&self) {
        let round: Vec<(Arc<AtomicBool>, Callback)> = self
            .inner
            .subscribers
            .lock()
            .iter()
            .map(|s| (Arc::clone(&s.active), Arc::clone(&s.callback)))
            .collect();

        for (active, callback) in round {
            // Unsubscribed earlier in this round.
            if active.load(Ordering::SeqCst) {
                callback();
            }
        }
    }
}
