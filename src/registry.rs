//! Session-wide registry: the one place that owns the store.
//!
//! Consumers never hold the raw [`Store`]; they ask [`Domains`] for a typed
//! accessor or hook. The registry also keeps the seed ledger (which domains
//! the user has edited, which durable slots were already restored) that the
//! seeding rule needs, since that bookkeeping is not part of the state.

use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

use crate::accessor::{DomainAccessor, DomainHook, StaffRoster};
use crate::config::{StorageBackend, StoreConfig};
use crate::domain::{ApplicationState, Domain, DomainKey};
use crate::durable::{DurableStorage, FileStorage, MemoryStorage};
use crate::error::DurableError;
use crate::store::{Store, Subscription};

static GLOBAL: OnceLock<Domains> = OnceLock::new();

/// Handle to the session's state container.
///
/// Cloning is cheap; all clones share the same store and ledger.
#[derive(Clone)]
pub struct Domains {
    inner: Arc<DomainsInner>,
}

struct DomainsInner {
    store: Store<ApplicationState>,
    ledger: Mutex<SeedLedger>,
    storage: Arc<dyn DurableStorage>,
    config: StoreConfig,
}

#[derive(Default)]
struct SeedLedger {
    /// Domains changed by the user (or restored from durable storage).
    edited: HashSet<DomainKey>,
    /// Persisted domains whose durable slot has been read this session.
    restored: HashSet<DomainKey>,
}

impl Domains {
    /// Fresh container with every domain at its default.
    pub fn new(config: StoreConfig, storage: Arc<dyn DurableStorage>) -> Self {
        Self {
            inner: Arc::new(DomainsInner {
                store: Store::new(ApplicationState::default()),
                ledger: Mutex::new(SeedLedger::default()),
                storage,
                config,
            }),
        }
    }

    /// Default config, in-memory durable storage.
    pub fn in_memory() -> Self {
        Self::new(StoreConfig::default(), Arc::new(MemoryStorage::new()))
    }

    /// Build with the storage backend `config` selects.
    pub fn from_config(config: StoreConfig) -> Result<Self, DurableError> {
        let storage: Arc<dyn DurableStorage> = match config.storage.backend {
            StorageBackend::Memory => Arc::new(MemoryStorage::new()),
            StorageBackend::File => {
                let dir = config
                    .storage
                    .dir
                    .clone()
                    .unwrap_or_else(FileStorage::default_dir);
                Arc::new(FileStorage::open(dir)?)
            }
        };
        Ok(Self::new(config, storage))
    }

    /// The process-wide instance. Created in memory on first use unless
    /// [`install_global`](Self::install_global) ran first.
    pub fn global() -> &'static Domains {
        GLOBAL.get_or_init(Domains::in_memory)
    }

    /// Install the process-wide instance. Fails, handing `domains` back, if
    /// one already exists.
    pub fn install_global(domains: Domains) -> Result<(), Domains> {
        GLOBAL.set(domains)
    }

    pub fn store(&self) -> &Store<ApplicationState> {
        &self.inner.store
    }

    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    pub fn storage(&self) -> &dyn DurableStorage {
        self.inner.storage.as_ref()
    }

    pub fn snapshot(&self) -> Arc<ApplicationState> {
        self.inner.store.get()
    }

    pub fn accessor<D: Domain>(&self) -> DomainAccessor<D> {
        DomainAccessor::new(self.clone())
    }

    /// Per-component hook; create one per mounted consumer.
    pub fn hook<D: Domain>(&self) -> DomainHook<D> {
        DomainHook::new(self.accessor())
    }

    pub fn staff_roster(&self) -> StaffRoster {
        StaffRoster::new(self.clone())
    }

    pub fn is_client_phase(&self) -> bool {
        self.inner.store.get().is_client_phase
    }

    /// Mark that the runtime now executes in the browser and the first
    /// paint is done. Only the first call writes; returns whether it did.
    pub fn enter_client_phase(&self) -> bool {
        if self.is_client_phase() {
            return false;
        }
        self.inner.store.set(|state| {
            if state.is_client_phase {
                state.clone()
            } else {
                state.with_client_phase()
            }
        });
        tracing::info!("Entered client phase");
        true
    }

    /// Run `callback` after every committed write to any domain.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.inner.store.subscribe(callback)
    }

    /// Durable storage key for a domain: `{namespace}:{domain}`.
    pub fn storage_key(&self, key: DomainKey) -> String {
        format!("{}:{}", self.inner.config.storage.namespace, key)
    }

    pub fn is_edited(&self, key: DomainKey) -> bool {
        self.inner.ledger.lock().edited.contains(&key)
    }

    /// Domains the user has changed this session, in table order.
    pub fn edited_domains(&self) -> Vec<DomainKey> {
        let ledger = self.inner.ledger.lock();
        DomainKey::all()
            .iter()
            .copied()
            .filter(|key| ledger.edited.contains(key))
            .collect()
    }

    pub(crate) fn mark_edited(&self, key: DomainKey) {
        self.inner.ledger.lock().edited.insert(key);
    }

    pub(crate) fn clear_edited(&self, key: DomainKey) {
        self.inner.ledger.lock().edited.remove(&key);
    }

    /// Record a restore attempt. True only for the first attempt per domain.
    pub(crate) fn begin_restore(&self, key: DomainKey) -> bool {
        self.inner.ledger.lock().restored.insert(key)
    }
}
