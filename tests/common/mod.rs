//! Shared test utilities.

#![allow(dead_code, unused_imports)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tempfile::TempDir;
use tenant_state::config::{StorageBackend, StoreConfig};
use tenant_state::domain::{CartItem, Product};
use tenant_state::Domains;

/// Counts callback invocations.
#[derive(Clone, Default)]
pub struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn callback(&self) -> impl Fn() + Send + Sync + 'static {
        let count = Arc::clone(&self.0);
        move || {
            count.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

pub fn product(id: u64, name: &str) -> Product {
    Product {
        id,
        name: name.to_string(),
        description: String::new(),
        price_cents: 0,
        provider_id: None,
    }
}

pub fn cart_item(product_id: u64, quantity: u32) -> CartItem {
    CartItem::new(product_id, quantity, 1_000)
}

/// Client-phase container with in-memory storage.
pub fn client_domains() -> Domains {
    let domains = Domains::in_memory();
    domains.enter_client_phase();
    domains
}

/// Config pointing the file backend at a fresh temp directory.
pub fn file_config() -> (TempDir, StoreConfig) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let mut config = StoreConfig::default();
    config.storage.backend = StorageBackend::File;
    config.storage.dir = Some(temp_dir.path().join("storage"));
    (temp_dir, config)
}

/// A new "browser session" over the same durable directory.
pub fn fresh_session(config: &StoreConfig) -> Domains {
    Domains::from_config(config.clone()).expect("Failed to open file storage")
}

/// Path of the storage directory in `config`.
pub fn storage_dir(config: &StoreConfig) -> PathBuf {
    config.storage.dir.clone().expect("file config has a dir")
}
