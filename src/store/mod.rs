//! Local key-value store
//!
//! This module provides the persistence layer for the table timer. It
//! mirrors a browser's local storage: a flat map of string keys to UTF-8
//! text values, with no transactions and last-write-wins semantics.
//! It supports:
//! - File store - default, one JSON object on disk
//! - Memory store - for tests and throwaway runs
//!
//! The driver is selected based on configuration.
//!
//! # Usage
//!
//! ```rust,ignore
//! use tabletimer::config::StoreConfig;
//! use tabletimer::store::{create_store, SessionStore};
//!
//! let kv = create_store(&StoreConfig::default());
//! let store = SessionStore::new(kv);
//! let sessions = store.load().await;
//! ```

pub mod file;
pub mod memory;
pub mod sessions;

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{StoreConfig, StoreDriver};

pub use file::FileStore;
pub use memory::MemoryStore;
pub use sessions::{SessionStore, ADMIN_KEY, SESSIONS_KEY};

/// Key-value store trait
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Get the text stored under `key`
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the text stored under `key`
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`; removing a missing key is not an error
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Shared, dynamically dispatched store
pub type DynKeyValueStore = Arc<dyn KeyValueStore>;

/// Create a store based on configuration
pub fn create_store(config: &StoreConfig) -> DynKeyValueStore {
    match config.driver {
        StoreDriver::File => {
            tracing::info!("Using file store at {}", config.path.display());
            Arc::new(FileStore::new(&config.path))
        }
        StoreDriver::Memory => {
            tracing::info!("Using in-memory store");
            Arc::new(MemoryStore::new())
        }
    }
}
