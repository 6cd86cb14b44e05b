//! Persistent key-value store trait
//!
//! Abstracts the external persistent store (browser storage, settings file,
//! ...) used for the play-history buffer. Exactly one key is used
//! process-wide; writes are last-writer-wins with no cross-instance
//! coordination.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// String key-value persistence.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value. `Ok(None)` when the key has never been written.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Write a value, overwriting any previous one.
    async fn set(&self, key: &str, value: &str) -> StoreResult<()>;
}

/// In-memory store for tests and hosts without durable storage.
#[derive(Default)]
pub struct MemoryKeyValueStore {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.values
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
