//! Delivery targets
//!
//! A target accepts batches of records and exposes its authoritative
//! current state, which the engine consults to recover from partial
//! failures. Removal support is optional; `replace` requires it.

use crate::error::{DeliveryError, Result};
use async_trait::async_trait;
use core_catalog::{CatalogClient, Record, StandardRecord};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// A destination capable of accepting (and optionally removing) records.
#[async_trait]
pub trait DeliveryTarget: Send + Sync {
    /// The largest batch one `write` call may carry.
    fn max_batch(&self) -> usize;

    /// Whether [`clear`](DeliveryTarget::clear) is available.
    fn supports_removal(&self) -> bool {
        false
    }

    /// Write one batch, in order. May fail after accepting a prefix of the
    /// batch; the engine reconciles via [`current_ids`](DeliveryTarget::current_ids).
    async fn write(&self, items: &[StandardRecord]) -> Result<()>;

    /// Remove all current contents.
    async fn clear(&self) -> Result<()> {
        Err(DeliveryError::RemovalUnsupported)
    }

    /// The target's authoritative current item ids, in order.
    async fn current_ids(&self) -> Result<Vec<String>>;
}

// ============================================================================
// Remote playlist
// ============================================================================

const PLAYLIST_MAX_BATCH: usize = 100;

/// A remote playlist, written through the catalog.
pub struct PlaylistTarget {
    client: Arc<dyn CatalogClient>,
    playlist_id: String,
}

impl PlaylistTarget {
    pub fn new(client: Arc<dyn CatalogClient>, playlist_id: impl Into<String>) -> Self {
        Self {
            client,
            playlist_id: playlist_id.into(),
        }
    }
}

#[async_trait]
impl DeliveryTarget for PlaylistTarget {
    fn max_batch(&self) -> usize {
        PLAYLIST_MAX_BATCH
    }

    fn supports_removal(&self) -> bool {
        true
    }

    async fn write(&self, items: &[StandardRecord]) -> Result<()> {
        let uris: Vec<String> = items.iter().map(|r| r.record().uri.clone()).collect();
        self.client
            .add_playlist_items(&self.playlist_id, &uris)
            .await?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let current = self.client.playlist_item_ids(&self.playlist_id).await?;
        if !current.is_empty() {
            debug!(playlist_id = %self.playlist_id, len = current.len(), "clearing playlist");
            self.client
                .remove_playlist_range(&self.playlist_id, 0, current.len() as u32)
                .await?;
        }
        Ok(())
    }

    async fn current_ids(&self) -> Result<Vec<String>> {
        Ok(self.client.playlist_item_ids(&self.playlist_id).await?)
    }
}

// ============================================================================
// Playback queue
// ============================================================================

/// The playback queue. The catalog enqueues one item per call, so batches
/// are single items; the queue cannot be cleared.
pub struct QueueTarget {
    client: Arc<dyn CatalogClient>,
    device_id: Option<String>,
}

impl QueueTarget {
    pub fn new(client: Arc<dyn CatalogClient>, device_id: Option<String>) -> Self {
        Self { client, device_id }
    }

    /// Pin delivery to the catalog's currently active device.
    pub async fn for_active_device(client: Arc<dyn CatalogClient>) -> Result<Self> {
        let devices = client.list_devices().await?;
        let active = devices
            .into_iter()
            .find(|d| d.is_active)
            .ok_or(DeliveryError::NoActiveDevice)?;
        Ok(Self {
            client,
            device_id: Some(active.id),
        })
    }
}

#[async_trait]
impl DeliveryTarget for QueueTarget {
    fn max_batch(&self) -> usize {
        1
    }

    async fn write(&self, items: &[StandardRecord]) -> Result<()> {
        for item in items {
            self.client
                .enqueue(&item.record().uri, self.device_id.as_deref())
                .await?;
        }
        Ok(())
    }

    async fn current_ids(&self) -> Result<Vec<String>> {
        Ok(self.client.queue_item_ids().await?)
    }
}

// ============================================================================
// Flat file
// ============================================================================

const FILE_MAX_BATCH: usize = 500;

/// A flat file holding a pretty-printed JSON array of the standardized
/// records delivered so far. The file is rewritten after every accepted
/// batch so its contents are always the authoritative state.
pub struct FileTarget {
    path: PathBuf,
    records: Mutex<Vec<Record>>,
}

impl FileTarget {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    async fn persist(&self, records: &[Record]) -> Result<()> {
        let json = serde_json::to_vec_pretty(records)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

#[async_trait]
impl DeliveryTarget for FileTarget {
    fn max_batch(&self) -> usize {
        FILE_MAX_BATCH
    }

    fn supports_removal(&self) -> bool {
        true
    }

    async fn write(&self, items: &[StandardRecord]) -> Result<()> {
        let mut records = self.records.lock().await;
        let mut next = records.clone();
        next.extend(items.iter().map(|r| r.record().clone()));
        // Persist before committing: a failed write must leave current_ids
        // unchanged so the engine retries the batch.
        self.persist(&next).await?;
        *records = next;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut records = self.records.lock().await;
        self.persist(&[]).await?;
        records.clear();
        Ok(())
    }

    async fn current_ids(&self) -> Result<Vec<String>> {
        Ok(self
            .records
            .lock()
            .await
            .iter()
            .map(Record::delivery_id)
            .collect())
    }
}
