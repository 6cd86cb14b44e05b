//! Play history with a persistent buffer
//!
//! History is the one collection whose cache survives the process: freshly
//! fetched pages are merged into a deduplicating, newest-first buffer held
//! in an external key-value store under a single key.
//!
//! The cursor type is a union: the opaque remote token from the catalog,
//! and a local cursor (an index into the buffer, carried as a token with a
//! fixed prefix). One instance performs at most one remote fetch, the
//! initial call, and serves every later page from the buffer, which keeps
//! remote calls bounded to one per explicit refresh while still allowing
//! arbitrary-depth pagination over history the user has already seen.

use crate::cache::PageSource;
use crate::error::{CollectionError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use core_catalog::{CatalogClient, Cursor, HistoryEntry, KeyValueStore, Page, RawItem, Record};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Fixed prefix distinguishing local cursors from remote tokens.
const LOCAL_CURSOR_PREFIX: &str = "local:";

/// History configuration.
#[derive(Debug, Clone)]
pub struct HistoryConfig {
    /// Store key holding the buffer. One key process-wide.
    pub storage_key: String,
    /// Maximum buffer length; older entries are trimmed after each merge.
    pub max_entries: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            storage_key: "medley.play_history".to_string(),
            max_entries: 1000,
        }
    }
}

impl HistoryConfig {
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = max;
        self
    }
}

/// The persisted buffer: newest-first entries plus the last merge time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct HistoryBuffer {
    #[serde(default)]
    tracks: Vec<HistoryEntry>,
    #[serde(rename = "updatedAt", default)]
    updated_at: Option<DateTime<Utc>>,
}

/// Play-history page source backed by the persistent buffer.
pub struct HistorySource {
    client: Arc<dyn CatalogClient>,
    store: Arc<dyn KeyValueStore>,
    config: HistoryConfig,
    buffer: Mutex<HistoryBuffer>,
}

impl HistorySource {
    /// Load the buffer from the store. Missing or malformed stored values
    /// are treated as an empty buffer, never as an error.
    pub async fn load(
        client: Arc<dyn CatalogClient>,
        store: Arc<dyn KeyValueStore>,
        config: HistoryConfig,
    ) -> Self {
        let buffer = match store.get(&config.storage_key).await {
            Ok(Some(json)) => match serde_json::from_str::<HistoryBuffer>(&json) {
                Ok(buffer) => {
                    debug!(
                        entries = buffer.tracks.len(),
                        updated_at = ?buffer.updated_at,
                        "loaded history buffer"
                    );
                    buffer
                }
                Err(e) => {
                    warn!(key = %config.storage_key, error = %e, "corrupt history buffer, starting empty");
                    HistoryBuffer::default()
                }
            },
            Ok(None) => HistoryBuffer::default(),
            Err(e) => {
                warn!(key = %config.storage_key, error = %e, "history store unavailable, starting empty");
                HistoryBuffer::default()
            }
        };

        Self {
            client,
            store,
            config,
            buffer: Mutex::new(buffer),
        }
    }

    /// Serve a window straight from the buffer. No remote call.
    async fn local_page(&self, index: usize, limit: u32) -> Page<RawItem> {
        let buffer = self.buffer.lock().await;
        let len = buffer.tracks.len();
        let start = index.min(len);
        let end = start.saturating_add(limit as usize).min(len);
        let items = buffer.tracks[start..end]
            .iter()
            .cloned()
            .map(RawItem::PlayEvent)
            .collect();
        Page {
            items,
            total: Some(len as u64),
            next: local_cursor(end, len),
        }
    }

    /// One remote fetch followed by the merge: scan the newest-first page
    /// for the first entry whose key the buffer already holds (the
    /// boundary: it and everything older is already known), prepend the
    /// genuinely new entries, trim, persist.
    async fn refresh_page(&self, limit: u32, before: Option<String>) -> Result<Page<RawItem>> {
        let fetched = self.client.recently_played(limit, before).await?;

        let mut entries = Vec::with_capacity(fetched.items.len());
        for item in fetched.items {
            match item {
                RawItem::PlayEvent(entry) => entries.push(entry),
                other => {
                    return Err(CollectionError::UnsupportedItemKind {
                        kind: crate::sources::raw_kind(&other).to_string(),
                    })
                }
            }
        }

        let mut buffer = self.buffer.lock().await;

        let mut new_entries = Vec::new();
        for entry in entries {
            if buffer.tracks.iter().any(|known| known.key() == entry.key()) {
                break;
            }
            new_entries.push(entry);
        }
        let new_count = new_entries.len();
        debug!(
            fetched = new_count,
            known = buffer.tracks.len(),
            "merged history page"
        );

        let mut merged = new_entries.clone();
        merged.append(&mut buffer.tracks);
        merged.truncate(self.config.max_entries);
        buffer.tracks = merged;
        buffer.updated_at = Some(Utc::now());

        let json = serde_json::to_string(&*buffer)?;
        self.store.set(&self.config.storage_key, &json).await?;

        Ok(Page {
            items: new_entries.into_iter().map(RawItem::PlayEvent).collect(),
            total: Some(buffer.tracks.len() as u64),
            next: local_cursor(new_count, buffer.tracks.len()),
        })
    }
}

fn local_cursor(index: usize, len: usize) -> Option<Cursor> {
    if index < len {
        Some(Cursor::Token(format!("{LOCAL_CURSOR_PREFIX}{index}")))
    } else {
        None
    }
}

#[async_trait]
impl PageSource for HistorySource {
    type Raw = RawItem;

    async fn fetch_page(&self, limit: u32, cursor: Option<Cursor>) -> Result<Page<RawItem>> {
        match cursor {
            Some(Cursor::Token(token)) => match token.strip_prefix(LOCAL_CURSOR_PREFIX) {
                Some(index) => {
                    let index = index
                        .parse::<usize>()
                        .map_err(|_| CollectionError::InvalidCursor(token.clone()))?;
                    Ok(self.local_page(index, limit).await)
                }
                None => self.refresh_page(limit, Some(token)).await,
            },
            Some(Cursor::Offset(o)) => Err(CollectionError::InvalidCursor(format!("offset {o}"))),
            None => self.refresh_page(limit, None).await,
        }
    }

    fn standardize(&self, raw: &RawItem) -> Result<Record> {
        match raw {
            RawItem::PlayEvent(entry) => Ok(entry.track.clone()),
            other => Err(CollectionError::UnsupportedItemKind {
                kind: crate::sources::raw_kind(other).to_string(),
            }),
        }
    }
}
