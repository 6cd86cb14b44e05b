//! The public collection contract

use crate::error::Result;
use async_trait::async_trait;
use core_catalog::StandardRecord;

/// A window of standardized records.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordPage {
    /// Standardized (resolved where applicable) records for the window.
    pub items: Vec<StandardRecord>,
    /// Best known total for the whole collection.
    pub total: u64,
    /// Offset of the next window, `None` when the collection is exhausted.
    pub next: Option<usize>,
}

/// A lazy, paginated, cached view over a sequence of remote records.
#[async_trait]
pub trait Collection: Send + Sync {
    /// Best known total. `None` when nothing has been fetched yet. Never
    /// triggers a fetch.
    async fn count(&self) -> Option<u64>;

    /// Standardized records for a window, growing the cache to cover
    /// `offset + limit`.
    async fn page(&self, limit: usize, offset: usize) -> Result<RecordPage>;

    /// Standardized records for the entire collection, growing the cache to
    /// exhaustion.
    async fn all(&self) -> Result<Vec<StandardRecord>>;
}
