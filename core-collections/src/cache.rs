//! Growable page cache with background resolution
//!
//! [`CachedCollection`] is the base every concrete collection builds on. It
//! owns the append-only raw-item cache, grows it page by page on demand,
//! and, when a matcher is attached, kicks off resolution of ambiguous
//! local records the moment their page lands, without awaiting it. Reads
//! join that work lazily and memoize the outcome, so each index is resolved
//! at most once.

use crate::collection::{Collection, RecordPage};
use crate::error::{CollectionError, Result};
use async_trait::async_trait;
use core_catalog::{Cursor, Page, Record, StandardRecord};
use core_matcher::Matcher;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Cache growth configuration.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Remote page size used while growing.
    pub page_size: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { page_size: 50 }
    }
}

impl CacheConfig {
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }
}

/// What a concrete collection variant supplies: one remote round trip per
/// page, and a pure standardization of a raw item into a [`Record`].
///
/// `standardize` may fail with [`CollectionError::UnsupportedItemKind`] for
/// shapes the variant does not handle (e.g. an episode inside a playlist);
/// that error propagates to the caller unchanged.
#[async_trait]
pub trait PageSource: Send + Sync + 'static {
    type Raw: Clone + Send + Sync + 'static;

    async fn fetch_page(&self, limit: u32, cursor: Option<Cursor>) -> Result<Page<Self::Raw>>;

    fn standardize(&self, raw: &Self::Raw) -> Result<Record>;
}

/// Where the next fetch continues from.
enum Frontier {
    Unfetched,
    Next(Cursor),
    Exhausted,
}

struct CacheState<R> {
    /// Append-only; never shrinks or reorders. Indices are stable for the
    /// lifetime of the collection instance.
    raw: Vec<R>,
    /// Set once known; may later be corrected by the catalog.
    total: Option<u64>,
    frontier: Frontier,
    /// In-flight resolution work, keyed by raw index.
    pending: HashMap<usize, JoinHandle<Option<StandardRecord>>>,
    /// Completed resolutions. `None` records a fall-through so the matcher
    /// is never consulted twice for one index.
    resolved: HashMap<usize, Option<StandardRecord>>,
}

/// Lazy paginated fetch + growable cache + per-record background
/// resolution.
pub struct CachedCollection<S: PageSource> {
    source: S,
    matcher: Option<Arc<Matcher>>,
    config: CacheConfig,
    state: Mutex<CacheState<S::Raw>>,
}

impl<S: PageSource> CachedCollection<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            matcher: None,
            config: CacheConfig::default(),
            state: Mutex::new(CacheState {
                raw: Vec::new(),
                total: None,
                frontier: Frontier::Unfetched,
                pending: HashMap::new(),
                resolved: HashMap::new(),
            }),
        }
    }

    /// Attach a matcher; ambiguous local records will be resolved in the
    /// background as they are fetched.
    pub fn with_matcher(mut self, matcher: Arc<Matcher>) -> Self {
        self.matcher = Some(matcher);
        self
    }

    pub fn with_config(mut self, config: CacheConfig) -> Self {
        self.config = config;
        self
    }

    /// Grow the cache until it covers `target` items (`None` = exhaustion).
    ///
    /// Stops early when the remote cursor is exhausted, whatever the
    /// target. The known total clamps over-asking.
    async fn grow_to(&self, state: &mut CacheState<S::Raw>, target: Option<u64>) -> Result<()> {
        loop {
            let goal = match (target, state.total) {
                (Some(t), Some(total)) => t.min(total),
                (Some(t), None) => t,
                (None, Some(total)) => total,
                (None, None) => u64::MAX,
            };
            if (state.raw.len() as u64) >= goal {
                break;
            }

            let cursor = match &state.frontier {
                Frontier::Exhausted => break,
                Frontier::Unfetched => None,
                Frontier::Next(c) => Some(c.clone()),
            };

            let page = self.source.fetch_page(self.config.page_size, cursor).await?;
            let base = state.raw.len();
            debug!(
                base,
                fetched = page.items.len(),
                total = ?page.total,
                "appending page to cache"
            );
            state.raw.extend(page.items.iter().cloned());

            // Start (do not await) resolution for every newly appended
            // ambiguous record.
            if let Some(matcher) = &self.matcher {
                for (offset, item) in page.items.iter().enumerate() {
                    let record = self.source.standardize(item)?;
                    if record.is_local {
                        let index = base + offset;
                        let matcher = Arc::clone(matcher);
                        let handle =
                            tokio::spawn(
                                async move { matcher.resolve(&record).await.ok().flatten() },
                            );
                        state.pending.insert(index, handle);
                    }
                }
            }

            if let Some(total) = page.total {
                if state.total.is_some() && state.total != Some(total) {
                    debug!(old = ?state.total, new = total, "catalog corrected total");
                }
                state.total = Some(total);
            }
            state.frontier = match page.next {
                Some(c) => Frontier::Next(c),
                None => Frontier::Exhausted,
            };
        }
        Ok(())
    }

    /// Standardized record for index `i`: completed resolution first, then
    /// a lazy join of in-flight work, then the plain standardization.
    async fn standardized_at(
        &self,
        state: &mut CacheState<S::Raw>,
        index: usize,
    ) -> Result<StandardRecord> {
        if let Some(done) = state.resolved.get(&index) {
            if let Some(record) = done {
                return Ok(record.clone());
            }
        } else if let Some(handle) = state.pending.remove(&index) {
            let outcome = handle.await.unwrap_or_else(|e| {
                warn!(index, error = %e, "resolution task failed");
                None
            });
            state.resolved.insert(index, outcome.clone());
            if let Some(record) = outcome {
                return Ok(record);
            }
        }

        let raw = state
            .raw
            .get(index)
            .ok_or_else(|| CollectionError::InvalidCursor(format!("index {index} out of cache")))?;
        Ok(StandardRecord::Plain(self.source.standardize(raw)?))
    }

    async fn window(
        &self,
        state: &mut CacheState<S::Raw>,
        start: usize,
        end: usize,
    ) -> Result<Vec<StandardRecord>> {
        let mut items = Vec::with_capacity(end.saturating_sub(start));
        for index in start..end {
            items.push(self.standardized_at(state, index).await?);
        }
        Ok(items)
    }
}

#[async_trait]
impl<S: PageSource> Collection for CachedCollection<S> {
    async fn count(&self) -> Option<u64> {
        self.state.lock().await.total
    }

    async fn page(&self, limit: usize, offset: usize) -> Result<RecordPage> {
        let mut state = self.state.lock().await;
        let target = offset.saturating_add(limit) as u64;
        self.grow_to(&mut state, Some(target)).await?;

        let len = state.raw.len();
        let start = offset.min(len);
        let end = offset.saturating_add(limit).min(len);
        let items = self.window(&mut state, start, end).await?;

        // Without a known total the window is exhausted only when the
        // cursor is.
        let exhausted = match state.total {
            Some(total) => (end as u64) >= total,
            None => matches!(state.frontier, Frontier::Exhausted),
        };
        Ok(RecordPage {
            items,
            total: state.total.unwrap_or(len as u64),
            next: if exhausted { None } else { Some(end) },
        })
    }

    async fn all(&self) -> Result<Vec<StandardRecord>> {
        let mut state = self.state.lock().await;
        self.grow_to(&mut state, None).await?;
        let len = state.raw.len();
        self.window(&mut state, 0, len).await
    }
}
