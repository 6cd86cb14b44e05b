//! Derived collections
//!
//! A [`DerivedCollection`] computes its contents by combining other
//! collections through a [`Combinator`]. The result is memoized: it is
//! recomputed only after an explicit [`clear`](DerivedCollection::clear),
//! and concurrent first reads are single-flight: the memo lock is held
//! across the computation, so every concurrent caller observes the one
//! result instead of triggering duplicate work.

use crate::collection::{Collection, RecordPage};
use crate::combine::{Combinator, InputOptions};
use crate::error::Result;
use async_trait::async_trait;
use core_catalog::StandardRecord;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

pub struct DerivedCollection {
    inputs: Vec<(Arc<dyn Collection>, InputOptions)>,
    combinator: Combinator,
    memo: Mutex<Option<Arc<Vec<StandardRecord>>>>,
}

impl DerivedCollection {
    pub fn new(inputs: Vec<(Arc<dyn Collection>, InputOptions)>, combinator: Combinator) -> Self {
        Self {
            inputs,
            combinator,
            memo: Mutex::new(None),
        }
    }

    /// Discard the memoized result. The next read recomputes from scratch;
    /// the inputs re-fetch, which may themselves be cached.
    pub async fn clear(&self) {
        *self.memo.lock().await = None;
    }

    async fn records(&self) -> Result<Arc<Vec<StandardRecord>>> {
        let mut memo = self.memo.lock().await;
        if let Some(records) = memo.as_ref() {
            return Ok(Arc::clone(records));
        }

        let gathered = futures::future::try_join_all(self.inputs.iter().map(
            |(collection, options)| {
                let options = *options;
                async move {
                    collection
                        .all()
                        .await
                        .map(|records| (records, options))
                }
            },
        ))
        .await?;

        let combined = Arc::new(self.combinator.combine(gathered));
        debug!(
            inputs = self.inputs.len(),
            records = combined.len(),
            "computed derived collection"
        );
        *memo = Some(Arc::clone(&combined));
        Ok(combined)
    }
}

#[async_trait]
impl Collection for DerivedCollection {
    async fn count(&self) -> Option<u64> {
        self.memo
            .lock()
            .await
            .as_ref()
            .map(|records| records.len() as u64)
    }

    async fn page(&self, limit: usize, offset: usize) -> Result<RecordPage> {
        let records = self.records().await?;
        let len = records.len();
        let start = offset.min(len);
        let end = offset.saturating_add(limit).min(len);
        let next = if end >= len { None } else { Some(end) };
        Ok(RecordPage {
            items: records[start..end].to_vec(),
            total: len as u64,
            next,
        })
    }

    async fn all(&self) -> Result<Vec<StandardRecord>> {
        Ok((*self.records().await?).clone())
    }
}
