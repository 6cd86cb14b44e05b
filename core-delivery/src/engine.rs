//! Delivery engine
//!
//! Splits an ordered record list into batches and drains them into a
//! [`DeliveryTarget`], reconciling partial failures against the target's
//! own state rather than local bookkeeping.

use crate::error::{DeliveryError, Result};
use crate::target::DeliveryTarget;
use core_catalog::StandardRecord;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Retry behavior for a [`DeliveryEngine`].
#[derive(Debug, Clone)]
pub struct DeliveryConfig {
    /// How many failed writes to tolerate before giving up.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each subsequent one.
    pub base_delay: Duration,
    /// Upper bound on the backoff delay.
    pub max_delay: Duration,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl DeliveryConfig {
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }
}

/// Drains record lists into a target in bounded, ordered batches.
pub struct DeliveryEngine {
    target: Arc<dyn DeliveryTarget>,
    config: DeliveryConfig,
}

impl DeliveryEngine {
    pub fn new(target: Arc<dyn DeliveryTarget>, config: DeliveryConfig) -> Self {
        Self { target, config }
    }

    /// Append `items` to the target, preserving order. `batch_size` defaults
    /// to the target's own maximum and is clamped to it.
    pub async fn append(
        &self,
        items: &[StandardRecord],
        batch_size: Option<usize>,
    ) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }
        let max = self.target.max_batch();
        let batch_size = batch_size.unwrap_or(max).clamp(1, max);
        self.deliver(items, batch_size).await
    }

    /// Clear the target, then append `items`. Fails up front when the target
    /// cannot be cleared, before anything is written.
    pub async fn replace(
        &self,
        items: &[StandardRecord],
        batch_size: Option<usize>,
    ) -> Result<()> {
        if !self.target.supports_removal() {
            return Err(DeliveryError::RemovalUnsupported);
        }
        self.target.clear().await?;
        self.append(items, batch_size).await
    }

    /// The reconciling write loop.
    ///
    /// The baseline is the target's id list as of the last known-good point.
    /// A failed write may still have landed a prefix of its batch; the length
    /// delta between a fresh read and the baseline tells how many items were
    /// accepted, and only the remainder (plus untouched batches) is requeued.
    async fn deliver(&self, items: &[StandardRecord], batch_size: usize) -> Result<()> {
        let mut baseline = self.target.current_ids().await?;
        let mut pending: Vec<StandardRecord> = items.to_vec();
        let mut retries: u32 = 0;

        while !pending.is_empty() {
            let batch_len = batch_size.min(pending.len());
            let batch = &pending[..batch_len];
            debug!(batch_len, remaining = pending.len(), "writing batch");

            match self.target.write(batch).await {
                Ok(()) => {
                    baseline.extend(batch.iter().map(|r| r.record().delivery_id()));
                    pending.drain(..batch_len);
                }
                Err(cause) => {
                    if retries >= self.config.max_retries {
                        return Err(DeliveryError::RetriesExhausted {
                            attempts: retries,
                            source: Box::new(cause),
                        });
                    }
                    let current = self.target.current_ids().await?;
                    let accepted = current.len().saturating_sub(baseline.len());
                    warn!(
                        retry = retries,
                        accepted,
                        error = %cause,
                        "batch write failed, reconciling"
                    );
                    pending.drain(..accepted.min(batch_len));
                    baseline = current;
                    let delay = backoff_delay(&self.config, retries);
                    retries += 1;
                    tokio::time::sleep(delay).await;
                }
            }
        }
        Ok(())
    }
}

fn backoff_delay(config: &DeliveryConfig, attempt: u32) -> Duration {
    let base_ms = config.base_delay.as_millis() as u64;
    let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
    let delay_ms = base_ms.saturating_mul(factor);
    Duration::from_millis(delay_ms).min(config.max_delay)
}
