//! # Batched Delivery Engine
//!
//! Drains an in-memory record list into a [`DeliveryTarget`] (a remote
//! playlist, the playback queue, or a flat file) in bounded batches,
//! recovering from partial failures by re-querying the target's
//! authoritative state.
//!
//! ## Failure model
//!
//! A batch write can fail after the target accepted part of the batch. The
//! engine never trusts local bookkeeping alone: on failure it re-reads the
//! target's current item-id list, derives how much actually landed from the
//! length delta, requeues exactly the unaccepted remainder plus every
//! untouched batch, and retries after exponential backoff (1 s doubling,
//! capped at 10 s). After a successful `append`/`replace` the target holds
//! every input item exactly once, however many transient failures occurred.
//! Partial progress up to a terminal failure is retained, which makes a
//! manual whole-operation retry safe.
//!
//! ## Usage
//!
//! ```ignore
//! use core_delivery::{DeliveryConfig, DeliveryEngine, PlaylistTarget};
//! use std::sync::Arc;
//!
//! let target = Arc::new(PlaylistTarget::new(catalog_client, "playlist-id"));
//! let engine = DeliveryEngine::new(target, DeliveryConfig::default());
//! engine.append(&records, None).await?;
//! ```

pub mod engine;
pub mod error;
pub mod target;

pub use engine::{DeliveryConfig, DeliveryEngine};
pub use error::{DeliveryError, Result};
pub use target::{DeliveryTarget, FileTarget, PlaylistTarget, QueueTarget};
