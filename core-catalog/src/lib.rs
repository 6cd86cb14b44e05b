//! # Catalog Model & Collaborator Traits
//!
//! Shared data model for the medley workspace plus the traits behind which
//! the two external collaborators live:
//!
//! - [`CatalogClient`]: the remote, paginated, rate-limited music catalog
//!   (search, list, mutate). Consumed, never implemented here.
//! - [`KeyValueStore`]: a persistent string key-value store used for the
//!   play-history buffer.
//!
//! ## Overview
//!
//! Every other crate in the workspace speaks in terms of [`Record`] (an
//! immutable catalog item), [`StandardRecord`] (a record that may carry a
//! resolution replacing an ambiguous local record), and [`Page`]/[`Cursor`]
//! (one remote round trip's worth of items plus the continuation token).

pub mod client;
pub mod error;
pub mod models;
pub mod store;

pub use client::{CatalogClient, Device};
pub use error::{CatalogError, Result};
pub use models::{
    Cursor, HistoryEntry, Page, PlayableItem, RawItem, Record, RecordKey, StandardRecord,
};
pub use store::{KeyValueStore, MemoryKeyValueStore, StoreError};
