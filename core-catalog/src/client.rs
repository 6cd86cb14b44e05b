//! Remote catalog client trait
//!
//! Abstracts the paginated, rate-limited remote music catalog. Everything in
//! this workspace consumes the catalog through this trait; the concrete HTTP
//! client lives with the host application.
//!
//! # Example
//!
//! ```ignore
//! use core_catalog::{CatalogClient, Cursor};
//! use std::sync::Arc;
//!
//! async fn first_page(client: Arc<dyn CatalogClient>) -> core_catalog::Result<()> {
//!     let page = client.playlist_items("playlist-id", 50, None).await?;
//!     println!("{} of {:?} items", page.items.len(), page.total);
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Cursor, Page, RawItem, Record};

/// A playback device known to the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub id: String,
    pub name: String,
    pub is_active: bool,
}

/// Paginated search/list/mutate operations against the remote catalog.
///
/// One call of any `*_items`/`*_tracks`/`recently_played` method is one
/// remote round trip. Cursors are opaque to callers; `None` starts from the
/// beginning.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// List the items of a playlist the user owns or follows.
    async fn playlist_items(
        &self,
        playlist_id: &str,
        limit: u32,
        cursor: Option<Cursor>,
    ) -> Result<Page<RawItem>>;

    /// List the tracks of an album. Album-track payloads omit the album
    /// reference; callers standardizing them must supply it.
    async fn album_tracks(
        &self,
        album_id: &str,
        limit: u32,
        cursor: Option<Cursor>,
    ) -> Result<Page<RawItem>>;

    /// List the user's saved ("liked") tracks.
    async fn saved_tracks(&self, limit: u32, cursor: Option<Cursor>) -> Result<Page<RawItem>>;

    /// List the user's play history, newest first. `before` is the opaque
    /// remote history token.
    async fn recently_played(&self, limit: u32, before: Option<String>) -> Result<Page<RawItem>>;

    /// Search the catalog for tracks. `query` uses the catalog's structured
    /// query syntax (`track:"..." artist:"..."`).
    async fn search_tracks(&self, query: &str, limit: u32) -> Result<Vec<Record>>;

    /// Append items to a playlist, in order.
    async fn add_playlist_items(&self, playlist_id: &str, uris: &[String]) -> Result<()>;

    /// Remove `len` items starting at `start` from a playlist.
    async fn remove_playlist_range(&self, playlist_id: &str, start: u32, len: u32) -> Result<()>;

    /// The playlist's current item ids, in playlist order. Authoritative:
    /// reflects every write the catalog has accepted.
    async fn playlist_item_ids(&self, playlist_id: &str) -> Result<Vec<String>>;

    /// Add one item to the playback queue, optionally on a specific device.
    async fn enqueue(&self, uri: &str, device_id: Option<&str>) -> Result<()>;

    /// The current playback queue's item ids, in play order.
    async fn queue_item_ids(&self) -> Result<Vec<String>>;

    /// Playback devices currently known to the catalog.
    async fn list_devices(&self) -> Result<Vec<Device>>;
}
