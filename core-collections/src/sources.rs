//! Concrete page sources
//!
//! Each source maps one catalog listing endpoint into the shared model.
//! Standardization is per-variant: the same raw union arrives in different
//! shapes depending on the endpoint, and shapes a variant does not handle
//! are rejected with `UnsupportedItemKind`.

use crate::cache::PageSource;
use crate::error::{CollectionError, Result};
use async_trait::async_trait;
use core_catalog::{CatalogClient, Cursor, Page, PlayableItem, RawItem, Record};
use std::sync::Arc;

pub(crate) fn raw_kind(raw: &RawItem) -> &'static str {
    match raw {
        RawItem::Track(_) => "track",
        RawItem::PlaylistEntry { item: None, .. } => "vacant playlist entry",
        RawItem::PlaylistEntry {
            item: Some(PlayableItem::Track(_)),
            ..
        } => "playlist track",
        RawItem::PlaylistEntry {
            item: Some(PlayableItem::Episode { .. }),
            ..
        } => "episode",
        RawItem::SavedTrack { .. } => "saved track",
        RawItem::PlayEvent(_) => "play event",
    }
}

fn unsupported(raw: &RawItem) -> CollectionError {
    CollectionError::UnsupportedItemKind {
        kind: raw_kind(raw).to_string(),
    }
}

/// A playlist the user owns or follows.
pub struct PlaylistSource {
    client: Arc<dyn CatalogClient>,
    playlist_id: String,
}

impl PlaylistSource {
    pub fn new(client: Arc<dyn CatalogClient>, playlist_id: impl Into<String>) -> Self {
        Self {
            client,
            playlist_id: playlist_id.into(),
        }
    }
}

#[async_trait]
impl PageSource for PlaylistSource {
    type Raw = RawItem;

    async fn fetch_page(&self, limit: u32, cursor: Option<Cursor>) -> Result<Page<RawItem>> {
        Ok(self
            .client
            .playlist_items(&self.playlist_id, limit, cursor)
            .await?)
    }

    fn standardize(&self, raw: &RawItem) -> Result<Record> {
        match raw {
            RawItem::PlaylistEntry {
                item: Some(PlayableItem::Track(track)),
                ..
            } => Ok(track.clone()),
            other => Err(unsupported(other)),
        }
    }
}

/// An album's track listing. Album-track payloads omit the album reference,
/// so the source injects the album name it was created with.
pub struct AlbumSource {
    client: Arc<dyn CatalogClient>,
    album_id: String,
    album_name: String,
}

impl AlbumSource {
    pub fn new(
        client: Arc<dyn CatalogClient>,
        album_id: impl Into<String>,
        album_name: impl Into<String>,
    ) -> Self {
        Self {
            client,
            album_id: album_id.into(),
            album_name: album_name.into(),
        }
    }
}

#[async_trait]
impl PageSource for AlbumSource {
    type Raw = RawItem;

    async fn fetch_page(&self, limit: u32, cursor: Option<Cursor>) -> Result<Page<RawItem>> {
        Ok(self
            .client
            .album_tracks(&self.album_id, limit, cursor)
            .await?)
    }

    fn standardize(&self, raw: &RawItem) -> Result<Record> {
        match raw {
            RawItem::Track(track) => Ok(Record {
                album: Some(self.album_name.clone()),
                ..track.clone()
            }),
            other => Err(unsupported(other)),
        }
    }
}

/// The user's saved ("liked") tracks.
pub struct SavedSource {
    client: Arc<dyn CatalogClient>,
}

impl SavedSource {
    pub fn new(client: Arc<dyn CatalogClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageSource for SavedSource {
    type Raw = RawItem;

    async fn fetch_page(&self, limit: u32, cursor: Option<Cursor>) -> Result<Page<RawItem>> {
        Ok(self.client.saved_tracks(limit, cursor).await?)
    }

    fn standardize(&self, raw: &RawItem) -> Result<Record> {
        match raw {
            RawItem::SavedTrack { track, .. } => Ok(track.clone()),
            other => Err(unsupported(other)),
        }
    }
}
