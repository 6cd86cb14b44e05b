//! Catalog data model
//!
//! Records are treated as immutable once fetched: a record is only ever
//! replaced (e.g. by a resolution), never mutated in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single catalog item.
///
/// Local records (files the catalog only knows by a locally-encoded
/// descriptor) have no stable id; their identity falls back to URI + name,
/// see [`Record::key`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Stable catalog id. `None` for local records.
    pub id: Option<String>,
    /// Catalog URI. For local records this encodes the local descriptor.
    pub uri: String,
    /// Display name.
    pub name: String,
    /// Artist display names, in catalog order.
    pub artists: Vec<String>,
    /// Album display name, when the payload carries one.
    pub album: Option<String>,
    /// Duration in milliseconds.
    pub duration_ms: u64,
    /// Catalog popularity, 0-100.
    pub popularity: u32,
    /// Whether the record is a local file known only by its descriptor.
    pub is_local: bool,
}

impl Record {
    /// Identity key: stable id when present, URI + name otherwise.
    pub fn key(&self) -> RecordKey {
        match &self.id {
            Some(id) => RecordKey::Id(id.clone()),
            None => RecordKey::UriName(self.uri.clone(), self.name.clone()),
        }
    }

    /// Id used when reconciling against a delivery target's state.
    pub fn delivery_id(&self) -> String {
        self.id.clone().unwrap_or_else(|| self.uri.clone())
    }
}

/// Identity of a record, usable as a map/set key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordKey {
    Id(String),
    UriName(String, String),
}

/// A standardized record as served by a collection.
///
/// `Resolved` pairs a catalog candidate with the ambiguous local record it
/// replaces. This is a tagged union, not a subtype: the original is carried
/// alongside the replacement, nothing is shared or mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StandardRecord {
    Plain(Record),
    Resolved { record: Record, original: Record },
}

impl StandardRecord {
    /// The effective record: the resolution replacement when present.
    pub fn record(&self) -> &Record {
        match self {
            StandardRecord::Plain(r) => r,
            StandardRecord::Resolved { record, .. } => record,
        }
    }

    /// The ambiguous record this one replaced, if any.
    pub fn original(&self) -> Option<&Record> {
        match self {
            StandardRecord::Plain(_) => None,
            StandardRecord::Resolved { original, .. } => Some(original),
        }
    }
}

/// Pagination continuation token. `Option<Cursor>` with `None` signals an
/// exhausted sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cursor {
    /// Numeric offset into the remote sequence.
    Offset(u64),
    /// Opaque token handed back by the catalog.
    Token(String),
}

/// One remote round trip's worth of raw items.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Raw, pre-standardization items.
    pub items: Vec<T>,
    /// Total item count as reported by the catalog, when known.
    pub total: Option<u64>,
    /// Continuation cursor; `None` means exhausted.
    pub next: Option<Cursor>,
}

impl<T> Page<T> {
    /// Map the items to a different type, keeping total and cursor.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            next: self.next,
        }
    }
}

/// A raw catalog item, before per-collection standardization.
///
/// Each collection kind receives a different payload shape from the catalog;
/// standardization turns these into [`Record`]s and rejects shapes the
/// collection does not handle.
#[derive(Debug, Clone, PartialEq)]
pub enum RawItem {
    /// A plain track object (album tracks, search results).
    Track(Record),
    /// A playlist entry wrapping a playable item. The item is absent when
    /// the catalog has removed the underlying track.
    PlaylistEntry {
        item: Option<PlayableItem>,
        added_at: Option<DateTime<Utc>>,
    },
    /// A saved ("liked") track with its save timestamp.
    SavedTrack {
        track: Record,
        added_at: DateTime<Utc>,
    },
    /// One play-history event.
    PlayEvent(HistoryEntry),
}

/// A playable item inside a playlist entry.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayableItem {
    Track(Record),
    Episode { id: String, name: String },
}

/// One play-history event. Keyed by `(played_at, context)`; two events with
/// the same timestamp in different contexts are distinct plays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub track: Record,
    #[serde(rename = "playedAt")]
    pub played_at: DateTime<Utc>,
    /// Identifier of the context the track was played from (playlist,
    /// album, ...), when the catalog reports one.
    #[serde(rename = "contextIdentifier", default)]
    pub context: Option<String>,
}

impl HistoryEntry {
    /// Natural key used for deduplicating merges.
    pub fn key(&self) -> (DateTime<Utc>, Option<&str>) {
        (self.played_at, self.context.as_deref())
    }
}
