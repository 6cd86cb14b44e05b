//! # Collections: lazy, cached views over remote record sequences
//!
//! The data-access layer of the workspace. A [`Collection`] is a lazy,
//! paginated, cached view over a sequence of remote records:
//!
//! - [`CachedCollection`] wraps a [`PageSource`] (one remote round trip per
//!   page) with an append-only cache that grows on demand and resolves
//!   ambiguous local records in the background.
//! - Concrete sources cover owned playlists, albums, the liked-tracks set,
//!   and play history backed by a persistent buffer
//!   ([`history::HistorySource`]).
//! - [`DerivedCollection`] combines other collections through a
//!   [`Combinator`] and memoizes the result with single-flight semantics.
//!
//! ## Caching model
//!
//! The raw item cache only ever appends; indices are stable for the
//! lifetime of a collection instance. Resolution of ambiguous records is
//! best-effort and non-blocking at fetch time (spawned, not awaited), but
//! blocking and memoized at read time: each index resolves at most once no
//! matter how often it is read.

pub mod cache;
pub mod collection;
pub mod combine;
pub mod derived;
pub mod error;
pub mod history;
pub mod sources;

pub use cache::{CacheConfig, CachedCollection, PageSource};
pub use collection::{Collection, RecordPage};
pub use combine::{Combinator, InputOptions};
pub use derived::DerivedCollection;
pub use error::{CollectionError, Result};
pub use history::{HistoryConfig, HistorySource};
pub use sources::{AlbumSource, PlaylistSource, SavedSource};
