//! # Ambiguous-Record Resolution
//!
//! Resolves "local" records (catalog items identified only by a
//! locally-encoded descriptor) to real catalog records via search plus a
//! fuzzy scorer.
//!
//! ## Overview
//!
//! A local record's URI encodes `scheme:tag:artist:album:title:duration`
//! with artist/album/title percent-encoded and `+` for spaces. The
//! [`Matcher`] parses that descriptor, queries the catalog for candidates
//! biased toward exact title+artist phrase matches, scores each candidate,
//! and accepts the best one only when it clears the threshold (an
//! exact-or-near title match plus some artist match).
//!
//! Resolution fails closed: a malformed descriptor or an unconvincing
//! candidate set yields `Ok(None)` and the record stays unresolved. Only
//! transport failures surface as errors.
//!
//! ## Usage
//!
//! ```ignore
//! use core_matcher::{Matcher, MatcherConfig};
//! use std::sync::Arc;
//!
//! let matcher = Matcher::new(catalog_client, MatcherConfig::default());
//! if let Some(resolved) = matcher.resolve(&local_record).await? {
//!     println!("resolved to {}", resolved.record().name);
//! }
//! ```

pub mod descriptor;
pub mod error;
pub mod matcher;

pub use descriptor::LocalDescriptor;
pub use error::{MatchError, Result};
pub use matcher::{Matcher, MatcherConfig};
