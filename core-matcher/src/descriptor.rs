//! Local descriptor parsing
//!
//! The encoding is fixed and not renegotiable: six colon-delimited fields,
//! `scheme:tag:artist:album:title:durationSeconds`, with artist/album/title
//! percent-encoded and `+` standing for a space.

use tracing::debug;

/// The decoded descriptor of a local record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalDescriptor {
    pub artist: String,
    pub album: String,
    pub title: String,
    pub duration_secs: Option<u64>,
}

impl LocalDescriptor {
    /// Parse a local record URI.
    ///
    /// Fails closed: anything other than exactly six fields, or a field
    /// that does not percent-decode, yields `None`.
    pub fn parse(uri: &str) -> Option<Self> {
        let fields: Vec<&str> = uri.split(':').collect();
        if fields.len() != 6 {
            debug!(uri, fields = fields.len(), "descriptor has wrong arity");
            return None;
        }

        let artist = decode_field(fields[2])?;
        let album = decode_field(fields[3])?;
        let title = decode_field(fields[4])?;
        let duration_secs = fields[5].parse::<u64>().ok();

        Some(Self {
            artist,
            album,
            title,
            duration_secs,
        })
    }
}

/// `+` becomes a space before percent-decoding; a literal plus arrives as
/// `%2B` and is untouched by the replacement.
fn decode_field(field: &str) -> Option<String> {
    let spaced = field.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => Some(decoded.trim().to_string()),
        Err(e) => {
            debug!(field, error = %e, "descriptor field failed to decode");
            None
        }
    }
}
