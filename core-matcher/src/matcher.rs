//! Candidate search and scoring

use crate::descriptor::LocalDescriptor;
use crate::error::Result;
use core_catalog::{CatalogClient, Record, StandardRecord};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, info};

/// Matcher configuration.
#[derive(Debug, Clone)]
pub struct MatcherConfig {
    /// Maximum number of search candidates to score.
    pub search_limit: u32,
    /// Minimum score a candidate must reach to be accepted.
    pub accept_threshold: f64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            search_limit: 20,
            accept_threshold: 100.0,
        }
    }
}

impl MatcherConfig {
    pub fn with_search_limit(mut self, limit: u32) -> Self {
        self.search_limit = limit;
        self
    }

    pub fn with_accept_threshold(mut self, threshold: f64) -> Self {
        self.accept_threshold = threshold;
        self
    }
}

/// Resolves ambiguous local records against the catalog.
pub struct Matcher {
    client: Arc<dyn CatalogClient>,
    config: MatcherConfig,
}

impl Matcher {
    pub fn new(client: Arc<dyn CatalogClient>, config: MatcherConfig) -> Self {
        Self { client, config }
    }

    /// Resolve one ambiguous record.
    ///
    /// Returns the chosen candidate paired with the original, or `None`
    /// when the descriptor is malformed, the search comes back empty, or no
    /// candidate clears the threshold. Transport failures are errors; the
    /// caller decides whether to fall back.
    pub async fn resolve(&self, original: &Record) -> Result<Option<StandardRecord>> {
        let Some(descriptor) = LocalDescriptor::parse(&original.uri) else {
            debug!(uri = %original.uri, "not a parseable local descriptor");
            return Ok(None);
        };

        // Bias the search toward exact title+artist phrase matches.
        let query = format!(
            "track:\"{}\" artist:\"{}\"",
            descriptor.title, descriptor.artist
        );
        let candidates = self
            .client
            .search_tracks(&query, self.config.search_limit)
            .await?;

        if candidates.is_empty() {
            debug!(title = %descriptor.title, "search returned no candidates");
            return Ok(None);
        }

        let best = candidates
            .iter()
            .filter_map(|c| score_candidate(&descriptor, c).map(|s| (s, c)))
            .max_by(|(a, _), (b, _)| a.partial_cmp(b).unwrap_or(Ordering::Equal));

        match best {
            Some((score, candidate)) if score >= self.config.accept_threshold => {
                info!(
                    title = %descriptor.title,
                    matched = %candidate.name,
                    score,
                    "resolved local record"
                );
                Ok(Some(StandardRecord::Resolved {
                    record: candidate.clone(),
                    original: original.clone(),
                }))
            }
            Some((score, _)) => {
                debug!(title = %descriptor.title, score, "best candidate below threshold");
                Ok(None)
            }
            None => {
                debug!(title = %descriptor.title, "no candidate passed the gate");
                Ok(None)
            }
        }
    }
}

/// Score a candidate against the descriptor, or `None` when it fails the
/// title/artist gate.
///
/// Title: 100 exact, 80 when the candidate title is a prefix of the target,
/// 70 when the target is a prefix of the candidate. Artist: +50 exact, +30
/// prefix either way. Album (optional): +20 exact, +10 prefix. Popularity
/// breaks ties at a tenth of a point each.
fn score_candidate(target: &LocalDescriptor, candidate: &Record) -> Option<f64> {
    let target_title = normalize(&target.title);
    let target_artist = normalize(&target.artist);
    let candidate_title = normalize(&candidate.name);

    let title_score = if candidate_title == target_title {
        100.0
    } else if target_title.starts_with(&candidate_title) && !candidate_title.is_empty() {
        80.0
    } else if candidate_title.starts_with(&target_title) && !target_title.is_empty() {
        70.0
    } else {
        return None;
    };

    let artist_score = candidate
        .artists
        .iter()
        .map(|a| normalize(a))
        .filter_map(|a| {
            if a == target_artist {
                Some(50.0)
            } else if prefix_related(&a, &target_artist) {
                Some(30.0)
            } else {
                None
            }
        })
        .fold(None, |best: Option<f64>, s| {
            Some(best.map_or(s, |b| b.max(s)))
        })?;

    let album_score = match &candidate.album {
        Some(album) if !target.album.is_empty() => {
            let a = normalize(album);
            let t = normalize(&target.album);
            if a == t {
                20.0
            } else if prefix_related(&a, &t) {
                10.0
            } else {
                0.0
            }
        }
        _ => 0.0,
    };

    Some(title_score + artist_score + album_score + candidate.popularity as f64 * 0.1)
}

fn prefix_related(a: &str, b: &str) -> bool {
    !a.is_empty() && !b.is_empty() && (a.starts_with(b) || b.starts_with(a))
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}
