//! Two-tier track matching against catalog search.
//!
//! Tier 1 queries by track and artist and requires both to match; tier 2
//! queries by track alone. Candidates are accepted first-match in the
//! catalog's own relevance order, using case-insensitive containment.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, trace, warn};

use tunebridge_core::defaults::SEARCH_LIMIT;
use tunebridge_core::{
    CatalogTrack, DestinationCatalog, Error, MatchResult, MatchTier, NormalizedQuery, Result,
};

/// Resolves normalized queries to catalog track ids.
#[derive(Clone)]
pub struct TrackMatcher {
    catalog: Arc<dyn DestinationCatalog>,
    limit: usize,
}

impl TrackMatcher {
    pub fn new(catalog: Arc<dyn DestinationCatalog>) -> Self {
        Self {
            catalog,
            limit: SEARCH_LIMIT,
        }
    }

    /// Override the number of candidates requested per tier.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    /// Find the first acceptable candidate for `query`.
    ///
    /// Returns `Error::NoMatchFound` when neither tier accepts a candidate.
    /// A search failure only fails its own tier.
    ///
    /// An empty track (e.g. a title made only of noise tokens) returns
    /// `NoMatchFound` without querying the catalog. Containment against an
    /// empty string would accept any candidate, so searching would add
    /// whatever the catalog ranks first.
    pub async fn find(&self, query: &NormalizedQuery) -> Result<MatchResult> {
        let track = query.track.as_str();
        let artist = query.artist.as_str();

        if track.is_empty() {
            debug!(subsystem = "catalog", component = "matcher", "Empty track name, skipping search");
            return Err(Error::no_match(track, artist));
        }

        if !artist.is_empty() {
            let filter = format!("track:{} artist:{}", track, artist);
            let accepted = self
                .run_tier(MatchTier::TrackAndArtist, &filter, |c| {
                    contains_ci(&c.title, track) && contains_ci(&c.primary_artist, artist)
                })
                .await;
            if let Some(track_id) = accepted {
                return Ok(MatchResult {
                    track_id,
                    tier: MatchTier::TrackAndArtist,
                });
            }
            debug!(
                subsystem = "catalog",
                component = "matcher",
                track,
                artist,
                "Track and artist search found nothing, trying track only"
            );
        }

        let filter = format!("track:{}", track);
        let accepted = self
            .run_tier(MatchTier::TrackOnly, &filter, |c| contains_ci(&c.title, track))
            .await;

        match accepted {
            Some(track_id) => Ok(MatchResult {
                track_id,
                tier: MatchTier::TrackOnly,
            }),
            None => Err(Error::no_match(track, artist)),
        }
    }

    async fn run_tier<F>(&self, tier: MatchTier, filter: &str, accept: F) -> Option<String>
    where
        F: Fn(&CatalogTrack) -> bool,
    {
        let start = Instant::now();
        let candidates = match self.catalog.search(filter, self.limit).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(
                    subsystem = "catalog",
                    component = "matcher",
                    tier = tier.number(),
                    query = filter,
                    error = %e,
                    "Catalog search failed"
                );
                return None;
            }
        };

        debug!(
            subsystem = "catalog",
            component = "matcher",
            tier = tier.number(),
            query = filter,
            result_count = candidates.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Catalog search complete"
        );

        candidates.into_iter().find_map(|candidate| {
            trace!(
                tier = tier.number(),
                title = %candidate.title,
                primary_artist = %candidate.primary_artist,
                "Candidate"
            );
            accept(&candidate).then_some(candidate.id)
        })
    }
}

/// Case-insensitive containment: does `haystack` contain `needle`?
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
