//! Per-item resolution: extract, fall back, normalize, match, add.

use std::sync::Arc;

use tracing::{debug, info, warn};

use tunebridge_catalog::TrackMatcher;
use tunebridge_core::{
    DestinationPlaylistStore, ItemOutcome, MatchTier, Normalizer, PlaylistRef,
    SongArtistExtractor, SourceItem,
};

/// What happened to one source item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemResolution {
    /// Song and artist the lookup started from (extracted or raw).
    pub song: String,
    pub artist: String,
    pub outcome: ItemOutcome,
    pub track_id: Option<String>,
    pub tier: Option<MatchTier>,
}

impl ItemResolution {
    fn skipped(song: String, artist: String, outcome: ItemOutcome) -> Self {
        Self {
            song,
            artist,
            outcome,
            track_id: None,
            tier: None,
        }
    }
}

/// Resolves source items one at a time. Item-level failures never escape:
/// they become an [`ItemOutcome`].
#[derive(Clone)]
pub struct ItemProcessor {
    extractor: Option<Arc<dyn SongArtistExtractor>>,
    normalizer: Arc<Normalizer>,
    matcher: TrackMatcher,
    store: Arc<dyn DestinationPlaylistStore>,
}

impl ItemProcessor {
    pub fn new(
        extractor: Option<Arc<dyn SongArtistExtractor>>,
        normalizer: Arc<Normalizer>,
        matcher: TrackMatcher,
        store: Arc<dyn DestinationPlaylistStore>,
    ) -> Self {
        Self {
            extractor,
            normalizer,
            matcher,
            store,
        }
    }

    pub fn has_extractor(&self) -> bool {
        self.extractor.is_some()
    }

    /// Resolve one item and append it to `destination` on a match.
    pub async fn process(&self, item: &SourceItem, destination: &PlaylistRef) -> ItemResolution {
        let (song, artist) = self.song_and_artist(item).await;
        let query = self.normalizer.normalize_query(&song, &artist);

        let matched = match self.matcher.find(&query).await {
            Ok(matched) => matched,
            Err(e) => {
                warn!(
                    track = %query.track,
                    artist = %query.artist,
                    error = %e,
                    "Unable to find track, skipping"
                );
                return ItemResolution::skipped(song, artist, ItemOutcome::SkippedNotFound);
            }
        };

        let uri = self.store.track_uri(&matched.track_id);
        if let Err(e) = self.store.add_tracks(&destination.id, &[uri]).await {
            warn!(
                track = %query.track,
                destination_id = %destination.id,
                error = %e,
                "Unable to add track to playlist, skipping"
            );
            return ItemResolution::skipped(song, artist, ItemOutcome::SkippedAddFailed);
        }

        info!(
            track = %query.track,
            artist = %query.artist,
            tier = matched.tier.number(),
            "Added track"
        );
        ItemResolution {
            song,
            artist,
            outcome: ItemOutcome::Added,
            track_id: Some(matched.track_id),
            tier: Some(matched.tier),
        }
    }

    /// Extracted song/artist, or the raw title and owner when extraction is
    /// off, fails, or yields an empty field.
    async fn song_and_artist(&self, item: &SourceItem) -> (String, String) {
        if let Some(extractor) = &self.extractor {
            match extractor.extract_song_artist(&item.title).await {
                Ok(result) if !result.is_empty() => {
                    debug!(song = %result.song, artist = %result.artist, "Extracted song and artist");
                    return (result.song, result.artist);
                }
                Ok(_) => warn!(
                    title = %item.title,
                    backend = extractor.backend_name(),
                    "Extraction returned no song/artist, using raw metadata"
                ),
                Err(e) => warn!(
                    title = %item.title,
                    backend = extractor.backend_name(),
                    error = %e,
                    "AI extraction failed, using raw metadata"
                ),
            }
        }
        (item.title.clone(), item.owner_name.clone())
    }
}
