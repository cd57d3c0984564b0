//! Data model shared by every stage of the track resolution pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// SOURCE SIDE
// =============================================================================

/// One entry from a source playlist, or one line of free text.
///
/// `owner_name` is the uploading channel for video playlists and empty for
/// free-text lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceItem {
    pub title: String,
    pub owner_name: String,
}

impl SourceItem {
    pub fn new(title: impl Into<String>, owner_name: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            owner_name: owner_name.into(),
        }
    }

    /// A free-text line (no owner metadata).
    pub fn free_text(line: impl Into<String>) -> Self {
        Self::new(line, "")
    }
}

// =============================================================================
// EXTRACTION / NORMALIZATION
// =============================================================================

/// Song and artist pulled out of a video title by an extraction backend.
///
/// Empty fields mean the backend could not extract anything usable; the
/// caller falls back to the raw item metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub song: String,
    pub artist: String,
}

impl ExtractionResult {
    pub fn new(song: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            song: song.into(),
            artist: artist.into(),
        }
    }

    /// True when either field is empty, i.e. extraction failed.
    pub fn is_empty(&self) -> bool {
        self.song.is_empty() || self.artist.is_empty()
    }
}

/// Track and artist after noise-token removal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedQuery {
    pub track: String,
    pub artist: String,
}

// =============================================================================
// DESTINATION SIDE
// =============================================================================

/// One candidate returned by a catalog search, in catalog relevance order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogTrack {
    pub id: String,
    pub title: String,
    pub primary_artist: String,
}

impl CatalogTrack {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        primary_artist: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            primary_artist: primary_artist.into(),
        }
    }
}

/// Matcher tier that produced an accepted candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchTier {
    /// Track and artist filter, both fields checked.
    TrackAndArtist,
    /// Track-only filter, artist unchecked.
    TrackOnly,
}

impl MatchTier {
    /// Numeric tier (1 or 2).
    pub fn number(&self) -> u8 {
        match self {
            MatchTier::TrackAndArtist => 1,
            MatchTier::TrackOnly => 2,
        }
    }
}

/// Accepted candidate from the matcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub track_id: String,
    pub tier: MatchTier,
}

/// Destination playlist identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistRef {
    pub id: String,
    pub name: String,
}

impl PlaylistRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Visibility of newly created destination playlists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaylistVisibility {
    #[default]
    Public,
    Private,
}

impl PlaylistVisibility {
    pub fn is_public(&self) -> bool {
        matches!(self, PlaylistVisibility::Public)
    }
}

impl std::str::FromStr for PlaylistVisibility {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "public" => Ok(PlaylistVisibility::Public),
            "private" => Ok(PlaylistVisibility::Private),
            other => Err(format!("unknown playlist visibility: {}", other)),
        }
    }
}

/// Create-time policy for destination playlists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistOptions {
    pub description: String,
    pub visibility: PlaylistVisibility,
}

impl Default for PlaylistOptions {
    fn default() -> Self {
        Self {
            description: crate::defaults::PLAYLIST_DESCRIPTION.to_string(),
            visibility: PlaylistVisibility::default(),
        }
    }
}

// =============================================================================
// SYNC JOBS
// =============================================================================

/// Sync job lifecycle: `Pending → Running → {Completed, Failed}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    /// Returns true for `Completed` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Whether `self → next` is a legal transition.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Pending, JobStatus::Running)
                | (JobStatus::Running, JobStatus::Completed)
                | (JobStatus::Running, JobStatus::Failed)
        )
    }
}

/// One unit of concurrent work: a single source playlist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncJob {
    pub id: Uuid,
    pub source_playlist_id: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl SyncJob {
    pub fn new(source_playlist_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            source_playlist_id: source_playlist_id.into(),
            status: JobStatus::Pending,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }

    /// Move to `next`, stamping timestamps. Illegal transitions are ignored
    /// and reported as `false`.
    pub fn transition(&mut self, next: JobStatus) -> bool {
        if !self.status.can_transition_to(next) {
            return false;
        }
        match next {
            JobStatus::Running => self.started_at = Some(Utc::now()),
            JobStatus::Completed | JobStatus::Failed => self.completed_at = Some(Utc::now()),
            JobStatus::Pending => {}
        }
        self.status = next;
        true
    }
}

/// Outcome recorded for one source item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemOutcome {
    Added,
    SkippedNotFound,
    SkippedAddFailed,
}

impl ItemOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemOutcome::Added => "added",
            ItemOutcome::SkippedNotFound => "not_found",
            ItemOutcome::SkippedAddFailed => "add_failed",
        }
    }
}

/// Final record of a sync job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncJobReport {
    pub job: SyncJob,
    pub destination: Option<PlaylistRef>,
    pub added: usize,
    pub not_found: usize,
    pub add_failed: usize,
    pub error: Option<String>,
}

impl SyncJobReport {
    pub fn new(job: SyncJob) -> Self {
        Self {
            job,
            destination: None,
            added: 0,
            not_found: 0,
            add_failed: 0,
            error: None,
        }
    }

    /// Count one item outcome.
    pub fn record(&mut self, outcome: ItemOutcome) {
        match outcome {
            ItemOutcome::Added => self.added += 1,
            ItemOutcome::SkippedNotFound => self.not_found += 1,
            ItemOutcome::SkippedAddFailed => self.add_failed += 1,
        }
    }

    /// Items processed (any outcome).
    pub fn processed(&self) -> usize {
        self.added + self.not_found + self.add_failed
    }

    pub fn status(&self) -> JobStatus {
        self.job.status
    }
}
