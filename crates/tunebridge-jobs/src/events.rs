//! Progress events published while a sync batch runs.

use uuid::Uuid;

use tunebridge_core::{ItemOutcome, MatchTier};

/// Event emitted by the sync orchestrator.
#[derive(Debug, Clone)]
pub enum SyncEvent {
    /// A job moved to `Running`.
    JobStarted { job_id: Uuid, playlist_id: String },
    /// One source item was resolved (or skipped).
    ItemProcessed {
        job_id: Uuid,
        playlist_id: String,
        /// Song name the lookup used, before normalization.
        song: String,
        artist: String,
        outcome: ItemOutcome,
        tier: Option<MatchTier>,
    },
    /// A job reached `Completed`.
    JobCompleted {
        job_id: Uuid,
        playlist_id: String,
        added: usize,
        not_found: usize,
        add_failed: usize,
    },
    /// A job reached `Failed`.
    JobFailed {
        job_id: Uuid,
        playlist_id: String,
        error: String,
    },
}
