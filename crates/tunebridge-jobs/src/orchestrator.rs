//! Staggered concurrent fan-out of sync jobs, one per source playlist.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tokio::time::sleep;
use tracing::{error, info, info_span, warn, Instrument};

use tunebridge_catalog::PlaylistProvisioner;
use tunebridge_core::defaults;
use tunebridge_core::{
    Error, JobStatus, PlaylistRef, Result, SourceItem, SourcePlaylistProvider, SyncJob,
    SyncJobReport,
};

use crate::events::SyncEvent;
use crate::processor::ItemProcessor;

/// Configuration for a sync batch.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Delay between consecutive job launches.
    pub stagger: Duration,
    /// Destination playlist every job appends to.
    pub destination_name: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            stagger: Duration::from_millis(defaults::SYNC_STAGGER_MS),
            destination_name: defaults::PLAYLIST_NAME.to_string(),
        }
    }
}

impl SyncConfig {
    /// Set the launch stagger.
    pub fn with_stagger(mut self, stagger: Duration) -> Self {
        self.stagger = stagger;
        self
    }

    /// Set the destination playlist name.
    pub fn with_destination_name(mut self, name: impl Into<String>) -> Self {
        self.destination_name = name.into();
        self
    }
}

/// Runs a batch of source playlists concurrently.
///
/// Jobs share only read-only handles. Items inside one job are processed
/// strictly in order.
pub struct SyncOrchestrator {
    source: Arc<dyn SourcePlaylistProvider>,
    provisioner: PlaylistProvisioner,
    processor: ItemProcessor,
    config: SyncConfig,
    event_tx: broadcast::Sender<SyncEvent>,
}

impl SyncOrchestrator {
    pub fn new(
        source: Arc<dyn SourcePlaylistProvider>,
        provisioner: PlaylistProvisioner,
        processor: ItemProcessor,
        config: SyncConfig,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(defaults::EVENT_BUS_CAPACITY);
        Self {
            source,
            provisioner,
            processor,
            config,
            event_tx,
        }
    }

    /// Get a receiver for sync events.
    pub fn events(&self) -> broadcast::Receiver<SyncEvent> {
        self.event_tx.subscribe()
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Launch one job per playlist id, `stagger` apart, and wait for all of
    /// them. Reports come back in input order.
    pub async fn run(&self, playlist_ids: &[String]) -> Vec<SyncJobReport> {
        let start = Instant::now();
        let jobs: Vec<SyncJob> = playlist_ids.iter().map(SyncJob::new).collect();

        info!(
            subsystem = "jobs",
            component = "orchestrator",
            job_count = jobs.len(),
            stagger_ms = self.config.stagger.as_millis() as u64,
            destination = %self.config.destination_name,
            ai_extraction = self.processor.has_extractor(),
            "Starting sync batch"
        );

        let mut tasks = JoinSet::new();
        for (index, job) in jobs.iter().cloned().enumerate() {
            if index > 0 && !self.config.stagger.is_zero() {
                sleep(self.config.stagger).await;
            }
            let runner = self.runner();
            let span = info_span!(
                "sync_job",
                job_id = %job.id,
                playlist_id = %job.source_playlist_id
            );
            tasks.spawn(
                async move { (index, runner.execute(job).await) }.instrument(span),
            );
        }

        let mut reports: Vec<Option<SyncJobReport>> = vec![None; jobs.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, report)) => reports[index] = Some(report),
                Err(e) => error!(error = ?e, "Sync job task panicked"),
            }
        }

        let reports: Vec<SyncJobReport> = reports
            .into_iter()
            .zip(jobs)
            .map(|(report, job)| report.unwrap_or_else(|| panicked_report(job)))
            .collect();

        let failed = reports
            .iter()
            .filter(|r| r.status() == JobStatus::Failed)
            .count();
        info!(
            subsystem = "jobs",
            component = "orchestrator",
            job_count = reports.len(),
            failed,
            duration_ms = start.elapsed().as_millis() as u64,
            "Sync batch finished"
        );
        reports
    }

    fn runner(&self) -> JobRunner {
        JobRunner {
            source: self.source.clone(),
            provisioner: self.provisioner.clone(),
            processor: self.processor.clone(),
            destination_name: self.config.destination_name.clone(),
            event_tx: self.event_tx.clone(),
        }
    }
}

/// A task that died before producing a report counts as failed.
fn panicked_report(mut job: SyncJob) -> SyncJobReport {
    if !job.status.is_terminal() {
        if job.status == JobStatus::Pending {
            job.transition(JobStatus::Running);
        }
        job.transition(JobStatus::Failed);
    }
    let mut report = SyncJobReport::new(job);
    report.error = Some("job task panicked".to_string());
    report
}

/// Owned handles for executing a single job in a spawned task.
struct JobRunner {
    source: Arc<dyn SourcePlaylistProvider>,
    provisioner: PlaylistProvisioner,
    processor: ItemProcessor,
    destination_name: String,
    event_tx: broadcast::Sender<SyncEvent>,
}

impl JobRunner {
    async fn execute(self, mut job: SyncJob) -> SyncJobReport {
        let start = Instant::now();
        job.transition(JobStatus::Running);
        let job_id = job.id;
        let playlist_id = job.source_playlist_id.clone();

        info!("Processing sync job");
        let _ = self.event_tx.send(SyncEvent::JobStarted {
            job_id,
            playlist_id: playlist_id.clone(),
        });

        let mut report = SyncJobReport::new(job);

        let (items, destination) = match self.prepare(&playlist_id).await {
            Ok(prepared) => prepared,
            Err(e) => {
                error!(
                    error = %e,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Sync job failed"
                );
                report.job.transition(JobStatus::Failed);
                report.error = Some(e.to_string());
                let _ = self.event_tx.send(SyncEvent::JobFailed {
                    job_id,
                    playlist_id,
                    error: e.to_string(),
                });
                return report;
            }
        };
        report.destination = Some(destination.clone());

        for item in &items {
            let resolution = self.processor.process(item, &destination).await;
            report.record(resolution.outcome);
            let _ = self.event_tx.send(SyncEvent::ItemProcessed {
                job_id,
                playlist_id: playlist_id.clone(),
                song: resolution.song,
                artist: resolution.artist,
                outcome: resolution.outcome,
                tier: resolution.tier,
            });
        }

        report.job.transition(JobStatus::Completed);
        if report.processed() > 0 && report.added == 0 {
            warn!(item_count = items.len(), "No items could be added");
        }
        info!(
            added = report.added,
            not_found = report.not_found,
            add_failed = report.add_failed,
            duration_ms = start.elapsed().as_millis() as u64,
            "Sync job completed"
        );
        let _ = self.event_tx.send(SyncEvent::JobCompleted {
            job_id,
            playlist_id,
            added: report.added,
            not_found: report.not_found,
            add_failed: report.add_failed,
        });
        report
    }

    /// Job-scoped steps: fetch the source items, then resolve the
    /// destination playlist. Either failure aborts the job.
    async fn prepare(&self, playlist_id: &str) -> Result<(Vec<SourceItem>, PlaylistRef)> {
        let items = self.source.fetch_items(playlist_id).await.map_err(|e| match e {
            Error::Fetch(_) => e,
            other => Error::Fetch(other.to_string()),
        })?;
        info!(item_count = items.len(), "Fetched source items");

        let destination = self
            .provisioner
            .check_or_create(&self.destination_name)
            .await?;
        Ok((items, destination))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SyncConfig::default();
        assert_eq!(config.stagger, Duration::from_millis(500));
        assert_eq!(config.destination_name, "Playlist");
    }

    #[test]
    fn test_config_builders() {
        let config = SyncConfig::default()
            .with_stagger(Duration::ZERO)
            .with_destination_name("Imported");
        assert!(config.stagger.is_zero());
        assert_eq!(config.destination_name, "Imported");
    }

    #[test]
    fn test_panicked_report_is_failed() {
        let report = panicked_report(SyncJob::new("PL1"));
        assert_eq!(report.status(), JobStatus::Failed);
        assert!(report.job.started_at.is_some());
        assert!(report.error.is_some());
    }

    #[test]
    fn test_panicked_report_keeps_terminal_job() {
        let mut job = SyncJob::new("PL1");
        job.transition(JobStatus::Running);
        job.transition(JobStatus::Failed);
        let completed_at = job.completed_at;

        let report = panicked_report(job);
        assert_eq!(report.status(), JobStatus::Failed);
        assert_eq!(report.job.completed_at, completed_at);
    }
}
