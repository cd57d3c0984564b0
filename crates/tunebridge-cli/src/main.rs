//! tunebridge: copy video playlists and free-text song lists into a
//! destination playlist.
//!
//! Configuration comes from the environment (and `.env`), see [`config`].

mod config;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{error, info, warn};

use tunebridge_catalog::{
    PlaylistProvisioner, SongListSource, SpotifyClient, TrackMatcher, YouTubePlaylistSource,
};
use tunebridge_core::{
    Error, ItemOutcome, JobStatus, Normalizer, SourcePlaylistProvider, SyncJobReport,
};
use tunebridge_inference::ExtractionService;
use tunebridge_jobs::{ItemProcessor, SyncEvent, SyncOrchestrator};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "tunebridge")]
#[command(author, version, about = "Sync video playlists and song lists into a Spotify playlist")]
#[command(propagate_version = true)]
struct Cli {
    /// Destination playlist name (overrides PLAYLIST_NAME_TO_SAVE)
    #[arg(long, global = true)]
    playlist_name: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync YouTube playlists, one job per playlist id
    Playlist {
        /// Playlist ids (default: the PLAYLISTS JSON array)
        ids: Vec<String>,
    },

    /// Sync free-text song files (`songs*`), one job per file
    Songs {
        /// Directory holding the song files (default: SONGS_DIR)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    let _log_guard = logging::init_tracing();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!(subsystem = "cli", error = %e, "Sync aborted");
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Returns `Ok(false)` when at least one job failed.
async fn run(cli: Cli) -> anyhow::Result<bool> {
    let mut config = AppConfig::from_env()?;
    if let Some(name) = cli.playlist_name {
        config.destination_name = name;
    }
    let normalizer = Arc::new(Normalizer::new(&config.normalizer)?);

    // Everything that can fail fatally runs before any job starts.
    let (source, playlist_ids, extraction) = match cli.command {
        Commands::Playlist { ids } => {
            let ids = if ids.is_empty() {
                config.playlists.clone()
            } else {
                ids
            };
            if ids.is_empty() {
                return Err(Error::Config(
                    "no playlist ids given; pass IDS or set PLAYLISTS".to_string(),
                )
                .into());
            }
            let source = YouTubePlaylistSource::new(config.youtube()?)?;
            let extraction = ExtractionService::from_config(&config.extraction)?;
            let source: Arc<dyn SourcePlaylistProvider> = Arc::new(source);
            (source, ids, Some(extraction))
        }
        Commands::Songs { dir } => {
            let source =
                SongListSource::new(dir.unwrap_or_else(|| config.songs_dir.clone()));
            let files = source.discover().await?;
            if files.is_empty() {
                warn!(
                    subsystem = "cli",
                    dir = %source.dir().display(),
                    "No song files found"
                );
            }
            let source: Arc<dyn SourcePlaylistProvider> = Arc::new(source);
            (source, files, None)
        }
    };

    let spotify = Arc::new(SpotifyClient::connect(config.spotify.clone()).await?);
    let extractor = match extraction {
        Some(service) => service.into_extractor().await,
        None => None,
    };

    info!(
        subsystem = "cli",
        job_count = playlist_ids.len(),
        destination = %config.destination_name,
        extractor = extractor.as_ref().map(|e| e.backend_name()).unwrap_or("none"),
        "Starting sync"
    );

    let processor = ItemProcessor::new(
        extractor,
        normalizer,
        TrackMatcher::new(spotify.clone()).with_limit(config.search_limit),
        spotify.clone(),
    );
    let provisioner = PlaylistProvisioner::new(spotify, config.playlist_options.clone());
    let orchestrator = SyncOrchestrator::new(source, provisioner, processor, config.sync());

    let printer = tokio::spawn(print_progress(orchestrator.events()));
    let reports = orchestrator.run(&playlist_ids).await;
    // Closing the channel lets the printer drain and stop.
    drop(orchestrator);
    if let Err(e) = printer.await {
        warn!(subsystem = "cli", error = %e, "Progress printer stopped abnormally");
    }

    for report in &reports {
        println!("{}", summary_line(report));
    }
    Ok(reports.iter().all(|r| r.status() != JobStatus::Failed))
}

async fn print_progress(mut events: broadcast::Receiver<SyncEvent>) {
    loop {
        match events.recv().await {
            Ok(SyncEvent::ItemProcessed {
                song,
                artist,
                outcome: ItemOutcome::Added,
                ..
            }) => println!("{}", added_line(&song, &artist)),
            Ok(_) => {}
            Err(RecvError::Lagged(n)) => {
                warn!(missed = n, "Progress printer lagged, missed events");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

fn added_line(song: &str, artist: &str) -> String {
    if artist.is_empty() {
        format!("Added '{}'", song)
    } else {
        format!("Added '{}' by '{}'", song, artist)
    }
}

fn summary_line(report: &SyncJobReport) -> String {
    let status = match report.status() {
        JobStatus::Pending => "pending",
        JobStatus::Running => "running",
        JobStatus::Completed => "completed",
        JobStatus::Failed => "failed",
    };
    let mut line = format!(
        "{}: {} (added {}, not found {}, add failed {})",
        report.job.source_playlist_id,
        status,
        report.added,
        report.not_found,
        report.add_failed
    );
    if let Some(error) = &report.error {
        line.push_str(&format!(": {}", error));
    }
    line
}
