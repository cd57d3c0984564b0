//! Free-text song lists on disk.
//!
//! Every file in the songs directory whose name starts with `songs` is one
//! source playlist, identified by its path. Each non-blank line is an item.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

use tunebridge_core::defaults::SONGS_FILE_PREFIX;
use tunebridge_core::{Error, Result, SourceItem, SourcePlaylistProvider};

pub struct SongListSource {
    dir: PathBuf,
}

impl SongListSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// List the song files in the directory, sorted by path.
    ///
    /// An unreadable directory is a `Config` error.
    pub async fn discover(&self) -> Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(&self.dir).await.map_err(|e| {
            Error::Config(format!(
                "Unable to read songs directory {}: {}",
                self.dir.display(),
                e
            ))
        })?;

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let is_song_file = entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with(SONGS_FILE_PREFIX));
            if is_song_file && entry.file_type().await?.is_file() {
                files.push(entry.path().to_string_lossy().into_owned());
            }
        }
        files.sort();

        debug!(dir = %self.dir.display(), file_count = files.len(), "Discovered song files");
        Ok(files)
    }
}

/// Parse file contents into free-text items: trimmed, blank lines dropped.
pub fn parse_song_lines(contents: &str) -> Vec<SourceItem> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(SourceItem::free_text)
        .collect()
}

#[async_trait]
impl SourcePlaylistProvider for SongListSource {
    #[instrument(skip(self), fields(subsystem = "source", component = "song_list", op = "fetch_items"))]
    async fn fetch_items(&self, playlist_id: &str) -> Result<Vec<SourceItem>> {
        let contents = tokio::fs::read_to_string(playlist_id)
            .await
            .map_err(|e| Error::Fetch(format!("Unable to read file {}: {}", playlist_id, e)))?;
        let items = parse_song_lines(&contents);
        info!(item_count = items.len(), "Read song list");
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_song_lines() {
        let items = parse_song_lines("Yesterday\n\n  Numb Linkin Park  \r\n\t\nLast line");
        assert_eq!(
            items,
            vec![
                SourceItem::free_text("Yesterday"),
                SourceItem::free_text("Numb Linkin Park"),
                SourceItem::free_text("Last line"),
            ]
        );
        assert!(items.iter().all(|i| i.owner_name.is_empty()));
    }

    #[test]
    fn test_parse_empty_file() {
        assert!(parse_song_lines("").is_empty());
        assert!(parse_song_lines("\n \n").is_empty());
    }

    #[tokio::test]
    async fn test_discover_filters_prefix_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("songs_b.txt"), "B").unwrap();
        std::fs::write(dir.path().join("songs_a.txt"), "A").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        std::fs::create_dir(dir.path().join("songs_dir")).unwrap();

        let source = SongListSource::new(dir.path());
        let files = source.discover().await.unwrap();

        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("songs_a.txt"));
        assert!(files[1].ends_with("songs_b.txt"));
    }

    #[tokio::test]
    async fn test_missing_directory_is_config_error() {
        let source = SongListSource::new("/definitely/not/here");
        let err = source.discover().await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn test_fetch_items_reads_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("songs.txt");
        std::fs::write(&path, "Hey Jude\nBohemian Rhapsody Queen\n").unwrap();

        let source = SongListSource::new(dir.path());
        let items = source
            .fetch_items(path.to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].title, "Bohemian Rhapsody Queen");
    }

    #[tokio::test]
    async fn test_unreadable_file_is_fetch_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = SongListSource::new(dir.path());
        let missing = dir.path().join("songs_missing.txt");
        let err = source
            .fetch_items(missing.to_str().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Fetch(_)));
        assert!(!err.is_fatal());
    }
}
