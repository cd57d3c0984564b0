//! Get-or-create resolution of the destination playlist.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use tunebridge_core::{DestinationPlaylistStore, Error, PlaylistOptions, PlaylistRef, Result};

/// Resolves a playlist name to a destination playlist, creating it when absent.
///
/// Sequential calls with the same name are idempotent. Concurrent calls for
/// a name that does not exist yet can each create a playlist; nothing here
/// serializes them.
#[derive(Clone)]
pub struct PlaylistProvisioner {
    store: Arc<dyn DestinationPlaylistStore>,
    options: PlaylistOptions,
}

impl PlaylistProvisioner {
    pub fn new(store: Arc<dyn DestinationPlaylistStore>, options: PlaylistOptions) -> Self {
        Self { store, options }
    }

    /// Create-time policy applied to new playlists.
    pub fn options(&self) -> &PlaylistOptions {
        &self.options
    }

    /// Return the first playlist named exactly `name`, or create one.
    ///
    /// Every failure surfaces as `Error::Provision`.
    #[instrument(skip(self), fields(subsystem = "catalog", component = "provisioner", op = "check_or_create"))]
    pub async fn check_or_create(&self, name: &str) -> Result<PlaylistRef> {
        let existing = self.store.list().await.map_err(into_provision)?;
        debug!(playlist_count = existing.len(), "Listed destination playlists");

        if let Some(found) = existing.into_iter().find(|p| p.name == name) {
            info!(destination_id = %found.id, "Playlist already exists");
            return Ok(found);
        }

        let created = self
            .store
            .create(name, &self.options)
            .await
            .map_err(into_provision)?;
        info!(
            destination_id = %created.id,
            public = self.options.visibility.is_public(),
            "Created destination playlist"
        );
        Ok(created)
    }
}

fn into_provision(err: Error) -> Error {
    match err {
        Error::Provision(_) => err,
        other => Error::Provision(other.to_string()),
    }
}
