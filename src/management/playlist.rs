use std::sync::Arc;

use crate::{
    error::Result, info, spotify::Catalog, storage::PlaylistStore, success, types::Playlist,
    warning,
};

/// Read-through cache resolving playlist names to catalog playlists.
///
/// Once a name has been resolved it is answered from storage only, so each
/// playlist costs at most one remote lookup for the lifetime of the database.
pub struct PlaylistCache {
    store: PlaylistStore,
    catalog: Arc<dyn Catalog>,
    owner: String,
}

impl PlaylistCache {
    pub fn new(store: PlaylistStore, catalog: Arc<dyn Catalog>, owner: impl Into<String>) -> Self {
        Self {
            store,
            catalog,
            owner: owner.into(),
        }
    }

    /// Finds the playlist in storage, then remotely, then creates it.
    ///
    /// `Ok(None)` means the catalog could not provide the playlist this time;
    /// nothing is cached and the next call tries again. Listing failures never
    /// lead to a creation, to avoid duplicate playlists.
    pub async fn resolve(&self, name: &str) -> Result<Option<Playlist>> {
        if let Some(playlist) = self.store.get(name).await? {
            return Ok(Some(playlist));
        }

        let found = match self.catalog.find_playlist(name, &self.owner).await {
            Ok(found) => found,
            Err(e) if !e.is_fatal() => {
                warning!("Cannot look up playlist {}: {}", name, e);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let playlist = match found {
            Some(playlist) => {
                info!("Found playlist {} ({})", playlist.name, playlist.id);
                playlist
            }
            None => match self.catalog.create_playlist(name, true, &self.owner).await? {
                Some(playlist) => {
                    success!("Created playlist {} ({})", playlist.name, playlist.id);
                    playlist
                }
                None => return Ok(None),
            },
        };

        self.store.put(&playlist).await?;
        Ok(Some(playlist))
    }

    pub async fn cached(&self) -> Result<Vec<Playlist>> {
        self.store.all().await
    }
}
