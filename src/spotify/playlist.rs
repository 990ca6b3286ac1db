use super::{SpotifyClient, catalog_error};
use crate::{
    error::Result,
    types::{CreatePlaylistRequest, Playlist, PlaylistObject, PlaylistPage, Track},
    warning,
};

const PAGE_LIMIT: &str = "50";

impl SpotifyClient {
    /// Walks every page of `GET /users/{owner}/playlists`.
    pub(super) async fn user_playlists(&self, owner: &str) -> Result<Vec<Playlist>> {
        let operation = "list_playlists";
        let mut playlists = Vec::new();
        let mut next = Some(self.endpoint(&format!("/users/{owner}/playlists?limit={PAGE_LIMIT}")));

        while let Some(url) = next.take() {
            let body = self
                .fetch(operation, true, |client| client.get(&url))
                .await?
                .ok_or_else(|| catalog_error(operation, "request failed"))?;

            let page: PlaylistPage = serde_json::from_str(&body).map_err(|e| {
                warning!("{}: {} Response: {}", operation, e, body);
                catalog_error(operation, e)
            })?;

            playlists.extend(page.items.into_iter().map(Playlist::from));
            next = page.next;
        }

        Ok(playlists)
    }

    pub(super) async fn create(
        &self,
        name: &str,
        public: bool,
        owner: &str,
    ) -> Result<Option<Playlist>> {
        let url = self.endpoint(&format!("/users/{owner}/playlists"));
        let request = CreatePlaylistRequest {
            name: name.to_string(),
            public,
        };

        let Some(body) = self
            .fetch("create_playlist", false, |client| {
                client.post(&url).json(&request)
            })
            .await?
        else {
            return Ok(None);
        };

        match serde_json::from_str::<PlaylistObject>(&body) {
            Ok(created) => Ok(Some(created.into())),
            Err(e) => {
                warning!("create_playlist: {} Response: {}", e, body);
                Ok(None)
            }
        }
    }

    pub(super) async fn insert_track(
        &self,
        playlist: &Playlist,
        track: &Track,
        owner: &str,
    ) -> Result<bool> {
        let url = self.endpoint(&format!("/users/{owner}/playlists/{}/tracks", playlist.id));

        let added = self
            .fetch("add_track", false, |client| {
                client
                    .post(&url)
                    .query(&[("position", "0"), ("uris", track.uri.as_str())])
            })
            .await?
            .is_some();
        Ok(added)
    }
}
