use std::sync::Arc;

use reqwest::Client;

use crate::{
    config::{ScheduleSettings, SourceSettings, SpotifySettings, StorageSettings},
    error::Result,
    management::{PlaylistCache, TokenManager, TrackCache},
    reconcile::Reconciler,
    sources,
    spotify::{Catalog, SpotifyClient},
    storage::Database,
};

/// Components shared by the commands that talk to Spotify.
pub(super) struct Context {
    pub settings: SpotifySettings,
    pub client: Client,
    pub database: Database,
    pub tokens: Arc<TokenManager>,
}

impl Context {
    pub async fn load() -> Result<Self> {
        let settings = SpotifySettings::from_env()?;
        let storage = StorageSettings::from_env()?;
        let database = Database::open_at(storage.database).await?;
        let client = Client::new();
        let tokens = Arc::new(TokenManager::new(
            settings.clone(),
            database.credentials(),
            client.clone(),
        )?);

        Ok(Self {
            settings,
            client,
            database,
            tokens,
        })
    }

    pub fn reconciler(&self) -> Result<Reconciler> {
        let sources = sources::configured_sources(&SourceSettings::from_env()?, &self.client);
        let catalog: Arc<dyn Catalog> = Arc::new(SpotifyClient::new(
            self.client.clone(),
            &self.settings,
            Arc::clone(&self.tokens),
        ));

        Ok(Reconciler::new(
            sources,
            Arc::clone(&catalog),
            PlaylistCache::new(self.database.playlists(), catalog, &self.settings.user_id),
            TrackCache::new(self.database.tracks()),
            ScheduleSettings::from_env()?,
            &self.settings.user_id,
        ))
    }
}
