use tabled::Table;

use crate::{
    config::StorageSettings,
    error,
    error::Result,
    info,
    storage::Database,
    types::{PlaylistTableRow, Resolution, TrackTableRow},
    warning,
};

async fn open_database() -> Result<Database> {
    Database::open_at(StorageSettings::from_env()?.database).await
}

/// Lists the playlists resolved so far, sorted by name.
pub async fn list_playlists() {
    let database = match open_database().await {
        Ok(database) => database,
        Err(e) => error!("Cannot open database. Err: {}", e),
    };

    let mut playlists = match database.playlists().all().await {
        Ok(playlists) => playlists,
        Err(e) => error!("Cannot load playlists. Err: {}", e),
    };

    if playlists.is_empty() {
        info!("No playlist cached yet.");
        return;
    }

    playlists.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    let rows: Vec<PlaylistTableRow> = playlists
        .into_iter()
        .map(|p| PlaylistTableRow {
            name: p.name,
            id: p.id,
            public: if p.public { "yes" } else { "no" }.to_string(),
        })
        .collect();
    println!("{}", Table::new(rows));
}

/// Lists what was recorded for one cached playlist, negative sentinels included.
pub async fn list_tracks(playlist_name: String) {
    let database = match open_database().await {
        Ok(database) => database,
        Err(e) => error!("Cannot open database. Err: {}", e),
    };

    let playlist = match database.playlists().get(&playlist_name).await {
        Ok(Some(playlist)) => playlist,
        Ok(None) => {
            warning!("Playlist {} is not cached.", playlist_name);
            return;
        }
        Err(e) => error!("Cannot load playlist. Err: {}", e),
    };

    let records = match database.tracks().for_playlist(&playlist.id).await {
        Ok(records) => records,
        Err(e) => error!("Cannot load tracks. Err: {}", e),
    };

    let rows: Vec<TrackTableRow> = records
        .into_iter()
        .map(|record| match record.resolution {
            Resolution::Found(track) => TrackTableRow {
                song: record.song.to_string(),
                artists: track.artist_names(),
                popularity: track.popularity.to_string(),
                track: track.name,
            },
            Resolution::NotFound => TrackTableRow {
                song: record.song.to_string(),
                track: "(not found)".to_string(),
                artists: String::new(),
                popularity: String::new(),
            },
        })
        .collect();

    info!("{} record(s) for {}", rows.len(), playlist.name);
    println!("{}", Table::new(rows));
}
