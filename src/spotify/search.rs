use super::SpotifyClient;
use crate::{
    error::Result,
    types::{SearchResponse, SongQuery, Track},
    warning,
};

/// Picks the track with the highest popularity; on ties the first one wins.
pub fn most_popular(tracks: Vec<Track>) -> Option<Track> {
    tracks.into_iter().fold(None, |best, track| match best {
        Some(best) if best.popularity >= track.popularity => Some(best),
        _ => Some(track),
    })
}

impl SpotifyClient {
    pub(super) async fn search(&self, query: &SongQuery) -> Result<Option<Track>> {
        let url = self.endpoint("/search");
        let terms = query.search_terms();
        let operation = format!("search_track {query}");

        let Some(body) = self
            .fetch(&operation, true, |client| {
                client.get(&url).query(&[
                    ("q", terms.as_str()),
                    ("type", "track"),
                    ("market", self.market.as_str()),
                ])
            })
            .await?
        else {
            return Ok(None);
        };

        match serde_json::from_str::<SearchResponse>(&body) {
            Ok(response) => Ok(most_popular(response.tracks.items)),
            Err(e) => {
                warning!("{}: {} Response: {}", operation, e, body);
                Ok(None)
            }
        }
    }
}
