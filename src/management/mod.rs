mod auth;
mod playlist;
mod track;

pub use auth::SAFETY_MARGIN_SECS;
pub use auth::TokenManager;
pub use auth::TokenState;
pub use playlist::PlaylistCache;
pub use track::TrackCache;
