//! # CLI Module
//!
//! Command handlers behind the `radiosync` binary. Every handler builds the
//! components it needs from the environment, runs, and reports through the
//! logging macros. Fatal errors end the process with a non-zero exit code so a
//! restart-on-crash supervisor can take over.
//!
//! ```text
//! radiosync run          # reconcile until Ctrl-C
//! radiosync tick         # a single pass, printed as a table
//! radiosync auth         # one-time browser authorization
//! radiosync playlists    # cached monthly playlists
//! radiosync tracks --playlist "Red March 2024"
//! ```

mod auth;
mod context;
mod library;
mod reconcile;

pub use auth::auth;
pub use library::list_playlists;
pub use library::list_tracks;
pub use reconcile::run;
pub use reconcile::tick;
