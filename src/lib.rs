//! Radio-to-Spotify playlist reconciliation library.
//!
//! This library keeps track of the songs a set of internet radio stations are
//! playing and mirrors them into one Spotify playlist per station and month. It
//! runs unattended: a polling loop asks every station for its current song,
//! resolves the song through the Spotify catalog search and adds new matches to
//! the playlist, remembering every attempt so nothing is searched twice.
//!
//! # Modules
//!
//! - `api` - HTTP endpoints of the local authorization callback server
//! - `cli` - Command-line entry points
//! - `config` - Environment-backed settings
//! - `error` - Error type shared by all layers
//! - `management` - Token manager and the playlist/track caches
//! - `reconcile` - The reconciliation loop and its sleep policy
//! - `server` - Local HTTP server used while bootstrapping authorization
//! - `sources` - Now-playing sources, one per radio station
//! - `spotify` - Spotify Web API and token endpoint client
//! - `storage` - Embedded SQLite persistence
//! - `types` - Data structures shared across modules
//! - `utils` - Small helpers (naming, time, encoding)

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod reconcile;
pub mod server;
pub mod sources;
pub mod spotify;
pub mod storage;
pub mod types;
pub mod utils;

/// Prints an informational message with a blue bullet point.
///
/// Every log line starts with a UTC timestamp since the worker usually runs
/// under a service manager rather than in a terminal.
///
/// # Example
///
/// ```
/// info!("Reconciling {} sources", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("{} [{}] {}", $crate::utils::timestamp().as_str().dimmed(), "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```
/// success!("Track added to {}", playlist.name);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("{} [{}] {}", $crate::utils::timestamp().as_str().dimmed(), "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Used for recoverable upstream failures: a station returning garbage, a
/// catalog call that failed. The worker keeps going after a warning.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("{} [{}] {}", $crate::utils::timestamp().as_str().dimmed(), "!".yellow().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a message the operator must act on, without exiting.
///
/// # Example
///
/// ```
/// critical!("Store this refresh token as SPOTIFY_REFRESH_TOKEN: {}", token);
/// ```
#[macro_export]
macro_rules! critical {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("{} [{}] {}", $crate::utils::timestamp().as_str().dimmed(), "!!".red().bold(), std::format!($($arg)*).as_str().bold());
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only used at the top of the binary: a non-zero exit hands control to the
/// service manager, which restarts the worker.
///
/// # Example
///
/// ```
/// error!("Failed to load configuration: {}", e);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("{} [{}] {}", $crate::utils::timestamp().as_str().dimmed(), "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}
