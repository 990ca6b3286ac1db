//! # API Module
//!
//! HTTP endpoints served by the local server during `radiosync auth`.
//!
//! - [`callback`] - Spotify redirects here with the one-time authorization code.
//!   The handler checks the `state` parameter and stores the code in the shared
//!   [`PendingAuthorization`](crate::types::PendingAuthorization), where the
//!   waiting bootstrap flow picks it up.
//! - [`health`] - Status and version, handy to check the server is reachable
//!   before opening the browser.
//!
//! ```rust,ignore
//! use radiosync::server::router;
//!
//! let app = router(pending);
//! ```

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
