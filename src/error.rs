use thiserror::Error;

/// Failures raised by the reconciliation engine.
///
/// Transient upstream problems (`Catalog`, `Source`, JSON errors) are
/// normally absorbed close to where they happen and only reported. Everything
/// that [`Error::is_fatal`] flags has to reach the reconciliation loop, which
/// stops the current pass instead of hiding it.
#[derive(Debug, Error)]
pub enum Error {
    #[error("authorization failed: {0}")]
    Auth(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("catalog request failed: {0}")]
    Catalog(String),

    #[error("song source failed: {0}")]
    Source(String),

    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl Error {
    /// Whether the error must abort the current reconciliation pass.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Auth(_) | Error::Config(_) | Error::Storage(_) | Error::Io(_) | Error::Task(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
