use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database connection lock poisoned")]
    LockPoisoned,
}

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Invalid response: {0}")]
    Parse(String),
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected status {0}")]
    Status(u16),

    #[error("Invalid asset url: {0}")]
    InvalidUrl(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionParseError {
    #[error("No version available")]
    Missing,

    #[error("Expected three numeric components in {0:?}")]
    TooFewComponents(String),
}

/// Terminal failure of a sync run. Carries the first error encountered.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("Remote realm version is malformed: {0}")]
    VersionParse(#[from] VersionParseError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Repopulating the store failed after reset, store left empty: {source}")]
    Repopulate { source: StorageError },

    #[error("Timed out after {0:?} waiting for realm versions")]
    Timeout(Duration),

    #[error("Storage task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
