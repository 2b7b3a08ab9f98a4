use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("io error: {0}")]
    IOError(#[from] std::io::Error),

    #[error("json error: {0}")]
    JSONError(#[from] serde_json::Error),

    #[error("snapshot error: {0}")]
    SnapshotError(#[from] bincode::Error),

    #[error("session has no valid access token")]
    Unauthenticated,

    #[error("backend rejected write ({status}): {reason}")]
    SyncRejected { status: u16, reason: String },

    #[error("sync worker is no longer running")]
    SyncClosed,

    #[error("background task failed: {0}")]
    JoinError(#[from] tokio::task::JoinError),
}

impl Error {
    pub fn invalid(message: impl Into<String>) -> Error {
        Error::InvalidArgument(message.into())
    }
}
