use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecorderError {
    /// A step operation arrived while no recording session was active.
    #[error("no active recording session; start one before recording steps")]
    NoActiveSession,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RecorderError>;
