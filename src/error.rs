use thiserror::Error;

#[derive(Error, Debug)]
pub enum PayoutError {
    /// Missing or invalid input. The only error a submitter ever sees.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    /// The provider declined, errored or timed out. Always recoverable.
    #[error("Payout attempt failed: {0}")]
    PayoutAttemptFailed(String),
    #[error("Internal inconsistency: {0}")]
    InternalInconsistency(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("Storage error: {0}")]
    Storage(#[from] rocksdb::Error),
}

pub type Result<T> = std::result::Result<T, PayoutError>;
