/// Errors from row store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A lock guarding the tables was poisoned by a panicking writer.
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error while reading or writing a snapshot file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A snapshot document does not have the expected shape.
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
