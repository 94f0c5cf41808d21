use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("store error: {0}")]
    Store(#[from] pod_store::StoreError),

    #[error("path error: {0}")]
    Path(#[from] pod_path::PathError),

    #[error("corrupt resource row: {0}")]
    Type(#[from] pod_types::TypeError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("write lock poisoned")]
    LockPoisoned,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;
