use thiserror::Error;

/// Errors produced when decoding rows into typed records.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("missing attribute: {0}")]
    MissingAttribute(&'static str),

    #[error("invalid attribute {name}: {reason}")]
    InvalidAttribute { name: String, reason: String },

    #[error("attribute {0} is reserved for the protocol handler")]
    ReservedAttribute(String),
}

pub type TypeResult<T> = Result<T, TypeError>;
