use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use pod_path::PathError;
use pod_protocol::{reason, status, ProtocolError, Response};

/// Closed set of machine-readable failure codes.
///
/// The path codes (`INVALID_URL` ... `ACCESS_DENIED`) are propagated
/// verbatim from path resolution and normalization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    MissingArgument,
    PathNotFound,
    NotAFile,
    NotAContainer,
    ContainerNotEmpty,
    EntityNotFound,
    UnknownSubcommand,
    UnknownCommand,
    ParentNotFound,
    MethodNotAllowed,
    InvalidUrl,
    InvalidEncoding,
    InvalidPathSegment,
    InvalidName,
    AccessDenied,
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingArgument => "MISSING_ARGUMENT",
            Self::PathNotFound => "PATH_NOT_FOUND",
            Self::NotAFile => "NOT_A_FILE",
            Self::NotAContainer => "NOT_A_CONTAINER",
            Self::ContainerNotEmpty => "CONTAINER_NOT_EMPTY",
            Self::EntityNotFound => "ENTITY_NOT_FOUND",
            Self::UnknownSubcommand => "UNKNOWN_SUBCOMMAND",
            Self::UnknownCommand => "UNKNOWN_COMMAND",
            Self::ParentNotFound => "PARENT_NOT_FOUND",
            Self::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            Self::InvalidUrl => "INVALID_URL",
            Self::InvalidEncoding => "INVALID_ENCODING",
            Self::InvalidPathSegment => "INVALID_PATH_SEGMENT",
            Self::InvalidName => "INVALID_NAME",
            Self::AccessDenied => "ACCESS_DENIED",
            Self::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A command failure reported as data: a code plus a human-readable message.
#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message}")]
pub struct CommandError {
    pub code: ErrorCode,
    pub message: String,
}

impl CommandError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn missing_argument(what: &str) -> Self {
        Self::new(ErrorCode::MissingArgument, format!("missing argument: {what}"))
    }

    pub fn path_not_found(path: &str) -> Self {
        Self::new(ErrorCode::PathNotFound, format!("no such file or folder: {path}"))
    }

    pub fn entity_not_found(kind: &str, id: &str) -> Self {
        Self::new(ErrorCode::EntityNotFound, format!("{kind} not found: {id}"))
    }

    /// Map a failed protocol response onto the command error set.
    pub fn from_response(response: &Response) -> Self {
        let message = response
            .body
            .clone()
            .unwrap_or_else(|| format!("request failed with status {}", response.status));
        let code = match response.status {
            status::BAD_REQUEST => ErrorCode::InvalidUrl,
            status::FORBIDDEN => ErrorCode::AccessDenied,
            status::NOT_FOUND => ErrorCode::PathNotFound,
            status::METHOD_NOT_ALLOWED => ErrorCode::MethodNotAllowed,
            status::CONFLICT if message == reason::CONTAINER_NOT_EMPTY => ErrorCode::ContainerNotEmpty,
            status::CONFLICT => ErrorCode::ParentNotFound,
            _ => ErrorCode::Internal,
        };
        Self::new(code, message)
    }
}

impl From<PathError> for CommandError {
    fn from(e: PathError) -> Self {
        let code = match e {
            PathError::InvalidUrl { .. } => ErrorCode::InvalidUrl,
            PathError::OutsidePod { .. } => ErrorCode::AccessDenied,
            PathError::InvalidEncoding { .. } => ErrorCode::InvalidEncoding,
            PathError::InvalidSegment { .. } => ErrorCode::InvalidPathSegment,
            PathError::InvalidName { .. } => ErrorCode::InvalidName,
        };
        Self::new(code, e.to_string())
    }
}

impl From<ProtocolError> for CommandError {
    fn from(e: ProtocolError) -> Self {
        match e {
            ProtocolError::Path(p) => p.into(),
            other => {
                tracing::error!(error = %other, "backend failure during command");
                Self::new(ErrorCode::Internal, other.to_string())
            }
        }
    }
}

impl From<pod_store::StoreError> for CommandError {
    fn from(e: pod_store::StoreError) -> Self {
        ProtocolError::from(e).into()
    }
}

impl From<pod_types::TypeError> for CommandError {
    fn from(e: pod_types::TypeError) -> Self {
        ProtocolError::from(e).into()
    }
}
