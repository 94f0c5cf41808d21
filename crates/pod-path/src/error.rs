use thiserror::Error;

/// Rejections raised while resolving or normalizing a path.
///
/// The `Display` text is the message returned to clients; [`status`] and
/// [`code`] give the HTTP-like status and stable machine code.
///
/// [`status`]: PathError::status
/// [`code`]: PathError::code
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("Invalid URL")]
    InvalidUrl { input: String },

    #[error("Access denied: path outside pod")]
    OutsidePod { url: String },

    #[error("Invalid URL encoding")]
    InvalidEncoding { segment: String },

    #[error("Invalid path segment")]
    InvalidSegment { segment: String },

    #[error("{reason}")]
    InvalidName { name: String, reason: String },
}

impl PathError {
    pub fn status(&self) -> u16 {
        match self {
            Self::OutsidePod { .. } => 403,
            _ => 400,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidUrl { .. } => "INVALID_URL",
            Self::OutsidePod { .. } => "ACCESS_DENIED",
            Self::InvalidEncoding { .. } => "INVALID_ENCODING",
            Self::InvalidSegment { .. } => "INVALID_PATH_SEGMENT",
            Self::InvalidName { .. } => "INVALID_NAME",
        }
    }
}

pub type PathResult<T> = Result<T, PathError>;
