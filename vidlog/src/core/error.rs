//! vidlog Error Definitions
//!
//! Defines the error type shared by the store, the repositories and the
//! metadata collaborator.

use std::path::PathBuf;

use thiserror::Error;

use super::VideoId;

/// Core error types
#[derive(Error, Debug)]
pub enum CoreError {
    // =========================================================================
    // Lookup Errors
    // =========================================================================
    #[error("Video not found: {0}")]
    NotFound(VideoId),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    // =========================================================================
    // Storage Errors
    // =========================================================================
    #[error("Data directory unavailable: {0}")]
    DataDirUnavailable(String),

    #[error("Failed to parse {}: {source}", path.display())]
    ParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    // =========================================================================
    // Collaborator Errors
    // =========================================================================
    #[error("Metadata lookup failed: {0}")]
    MetadataLookupFailed(String),
}

/// Coarse error classification used by callers that only need to branch on
/// the failure category.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Io,
    Parse,
    Lookup,
}

/// Core result type
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::NotFound(_) => ErrorKind::NotFound,
            CoreError::ValidationError(_) => ErrorKind::Validation,
            CoreError::DataDirUnavailable(_) | CoreError::IoError(_) => ErrorKind::Io,
            CoreError::ParseError { .. } | CoreError::JsonError(_) => ErrorKind::Parse,
            CoreError::MetadataLookupFailed(_) => ErrorKind::Lookup,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        CoreError::ParseError {
            path: path.into(),
            source,
        }
    }
}
