//! Error types for Godrop.
//!
//! This module provides a unified error type for all Godrop operations,
//! with specific error variants for different failure modes.

use std::io;

use thiserror::Error;

/// A specialized `Result` type for Godrop operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Godrop.
#[derive(Error, Debug)]
pub enum Error {
    /// Directory could not be listed because it does not exist
    #[error("directory not found: {0}")]
    DirectoryNotFound(String),

    /// Cannot read a directory or file: permission denied
    #[error("cannot read '{0}': permission denied")]
    PermissionDenied(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The transfer service rejected a start request (bad port, bind failure, ...)
    #[error("{0}")]
    Startup(String),

    /// A session is already starting or running
    #[error("a session is already active")]
    SessionActive,

    /// No session is running
    #[error("no session is active")]
    NoSessionActive,

    /// A send session needs at least one selected file
    #[error("no files selected")]
    SelectionEmpty,

    /// The requested connectivity option is announced but not available
    #[error("connectivity '{0}' is not available")]
    TransportUnavailable(String),

    /// The security code was rejected by the viewer endpoint
    #[error("security code rejected")]
    VerificationFailed,

    /// The viewer status endpoint is unreachable
    #[error("system offline: {0}")]
    TransportOffline(String),

    /// The viewer endpoint refused the download (limit reached or link expired)
    #[error("download refused: {0}")]
    DownloadRefused(String),

    /// Clipboard access failed
    #[error("clipboard error: {0}")]
    ClipboardError(String),

    /// Configuration file error
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Invalid configuration value
    #[error("invalid configuration value for '{key}': {reason}")]
    InvalidConfig {
        /// Configuration key
        key: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen)
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map an I/O error on `path` to the most specific variant.
    #[must_use]
    pub fn from_io(err: io::Error, path: &str) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::DirectoryNotFound(path.to_string()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_string()),
            _ => Self::Io(err),
        }
    }

    /// Returns whether this error came from directory or file access.
    #[must_use]
    pub const fn is_io(&self) -> bool {
        matches!(
            self,
            Self::Io(_) | Self::DirectoryNotFound(_) | Self::PermissionDenied(_)
        )
    }

    /// Returns whether this error is recoverable by a later user action or poll.
    ///
    /// Nothing is retried automatically; this only tells the presentation
    /// layer whether offering "try again" makes sense.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Startup(_)
                | Self::TransportOffline(_)
                | Self::VerificationFailed
                | Self::ClipboardError(_)
        )
    }

    /// Returns a helpful suggestion for resolving the error, if applicable.
    #[must_use]
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::SelectionEmpty => Some("Select at least one file before starting a send session."),
            Self::TransportUnavailable(_) => Some("Only local network sharing is available."),
            Self::TransportOffline(_) => {
                Some("Check that the sharing device is still on the same network.")
            }
            Self::Startup(_) => Some("Try another port or stop the process already using it."),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_io_maps_not_found() {
        let err = Error::from_io(io::Error::from(io::ErrorKind::NotFound), "/missing");
        assert!(matches!(err, Error::DirectoryNotFound(ref p) if p == "/missing"));
        assert!(err.is_io());
    }

    #[test]
    fn test_from_io_maps_permission_denied() {
        let err = Error::from_io(io::Error::from(io::ErrorKind::PermissionDenied), "/root");
        assert!(matches!(err, Error::PermissionDenied(_)));
        assert!(err.is_io());
    }

    #[test]
    fn test_startup_displays_detail_only() {
        let err = Error::Startup("port 1111 in use".to_string());
        assert_eq!(err.to_string(), "port 1111 in use");
        assert!(err.is_recoverable());
        assert!(!err.is_io());
    }

    #[test]
    fn test_suggestions() {
        assert!(Error::SelectionEmpty.suggestion().is_some());
        assert!(Error::Internal("x".into()).suggestion().is_none());
    }
}
