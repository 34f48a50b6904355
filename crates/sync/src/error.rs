//! Error taxonomy for index, copy and sync operations.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised by the extension index and sync machinery.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SyncError {
    /// The editor id is not in the profile registry.
    #[error("unknown editor: {editor}")]
    NotFound {
        /// The requested editor id.
        editor: String,
    },

    /// The editor exists but its extensions root is missing.
    #[error("editor {editor} is not available: {reason}")]
    Unavailable {
        /// The editor id.
        editor: String,
        /// Human-readable reason from the status check.
        reason: String,
    },

    /// Neither the primary nor the fallback index file exists.
    #[error("no extensions index file found in {}", root.display())]
    IndexNotFound {
        /// The extensions root that was searched.
        root: PathBuf,
    },

    /// The index file exists but is not a valid JSON array of entries.
    #[error("failed to parse extensions index {}: {source}", path.display())]
    IndexCorrupt {
        /// The index file that failed to parse.
        path: PathBuf,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// A payload directory handed to the copier does not exist.
    #[error("source directory not found: {}", path.display())]
    SourceNotFound {
        /// The missing payload directory.
        path: PathBuf,
    },

    /// A relative location is empty, absolute, or escapes its root.
    #[error("invalid relative location '{location}' for {id}")]
    InvalidLocation {
        /// Identifier of the offending entry.
        id: String,
        /// The rejected relative location.
        location: String,
    },

    /// A payload contains a symlink or special file.
    #[error("unsupported entry in payload (not a file or directory): {}", path.display())]
    UnsupportedEntry {
        /// Path of the offending entry.
        path: PathBuf,
    },

    /// Any filesystem failure during copy, removal or index write.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path the operation was acting on.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl SyncError {
    /// Wraps an I/O error with the path it concerns.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

/// Result alias for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_subject() {
        let err = SyncError::NotFound {
            editor: "zed".into(),
        };
        assert_eq!(err.to_string(), "unknown editor: zed");

        let err = SyncError::InvalidLocation {
            id: "a.b".into(),
            location: "../x".into(),
        };
        assert!(err.to_string().contains("'../x'"));
        assert!(err.to_string().contains("a.b"));
    }

    #[test]
    fn io_helper_keeps_source() {
        let err = SyncError::io(
            "/tmp/x",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("/tmp/x"));
    }
}
