//! Error types for durable scan state.
//!
//! These cover both the progress checkpoint and the metrics sink. Any
//! storage failure stops the run: scanning on without durable state would
//! make a crash silently lose or double-count data.

use std::path::Path;

/// Errors that can occur reading or writing checkpoints and daily metrics.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Filesystem I/O failed.
    #[error("Storage I/O error at {path}: {details}")]
    Io {
        /// Path of the file or directory involved
        path: String,
        /// Description of the operation
        details: String,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A record could not be serialized or parsed.
    #[error("Serialization error at {path}")]
    Serialization {
        /// Path of the record
        path: String,
        /// The underlying serde error
        #[source]
        source: serde_json::Error,
    },

    /// A record parsed but violates its invariants.
    #[error("Corrupt record for session {session}: {reason}")]
    Corrupt {
        /// Session the record belongs to
        session: String,
        /// Which invariant failed
        reason: String,
    },

    /// A record was written by an incompatible format version.
    #[error("Unsupported storage version {found} at {path} (expected {expected})")]
    VersionMismatch {
        /// Path of the record
        path: String,
        /// Version found in the file
        found: u32,
        /// Version this build writes
        expected: u32,
    },

    /// A progress update tried to move backwards or outside its range.
    #[error("Invalid progress update: {reason}")]
    InvalidProgress {
        /// Description of the rejected update
        reason: String,
    },
}

impl StorageError {
    /// Create an `Io` error for a path.
    pub fn io(path: &Path, details: impl Into<String>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.display().to_string(),
            details: details.into(),
            source,
        }
    }

    /// Create a `Serialization` error for a path.
    pub fn serialization(path: &Path, source: serde_json::Error) -> Self {
        StorageError::Serialization {
            path: path.display().to_string(),
            source,
        }
    }

    /// Create a `Corrupt` error for a session.
    pub fn corrupt(session: impl Into<String>, reason: impl Into<String>) -> Self {
        StorageError::Corrupt {
            session: session.into(),
            reason: reason.into(),
        }
    }

    /// Create an `InvalidProgress` error.
    pub fn invalid_progress(reason: impl Into<String>) -> Self {
        StorageError::InvalidProgress {
            reason: reason.into(),
        }
    }
}
