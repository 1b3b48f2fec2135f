// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for a scan run.

use super::{LocateError, NodeError, StorageError};
use crate::storage::ScanProgress;

/// Terminal failures of a scan.
///
/// Transient node failures never surface here directly; they are absorbed
/// by chunk-size backoff until the minimum chunk size would be breached, at
/// which point the scan ends with [`ScanError::Aborted`]. The checkpoint
/// carried in that variant is the last one durably saved, so re-running the
/// same session continues from it.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// Backoff reached the minimum chunk size and the node still failed.
    #[error(
        "Scan aborted: {}. Re-run the same session to resume from block {}",
        .progress.coverage(),
        .progress.resume_block()
    )]
    Aborted {
        /// Last durably saved progress
        progress: ScanProgress,
        /// The node failure that exhausted the backoff
        #[source]
        source: NodeError,
    },

    /// The scan bounds could not be located.
    #[error("Failed to determine scan bounds: {0}")]
    Locate(#[from] LocateError),

    /// The checkpoint or metrics store failed.
    #[error("Durable storage failed: {0}")]
    Storage(#[from] StorageError),

    /// The request itself is unusable.
    #[error("Invalid input: {details}")]
    InvalidInput {
        /// Details about what was invalid
        details: String,
    },
}

impl ScanError {
    /// Create an `InvalidInput` error with details.
    pub fn invalid_input(details: impl Into<String>) -> Self {
        ScanError::InvalidInput {
            details: details.into(),
        }
    }

    /// Progress to resume from, when the scan ended in a resumable state
    pub fn resumable_progress(&self) -> Option<&ScanProgress> {
        match self {
            ScanError::Aborted { progress, .. } => Some(progress),
            _ => None,
        }
    }
}
