//! Error types for mapping timestamps and dates to blocks.
//!
//! A locate failure is fatal for the scan invocation that needed it (no
//! bounds, no scan) but never for the process; callers may simply retry.

use chrono::NaiveDate;

use super::NodeError;

/// Errors that can occur while locating blocks by timestamp.
///
/// # Examples
///
/// ```rust,ignore
/// use transferscan::{BlockTimestampLocator, LocateError};
///
/// match locator.range_for_dates(start, end).await {
///     Ok(range) => println!("Blocks {}..={}", range.start(), range.end()),
///     Err(LocateError::LocateFailed { source, .. }) => eprintln!("node failed: {source}"),
///     Err(e) => eprintln!("cannot scan: {e}"),
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum LocateError {
    /// A block fetch during the binary search failed.
    #[error("Failed to locate block for timestamp {target}")]
    LocateFailed {
        /// Target unix timestamp of the search
        target: i64,
        /// The node failure that aborted the search
        #[source]
        source: NodeError,
    },

    /// The chain reports no blocks to search.
    #[error("Chain has no blocks to search")]
    EmptyChain,

    /// The requested date range is inverted or not representable.
    #[error("Invalid date range {start}..={end}: {reason}")]
    InvalidDateRange {
        /// First requested date
        start: NaiveDate,
        /// Last requested date
        end: NaiveDate,
        /// Why the range was rejected
        reason: String,
    },
}

impl LocateError {
    /// Create a `LocateFailed` error for a target timestamp.
    pub fn locate_failed(target: i64, source: NodeError) -> Self {
        LocateError::LocateFailed { target, source }
    }

    /// Create an `InvalidDateRange` error with a reason.
    pub fn invalid_date_range(start: NaiveDate, end: NaiveDate, reason: impl Into<String>) -> Self {
        LocateError::InvalidDateRange {
            start,
            end,
            reason: reason.into(),
        }
    }
}
