//! Span creation helpers for transferscan operations.
//!
//! Telemetry stays out of the business logic: each instrumented operation
//! has a helper here, and async call sites attach it with
//! [`tracing::Instrument`]:
//!
//! ```rust,ignore
//! let logs = client
//!     .logs_in_range(token, topic, from, to)
//!     .instrument(spans::fetch_logs(from, to))
//!     .await?;
//! ```

use alloy_primitives::Address;
use chrono::NaiveDate;
use tracing::Span;

use crate::storage::SessionId;
use crate::types::config::ChunkSize;

/// Span for a single `eth_getLogs` request.
///
/// Parent: scan_chunk
#[inline]
pub(crate) fn fetch_logs(from_block: u64, to_block: u64) -> Span {
    tracing::debug_span!(
        "transferscan.fetch_logs",
        from_block = from_block,
        to_block = to_block,
    )
}

/// Span for a single `eth_getBlockByNumber` request.
///
/// Parent: locate_block or scan_chunk
#[inline]
pub(crate) fn fetch_block_timestamp(block_number: u64) -> Span {
    tracing::trace_span!(
        "transferscan.fetch_block_timestamp",
        block_number = block_number
    )
}

/// Span for the binary search of one target timestamp.
///
/// Parent: range_for_dates
/// Children: fetch_block_timestamp spans
#[inline]
pub(crate) fn locate_block(target_ts: i64, latest_block: u64) -> Span {
    tracing::debug_span!(
        "transferscan.locate_block",
        target_ts = target_ts,
        latest_block = latest_block,
    )
}

/// Span for converting a date range into a block range.
///
/// Parent: run_scan
#[inline]
pub(crate) fn range_for_dates(start: NaiveDate, end: NaiveDate) -> Span {
    tracing::info_span!(
        "transferscan.range_for_dates",
        start = %start,
        end = %end,
    )
}

/// Span for one attempt at one chunk.
///
/// Parent: run_scan
/// Children: fetch_logs, fetch_block_timestamp spans
#[inline]
pub(crate) fn scan_chunk(
    session: &SessionId,
    from_block: u64,
    to_block: u64,
    chunk_size: ChunkSize,
) -> Span {
    tracing::debug_span!(
        "transferscan.scan_chunk",
        session = %session,
        from_block = from_block,
        to_block = to_block,
        chunk_size = chunk_size.as_u32(),
    )
}

/// Span for preparing a session scan: checkpoint load, bounds and reconcile.
///
/// Parent: None (root span for a scan)
#[inline]
pub(crate) fn run_scan(session: &SessionId, token: Address) -> Span {
    tracing::info_span!(
        "transferscan.run_scan",
        session = %session,
        token = %token,
    )
}
