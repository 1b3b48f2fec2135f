// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Adaptive chunked log scanner
//!
//! Walks a block range one chunk at a time. Each chunk is fetched, decoded
//! and aggregated in isolation, then committed as a unit: metrics first,
//! checkpoint second. A failed chunk is retried with half the size after a
//! backoff pause until the size would drop below the configured floor.
//!
//! # Examples
//!
//! ```rust,ignore
//! use futures::StreamExt;
//! use transferscan::{ChunkedLogScanner, ScanTarget};
//!
//! let scanner = ChunkedLogScanner::new(client, checkpoint, sink, target, progress, settings);
//! let mut reports = std::pin::pin!(scanner.into_stream());
//! while let Some(report) = reports.next().await {
//!     let report = report?;
//!     println!("{}: {} transfers", report.chunk, report.decoded_transfers);
//! }
//! ```

use std::collections::HashMap;

use alloy_primitives::{Address, B256};
use futures::Stream;
use tracing::{debug, info, warn, Instrument};

use super::report::ChunkReport;
use super::stop::StopSignal;
use super::ScanSettings;
use crate::aggregate::DailyAggregator;
use crate::blocks::BlockRange;
use crate::chain::{ChainClient, RawLog};
use crate::errors::{DecodeError, NodeError, ScanError};
use crate::events::{EventDecoder, TransferEvent};
use crate::storage::{MetricsSink, ProgressCheckpoint, ScanProgress, SessionId};
use crate::tracing::spans;
use crate::types::config::ChunkSize;
use crate::types::time::UnixTimestamp;

/// What to scan: one event topic of one contract, stored under one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanTarget {
    pub session: SessionId,
    pub token: Address,
    pub topic: B256,
}

/// Result of fetching and aggregating one chunk, before it is committed
struct ChunkOutcome {
    fetched: usize,
    decoded: usize,
    skipped: usize,
    aggregator: DailyAggregator,
}

/// Walks a block range in adaptively sized chunks
///
/// The scanner owns its progress. It never keeps per-day state across
/// chunks: each chunk's aggregates go to the sink, and reports read the
/// cumulative view back from it.
pub struct ChunkedLogScanner<C, K, S> {
    client: C,
    checkpoint: K,
    sink: S,
    target: ScanTarget,
    progress: ScanProgress,
    chunk_size: ChunkSize,
    settings: ScanSettings,
    decoder: EventDecoder,
    stop: StopSignal,
    block_timestamps: HashMap<u64, UnixTimestamp>,
    committed_chunks: usize,
    skipped_logs: usize,
}

impl<C, K, S> ChunkedLogScanner<C, K, S>
where
    C: ChainClient,
    K: ProgressCheckpoint,
    S: MetricsSink,
{
    /// Creates a scanner that resumes from `progress`
    ///
    /// The starting chunk size is the one recorded in `progress`.
    pub fn new(
        client: C,
        checkpoint: K,
        sink: S,
        target: ScanTarget,
        progress: ScanProgress,
        settings: ScanSettings,
    ) -> Self {
        let chunk_size = progress.chunk_size();
        let decoder = EventDecoder::with_decimals(settings.decimals);
        Self {
            client,
            checkpoint,
            sink,
            target,
            progress,
            chunk_size,
            settings,
            decoder,
            stop: StopSignal::never(),
            block_timestamps: HashMap::new(),
            committed_chunks: 0,
            skipped_logs: 0,
        }
    }

    #[must_use]
    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    pub fn progress(&self) -> &ScanProgress {
        &self.progress
    }

    pub fn chunk_size(&self) -> ChunkSize {
        self.chunk_size
    }

    /// Scans and commits the next chunk
    ///
    /// Returns `Ok(None)` when the range is exhausted or a stop was
    /// requested. Node failures are retried with smaller chunks; once the
    /// chunk size would fall below the floor the scan ends with
    /// [`ScanError::Aborted`] carrying the last committed progress.
    pub async fn next_chunk(&mut self) -> Result<Option<ChunkReport>, ScanError> {
        if self.stop.is_stopped() {
            info!(session = %self.target.session, "Stop requested, ending scan");
            return Ok(None);
        }
        let Some(remaining) = self.progress.remaining() else {
            return Ok(None);
        };

        let pacing = self.settings.pacing_delay;
        if self.committed_chunks > 0 && !pacing.is_zero() && self.stop.sleep_or_stop(pacing).await {
            info!(session = %self.target.session, "Stop requested, ending scan");
            return Ok(None);
        }

        let start = remaining.start();
        let mut attempt = 0u32;

        loop {
            let end = self.chunk_size.chunk_end(start, remaining.end());
            let span = spans::scan_chunk(&self.target.session, start, end, self.chunk_size);

            match self.scan_chunk(start, end).instrument(span).await {
                Ok(outcome) => {
                    return self
                        .commit(start, end, attempt, outcome)
                        .await
                        .map(Some);
                }
                Err(error) => {
                    let smaller = self.chunk_size.halve();
                    if smaller < self.settings.min_chunk_size {
                        warn!(
                            session = %self.target.session,
                            from_block = start,
                            to_block = end,
                            chunk_size = self.chunk_size.as_u32(),
                            error = %error,
                            "Chunk size at floor, aborting scan"
                        );
                        return Err(ScanError::Aborted {
                            progress: self.progress.clone(),
                            source: error,
                        });
                    }

                    let delay = self
                        .settings
                        .backoff
                        .delay_for(attempt, error.is_rate_limit());
                    warn!(
                        session = %self.target.session,
                        from_block = start,
                        to_block = end,
                        kind = %error.kind(),
                        error = %error,
                        new_chunk_size = smaller.as_u32(),
                        delay_ms = delay.as_millis() as u64,
                        "Chunk failed, backing off"
                    );
                    self.chunk_size = smaller;
                    attempt += 1;

                    if self.stop.sleep_or_stop(delay).await {
                        info!(session = %self.target.session, "Stop requested during backoff");
                        return Ok(None);
                    }
                }
            }
        }
    }

    /// Turns the scanner into a stream of chunk reports
    ///
    /// The stream ends after the last chunk, on stop, or after yielding the
    /// first error.
    pub fn into_stream(self) -> impl Stream<Item = Result<ChunkReport, ScanError>> {
        futures::stream::try_unfold(self, |mut scanner| async move {
            let report = scanner.next_chunk().await?;
            Ok(report.map(|report| (report, scanner)))
        })
    }

    async fn scan_chunk(&mut self, start: u64, end: u64) -> Result<ChunkOutcome, NodeError> {
        let logs = self
            .client
            .logs_in_range(self.target.token, self.target.topic, start, end)
            .await?;

        let mut outcome = ChunkOutcome {
            fetched: logs.len(),
            decoded: 0,
            skipped: 0,
            aggregator: DailyAggregator::new(),
        };

        for log in &logs {
            let (block, transfer) = match self.decode_in_chunk(log, start, end) {
                Ok(decoded) => decoded,
                Err(e) => {
                    warn!(block = ?log.block_number, error = %e, "Skipping undecodable log");
                    outcome.skipped += 1;
                    continue;
                }
            };

            let timestamp = match log.block_timestamp {
                Some(ts) => ts,
                None => self.block_timestamp(block).await?,
            };
            let Some(date) = timestamp.utc_date() else {
                warn!(block, timestamp = %timestamp, "Block timestamp has no calendar date, skipping log");
                outcome.skipped += 1;
                continue;
            };

            outcome.aggregator.observe(date, &transfer);
            outcome.decoded += 1;
        }

        Ok(outcome)
    }

    fn decode_in_chunk(
        &self,
        log: &RawLog,
        start: u64,
        end: u64,
    ) -> Result<(u64, TransferEvent), DecodeError> {
        let block = log.block_number.ok_or(DecodeError::MissingBlockNumber)?;
        if block < start || block > end {
            // Such a log belongs to another chunk
            return Err(DecodeError::OutsideRange {
                block,
                from_block: start,
                to_block: end,
            });
        }
        Ok((block, self.decoder.decode(log)?))
    }

    /// Block timestamp with fixed-delay retries, memoized until the chunk commits
    async fn block_timestamp(&mut self, block: u64) -> Result<UnixTimestamp, NodeError> {
        if let Some(ts) = self.block_timestamps.get(&block) {
            return Ok(*ts);
        }

        let attempts = self.settings.timestamp_retries.max(1);
        let mut attempt = 1;
        loop {
            match self.client.block_timestamp(block).await {
                Ok(ts) => {
                    self.block_timestamps.insert(block, ts);
                    return Ok(ts);
                }
                Err(e) if attempt < attempts => {
                    debug!(block, attempt, error = %e, "Block timestamp lookup failed, retrying");
                    attempt += 1;
                    tokio::time::sleep(self.settings.timestamp_retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn commit(
        &mut self,
        start: u64,
        end: u64,
        retries: u32,
        mut outcome: ChunkOutcome,
    ) -> Result<ChunkReport, ScanError> {
        let session = &self.target.session;

        // Nothing reaches the sink unless the progress update is valid
        let mut progress = self.progress.clone();
        progress.advance(end, self.chunk_size)?;

        self.sink
            .commit(session, end, outcome.aggregator.drain_completed())
            .await?;
        self.checkpoint.save(session, &progress).await?;
        self.progress = progress;

        self.block_timestamps.clear();
        self.committed_chunks += 1;
        self.skipped_logs += outcome.skipped;

        let daily = self.sink.snapshot(session).await?;
        let chunk = BlockRange::new(start, end)
            .ok_or_else(|| ScanError::invalid_input(format!("empty chunk {start}..={end}")))?;

        info!(
            session = %session,
            from_block = start,
            to_block = end,
            logs = outcome.fetched,
            transfers = outcome.decoded,
            skipped = outcome.skipped,
            chunk_size = self.chunk_size.as_u32(),
            remaining_blocks = self.progress.remaining().map_or(0, |r| r.len()),
            "Committed chunk"
        );

        Ok(ChunkReport {
            chunk,
            fetched_logs: outcome.fetched,
            decoded_transfers: outcome.decoded,
            skipped_logs: outcome.skipped,
            total_skipped_logs: self.skipped_logs,
            retries,
            chunk_size: self.chunk_size,
            progress: self.progress.clone(),
            daily,
        })
    }
}
