// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Resumable scan sessions.
//!
//! [`ScanPipeline::run_scan`] ties the pieces together for one session:
//!
//! 1. load the session checkpoint; its bounds win over the requested dates
//! 2. otherwise locate the block range for the dates and save a fresh checkpoint
//! 3. reconcile the checkpoint with the metrics sink watermark
//! 4. hand back a [`ChunkedLogScanner`] stream starting at the resume block
//!
//! Step 3 covers a crash between a metrics commit and the checkpoint save
//! that follows it: the sink already holds those blocks, so the checkpoint is
//! moved up to the watermark instead of scanning them again.

use std::time::Duration;

use alloy_chains::NamedChain;
use alloy_primitives::{Address, B256};
use alloy_sol_types::SolEvent;
use chrono::NaiveDate;
use futures::Stream;
use tracing::{info, warn, Instrument};

use crate::blocks::BlockTimestampLocator;
use crate::chain::ChainClient;
use crate::config::constants::{
    DEFAULT_BACKOFF_BASE, DEFAULT_BACKOFF_MAX, DEFAULT_PACING_DELAY, DEFAULT_TIMESTAMP_RETRIES,
    DEFAULT_TIMESTAMP_RETRY_DELAY,
};
use crate::config::ScanConfig;
use crate::errors::{ScanError, StorageError};
use crate::events::Transfer;
use crate::storage::{MetricsSink, ProgressCheckpoint, ScanProgress, SessionId};
use crate::tracing::spans;
use crate::types::amount::DEFAULT_TOKEN_DECIMALS;
use crate::types::config::ChunkSize;

mod backoff;
mod report;
mod scanner;
mod stop;

pub use backoff::BackoffPolicy;
pub use report::{ChunkReport, ScanSummary};
pub use scanner::{ChunkedLogScanner, ScanTarget};
pub use stop::{StopHandle, StopSignal};

/// Scanner behaviour resolved for one chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSettings {
    /// Halving below this aborts the scan
    pub min_chunk_size: ChunkSize,
    /// Pause between successful chunks
    pub pacing_delay: Duration,
    pub backoff: BackoffPolicy,
    /// Attempts per block timestamp lookup
    pub timestamp_retries: u32,
    pub timestamp_retry_delay: Duration,
    /// Token decimals used to scale amounts
    pub decimals: u8,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            min_chunk_size: ChunkSize::MIN_FLOOR,
            pacing_delay: DEFAULT_PACING_DELAY,
            backoff: BackoffPolicy::new(DEFAULT_BACKOFF_BASE, DEFAULT_BACKOFF_MAX),
            timestamp_retries: DEFAULT_TIMESTAMP_RETRIES,
            timestamp_retry_delay: DEFAULT_TIMESTAMP_RETRY_DELAY,
            decimals: DEFAULT_TOKEN_DECIMALS,
        }
    }
}

/// One session's scan request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    pub token: Address,
    pub topic: B256,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Overrides the configured initial chunk size for a fresh session
    pub initial_chunk_size: Option<ChunkSize>,
    pub session: SessionId,
}

impl ScanRequest {
    /// ERC-20 Transfer scan of `token` over inclusive UTC dates
    pub fn transfers(
        token: Address,
        start_date: NaiveDate,
        end_date: NaiveDate,
        session: SessionId,
    ) -> Self {
        Self {
            token,
            topic: Transfer::SIGNATURE_HASH,
            start_date,
            end_date,
            initial_chunk_size: None,
            session,
        }
    }

    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: ChunkSize) -> Self {
        self.initial_chunk_size = Some(chunk_size);
        self
    }
}

/// Runs resumable scan sessions against one chain
///
/// Components are cloned into every scanner, so pass cheaply clonable
/// handles (`Arc`s or references).
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use futures::StreamExt;
/// use transferscan::*;
///
/// let pipeline = ScanPipeline::new(
///     Arc::new(client),
///     Arc::new(DiskCheckpoint::new("./data")),
///     Arc::new(DiskMetricsSink::new("./data")),
///     ScanConfig::default(),
///     alloy_chains::NamedChain::Fantom,
/// );
/// let request = ScanRequest::transfers(token, start, end, SessionId::new("wigo")?);
/// let mut reports = std::pin::pin!(pipeline.run_scan(request, StopSignal::never()).await?);
/// while let Some(report) = reports.next().await {
///     report?;
/// }
/// ```
pub struct ScanPipeline<C, K, S> {
    client: C,
    checkpoint: K,
    sink: S,
    config: ScanConfig,
    chain: NamedChain,
}

impl<C, K, S> ScanPipeline<C, K, S>
where
    C: ChainClient + Clone,
    K: ProgressCheckpoint + Clone,
    S: MetricsSink + Clone,
{
    pub fn new(client: C, checkpoint: K, sink: S, config: ScanConfig, chain: NamedChain) -> Self {
        Self {
            client,
            checkpoint,
            sink,
            config,
            chain,
        }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Prepares the session and returns its chunk report stream
    ///
    /// # Errors
    ///
    /// - [`ScanError::Locate`] if the date range cannot be mapped to blocks
    /// - [`ScanError::Storage`] if the checkpoint or sink cannot be read or
    ///   disagree in a way that would lose data
    pub async fn run_scan(
        &self,
        request: ScanRequest,
        stop: StopSignal,
    ) -> Result<impl Stream<Item = Result<ChunkReport, ScanError>>, ScanError> {
        Ok(self.prepare(request, stop).await?.into_stream())
    }

    /// Like [`run_scan`](Self::run_scan), returning the scanner itself
    pub async fn prepare(
        &self,
        request: ScanRequest,
        stop: StopSignal,
    ) -> Result<ChunkedLogScanner<C, K, S>, ScanError> {
        let span = spans::run_scan(&request.session, request.token);
        async {
            let progress = self.load_or_create(&request).await?;
            let progress = self.reconcile(&request.session, progress).await?;

            info!(
                resume_block = progress.resume_block(),
                end_block = progress.end_block(),
                chunk_size = progress.chunk_size().as_u32(),
                "Scan prepared"
            );

            let target = ScanTarget {
                session: request.session,
                token: request.token,
                topic: request.topic,
            };
            Ok(ChunkedLogScanner::new(
                self.client.clone(),
                self.checkpoint.clone(),
                self.sink.clone(),
                target,
                progress,
                self.config.settings_for(self.chain),
            )
            .with_stop_signal(stop))
        }
        .instrument(span)
        .await
    }

    async fn load_or_create(&self, request: &ScanRequest) -> Result<ScanProgress, ScanError> {
        if let Some(progress) = self.checkpoint.load(&request.session).await? {
            info!(
                start_block = progress.start_block(),
                end_block = progress.end_block(),
                last_processed_block = ?progress.last_processed_block(),
                "Resuming session from checkpoint"
            );
            return Ok(progress);
        }

        let range = BlockTimestampLocator::new(&self.client)
            .range_for_dates(request.start_date, request.end_date)
            .await?;
        let chunk_size = request
            .initial_chunk_size
            .unwrap_or_else(|| self.config.get_initial_chunk_size(self.chain));

        let progress = ScanProgress::new(range, chunk_size);
        self.checkpoint.save(&request.session, &progress).await?;
        info!(
            start_date = %request.start_date,
            end_date = %request.end_date,
            blocks = %range,
            "Started new session"
        );
        Ok(progress)
    }

    /// Moves the checkpoint up to the sink watermark when the sink is ahead
    async fn reconcile(
        &self,
        session: &SessionId,
        mut progress: ScanProgress,
    ) -> Result<ScanProgress, ScanError> {
        let watermark = self.sink.watermark(session).await?;

        match (watermark, progress.last_processed_block()) {
            (None, None) => Ok(progress),
            (Some(mark), last) if last.is_none_or(|last| mark > last) => {
                if mark < progress.start_block() || mark > progress.end_block() {
                    return Err(StorageError::corrupt(
                        session.as_str(),
                        format!(
                            "metrics watermark {mark} is outside {}..={}",
                            progress.start_block(),
                            progress.end_block()
                        ),
                    )
                    .into());
                }
                warn!(
                    watermark = mark,
                    last_processed_block = ?last,
                    "Metrics are ahead of the checkpoint, advancing checkpoint"
                );
                let chunk_size = progress.chunk_size();
                progress.advance(mark, chunk_size)?;
                self.checkpoint.save(session, &progress).await?;
                Ok(progress)
            }
            (Some(mark), Some(last)) if mark == last => Ok(progress),
            (mark, last) => Err(StorageError::corrupt(
                session.as_str(),
                format!(
                    "checkpoint claims blocks through {last:?} but metrics only hold through {mark:?}"
                ),
            )
            .into()),
        }
    }
}
