// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! # transferscan
//!
//! Resumable, rate-aware scanning of ERC-20 `Transfer` logs into per-day
//! token activity metrics.
//!
//! A scan session maps a UTC date range onto a block range, walks it in
//! adaptively sized `eth_getLogs` chunks, and folds every decoded transfer
//! into per-day aggregates: transaction count, active addresses, volume,
//! unique senders and unique receivers. Each chunk is committed to a
//! [`MetricsSink`] before the [`ProgressCheckpoint`] moves past it, so an
//! interrupted session resumes without losing or double-counting blocks.
//!
//! ## Layout
//!
//! - [`chain`]: the [`ChainClient`] seam and its alloy implementation
//! - [`provider`] and [`transport`]: HTTP provider construction and rate limiting
//! - [`blocks`]: timestamp-to-block search and block ranges
//! - [`events`]: `Transfer` decoding
//! - [`aggregate`]: per-day aggregates and their merge
//! - [`storage`]: sessions, checkpoints and metrics sinks
//! - [`scan`]: the chunked scanner and the session pipeline
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use futures::StreamExt;
//! use transferscan::*;
//! use transferscan::provider::{create_http_provider, ProviderConfig};
//!
//! let provider = create_http_provider(&ProviderConfig::new(rpc_url).with_rate_limit(5))?;
//! let client = Arc::new(AlloyChainClient::new(provider));
//! let pipeline = ScanPipeline::new(
//!     client,
//!     Arc::new(DiskCheckpoint::new("./data")),
//!     Arc::new(DiskMetricsSink::new("./data")),
//!     ScanConfig::default(),
//!     alloy_chains::NamedChain::Fantom,
//! );
//!
//! let request = ScanRequest::transfers(token, start, end, SessionId::new("wigo_180d")?);
//! let mut reports = std::pin::pin!(pipeline.run_scan(request, StopSignal::never()).await?);
//! while let Some(report) = reports.next().await {
//!     let report = report?;
//!     println!("{} -> {}", report.chunk, report.progress.coverage());
//! }
//! ```

pub mod aggregate;
pub mod blocks;
pub mod bootstrap;
pub mod chain;
pub mod config;
pub mod errors;
pub mod events;
pub mod provider;
pub mod scan;
pub mod storage;
pub mod transport;
pub mod types;

mod tracing;

pub use aggregate::{merge_daily, DailyAggregate, DailyAggregator, DailySummary, Mergeable};
pub use blocks::{BlockRange, BlockTimestampLocator};
pub use chain::{AlloyChainClient, ChainClient, RawLog};
pub use config::{ChainConfig, ScanConfig, ScanConfigBuilder};
pub use errors::{
    ConfigError, DecodeError, LocateError, NodeError, NodeErrorKind, ScanError, StorageError,
    TransferScanError,
};
pub use events::{EventDecoder, Transfer, TransferEvent};
pub use scan::{
    BackoffPolicy, ChunkReport, ChunkedLogScanner, ScanPipeline, ScanRequest, ScanSettings,
    ScanSummary, ScanTarget, StopHandle, StopSignal,
};
pub use storage::{
    DailyMetrics, DiskCheckpoint, DiskMetricsSink, MemoryCheckpoint, MemoryMetricsSink,
    MetricsSink, ProgressCheckpoint, ScanProgress, SessionId,
};
pub use types::amount::{TokenAmount, DEFAULT_TOKEN_DECIMALS};
pub use types::config::ChunkSize;
pub use types::time::UnixTimestamp;
