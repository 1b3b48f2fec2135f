// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Test helpers for transferscan integration tests
//!
//! Provides an in-memory chain and storage wrappers so scans can be driven
//! end to end without a node.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::SolEvent;
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use transferscan::{
    ChainClient, ChunkReport, MemoryCheckpoint, NodeError, NodeErrorKind, ProgressCheckpoint,
    RawLog, ScanError, ScanProgress, SessionId, StorageError, Transfer, UnixTimestamp,
};

/// Contract every synthetic log is attributed to
pub fn token() -> Address {
    Address::repeat_byte(0x77)
}

pub fn addr(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

/// `tokens` whole tokens in 18-decimal base units
pub fn units(tokens: u64) -> U256 {
    U256::from(tokens) * U256::from(10u64).pow(U256::from(18u64))
}

/// A well-formed `Transfer` log at `block`
pub fn transfer_log(block: u64, from: Address, to: Address, value: U256) -> RawLog {
    RawLog::new(
        block,
        vec![Transfer::SIGNATURE_HASH, from.into_word(), to.into_word()],
        Bytes::from(value.to_be_bytes::<32>().to_vec()),
    )
}

pub fn session(id: &str) -> SessionId {
    SessionId::new(id).unwrap()
}

#[derive(Debug)]
struct ChainState {
    max_span: Option<u64>,
    failure_kind: NodeErrorKind,
    timestamp_failures: HashMap<u64, u32>,
    log_requests: Vec<(u64, u64)>,
    timestamp_requests: Vec<u64>,
}

/// In-memory chain with blocks `1..=timestamps.len()`
///
/// `timestamps[i]` is the timestamp of block `i + 1`. Log requests spanning
/// more than `max_span` blocks fail with the configured kind, the way public
/// endpoints reject wide `eth_getLogs` ranges.
///
/// # Example
///
/// ```rust,ignore
/// let chain = SyntheticChain::new(vec![100, 200, 300])
///     .with_logs(vec![transfer_log(2, addr(1), addr(2), units(1))])
///     .with_max_span(2);
/// ```
#[derive(Debug)]
pub struct SyntheticChain {
    timestamps: Vec<i64>,
    logs: Vec<RawLog>,
    state: Mutex<ChainState>,
}

impl SyntheticChain {
    pub fn new(timestamps: Vec<i64>) -> Self {
        Self {
            timestamps,
            logs: Vec::new(),
            state: Mutex::new(ChainState {
                max_span: None,
                failure_kind: NodeErrorKind::Rejected,
                timestamp_failures: HashMap::new(),
                log_requests: Vec::new(),
                timestamp_requests: Vec::new(),
            }),
        }
    }

    /// `blocks` blocks spaced `spacing` seconds apart, block 1 at `spacing`
    pub fn evenly_spaced(blocks: u64, spacing: i64) -> Self {
        Self::new((1..=blocks as i64).map(|n| n * spacing).collect())
    }

    pub fn with_logs(mut self, logs: Vec<RawLog>) -> Self {
        self.logs = logs;
        self
    }

    pub fn with_max_span(self, blocks: u64) -> Self {
        self.set_max_span(Some(blocks));
        self
    }

    pub fn with_failure_kind(self, kind: NodeErrorKind) -> Self {
        self.state.lock().unwrap().failure_kind = kind;
        self
    }

    /// The next `times` timestamp lookups of `block` fail
    pub fn with_timestamp_failures(self, block: u64, times: u32) -> Self {
        self.state
            .lock()
            .unwrap()
            .timestamp_failures
            .insert(block, times);
        self
    }

    pub fn set_max_span(&self, max_span: Option<u64>) {
        self.state.lock().unwrap().max_span = max_span;
    }

    pub fn height(&self) -> u64 {
        self.timestamps.len() as u64
    }

    /// Every `(from, to)` passed to `logs_in_range`, failed ones included
    pub fn log_requests(&self) -> Vec<(u64, u64)> {
        self.state.lock().unwrap().log_requests.clone()
    }

    pub fn timestamp_requests(&self) -> Vec<u64> {
        self.state.lock().unwrap().timestamp_requests.clone()
    }

    pub fn clear_requests(&self) {
        let mut state = self.state.lock().unwrap();
        state.log_requests.clear();
        state.timestamp_requests.clear();
    }
}

#[async_trait]
impl ChainClient for SyntheticChain {
    async fn current_block_height(&self) -> Result<u64, NodeError> {
        Ok(self.height())
    }

    async fn block_timestamp(&self, number: u64) -> Result<UnixTimestamp, NodeError> {
        let mut state = self.state.lock().unwrap();
        state.timestamp_requests.push(number);

        if let Some(remaining) = state.timestamp_failures.get_mut(&number) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(NodeError::without_source(
                    NodeErrorKind::Connection,
                    format!("eth_getBlockByNumber({number})"),
                ));
            }
        }

        number
            .checked_sub(1)
            .and_then(|index| self.timestamps.get(index as usize))
            .map(|ts| UnixTimestamp(*ts))
            .ok_or_else(|| NodeError::missing_block(number))
    }

    async fn logs_in_range(
        &self,
        _address: Address,
        topic: B256,
        from: u64,
        to: u64,
    ) -> Result<Vec<RawLog>, NodeError> {
        let mut state = self.state.lock().unwrap();
        state.log_requests.push((from, to));

        if let Some(max_span) = state.max_span {
            if to - from + 1 > max_span {
                return Err(NodeError::without_source(
                    state.failure_kind,
                    format!("eth_getLogs({from}..={to})"),
                ));
            }
        }

        Ok(self
            .logs
            .iter()
            .filter(|log| log.block_number.is_some_and(|b| (from..=to).contains(&b)))
            .filter(|log| log.topics.first() == Some(&topic))
            .cloned()
            .collect())
    }
}

/// Checkpoint that fails every save after the first `allowed_saves`
///
/// Simulates a crash between a metrics commit and the checkpoint save that
/// follows it.
#[derive(Debug)]
pub struct CrashingCheckpoint {
    pub inner: Arc<MemoryCheckpoint>,
    allowed_saves: AtomicUsize,
}

impl CrashingCheckpoint {
    pub fn new(inner: Arc<MemoryCheckpoint>, allowed_saves: usize) -> Self {
        Self {
            inner,
            allowed_saves: AtomicUsize::new(allowed_saves),
        }
    }
}

#[async_trait]
impl ProgressCheckpoint for CrashingCheckpoint {
    async fn save(&self, session: &SessionId, progress: &ScanProgress) -> Result<(), StorageError> {
        let allowed = self
            .allowed_saves
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if !allowed {
            return Err(StorageError::invalid_progress("simulated crash before checkpoint save"));
        }
        self.inner.save(session, progress).await
    }

    async fn load(&self, session: &SessionId) -> Result<Option<ScanProgress>, StorageError> {
        self.inner.load(session).await
    }
}

/// Consumes a report stream, stopping at the first error
pub async fn drain<S>(stream: S) -> (Vec<ChunkReport>, Option<ScanError>)
where
    S: Stream<Item = Result<ChunkReport, ScanError>>,
{
    let mut stream = std::pin::pin!(stream);
    let mut reports = Vec::new();
    while let Some(item) = stream.next().await {
        match item {
            Ok(report) => reports.push(report),
            Err(e) => return (reports, Some(e)),
        }
    }
    (reports, None)
}
