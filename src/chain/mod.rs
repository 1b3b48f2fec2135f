//! Remote node access
//!
//! Everything the scanner needs from a node fits in three calls. Keeping them
//! behind [`ChainClient`] lets tests drive the scanner with a synthetic chain
//! and lets the binary plug in the alloy HTTP provider.

use std::sync::Arc;

use alloy_primitives::{Address, Bytes, B256};
use async_trait::async_trait;

use crate::errors::NodeError;
use crate::types::time::UnixTimestamp;

mod alloy;

pub use self::alloy::AlloyChainClient;

/// A log record as returned by `eth_getLogs`, before decoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLog {
    /// Block that emitted the log; absent for pending logs
    pub block_number: Option<u64>,
    /// Some nodes attach the block timestamp to each log
    pub block_timestamp: Option<UnixTimestamp>,
    pub topics: Vec<B256>,
    pub data: Bytes,
}

impl RawLog {
    pub fn new(block_number: u64, topics: Vec<B256>, data: Bytes) -> Self {
        Self {
            block_number: Some(block_number),
            block_timestamp: None,
            topics,
            data,
        }
    }

    #[must_use]
    pub fn with_block_timestamp(mut self, timestamp: UnixTimestamp) -> Self {
        self.block_timestamp = Some(timestamp);
        self
    }
}

/// Read access to a chain.
///
/// Implementations report every failure as a [`NodeError`] whose kind tells
/// the caller whether it was throttled. Retrying is the caller's job.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Latest block number known to the node
    async fn current_block_height(&self) -> Result<u64, NodeError>;

    /// Timestamp of block `number`
    async fn block_timestamp(&self, number: u64) -> Result<UnixTimestamp, NodeError>;

    /// Logs emitted by `address` with topic 0 equal to `topic`, in `from..=to`
    async fn logs_in_range(
        &self,
        address: Address,
        topic: B256,
        from: u64,
        to: u64,
    ) -> Result<Vec<RawLog>, NodeError>;
}

#[async_trait]
impl<T: ChainClient + ?Sized> ChainClient for &T {
    async fn current_block_height(&self) -> Result<u64, NodeError> {
        (**self).current_block_height().await
    }

    async fn block_timestamp(&self, number: u64) -> Result<UnixTimestamp, NodeError> {
        (**self).block_timestamp(number).await
    }

    async fn logs_in_range(
        &self,
        address: Address,
        topic: B256,
        from: u64,
        to: u64,
    ) -> Result<Vec<RawLog>, NodeError> {
        (**self).logs_in_range(address, topic, from, to).await
    }
}

#[async_trait]
impl<T: ChainClient + ?Sized> ChainClient for Arc<T> {
    async fn current_block_height(&self) -> Result<u64, NodeError> {
        (**self).current_block_height().await
    }

    async fn block_timestamp(&self, number: u64) -> Result<UnixTimestamp, NodeError> {
        (**self).block_timestamp(number).await
    }

    async fn logs_in_range(
        &self,
        address: Address,
        topic: B256,
        from: u64,
        to: u64,
    ) -> Result<Vec<RawLog>, NodeError> {
        (**self).logs_in_range(address, topic, from, to).await
    }
}
