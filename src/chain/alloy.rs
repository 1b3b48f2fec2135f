// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! [`ChainClient`] backed by an alloy provider.

use std::future::IntoFuture;
use std::time::Duration;

use alloy_primitives::{Address, B256};
use alloy_provider::Provider;
use alloy_rpc_types::{Filter, Log};
use alloy_transport::{RpcError, TransportError, TransportErrorKind};
use async_trait::async_trait;
use tracing::Instrument;

use super::{ChainClient, RawLog};
use crate::config::constants::DEFAULT_REQUEST_TIMEOUT;
use crate::errors::{NodeError, NodeErrorKind};
use crate::tracing::spans;
use crate::types::time::UnixTimestamp;

/// Node client over any alloy [`Provider`], with a timeout on every call.
///
/// # Example
///
/// ```rust,ignore
/// use transferscan::provider::{create_http_provider, ProviderConfig};
/// use transferscan::{AlloyChainClient, ChainClient};
///
/// let provider = create_http_provider(&ProviderConfig::new(rpc_url))?;
/// let client = AlloyChainClient::new(provider);
/// let height = client.current_block_height().await?;
/// ```
#[derive(Debug, Clone)]
pub struct AlloyChainClient<P> {
    provider: P,
    request_timeout: Duration,
}

impl<P: Provider> AlloyChainClient<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    async fn call<T, F>(&self, operation: impl Into<String>, request: F) -> Result<T, NodeError>
    where
        F: IntoFuture<Output = Result<T, TransportError>>,
    {
        let operation = operation.into();
        match tokio::time::timeout(self.request_timeout, request).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(NodeError::new(classify(&e), operation, e)),
            Err(_) => Err(NodeError::timeout(
                operation,
                self.request_timeout.as_millis(),
            )),
        }
    }
}

#[async_trait]
impl<P: Provider> ChainClient for AlloyChainClient<P> {
    async fn current_block_height(&self) -> Result<u64, NodeError> {
        self.call("eth_blockNumber", self.provider.get_block_number())
            .await
    }

    async fn block_timestamp(&self, number: u64) -> Result<UnixTimestamp, NodeError> {
        let block = self
            .call(
                format!("eth_getBlockByNumber({number})"),
                self.provider.get_block_by_number(number.into()),
            )
            .instrument(spans::fetch_block_timestamp(number))
            .await?
            .ok_or_else(|| NodeError::missing_block(number))?;

        Ok(UnixTimestamp::from_u64(block.header.timestamp))
    }

    async fn logs_in_range(
        &self,
        address: Address,
        topic: B256,
        from: u64,
        to: u64,
    ) -> Result<Vec<RawLog>, NodeError> {
        let filter = Filter::new()
            .address(address)
            .event_signature(topic)
            .from_block(from)
            .to_block(to);

        let logs = self
            .call(
                format!("eth_getLogs({from}..={to})"),
                self.provider.get_logs(&filter),
            )
            .instrument(spans::fetch_logs(from, to))
            .await?;

        Ok(logs.into_iter().map(raw_log).collect())
    }
}

fn raw_log(log: Log) -> RawLog {
    let block_number = log.block_number;
    let block_timestamp = log.block_timestamp.map(UnixTimestamp::from_u64);
    let (topics, data) = log.inner.data.split();
    RawLog {
        block_number,
        block_timestamp,
        topics,
        data,
    }
}

/// Maps a transport failure onto the kinds the scanner reacts to
pub(crate) fn classify(error: &TransportError) -> NodeErrorKind {
    match error {
        RpcError::Transport(TransportErrorKind::HttpError(http)) if http.status == 429 => {
            NodeErrorKind::RateLimited
        }
        RpcError::Transport(_) => NodeErrorKind::Connection,
        RpcError::ErrorResp(payload) if payload.is_retry_err() => NodeErrorKind::RateLimited,
        _ => NodeErrorKind::Rejected,
    }
}
