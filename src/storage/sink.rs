// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Destination for completed daily aggregates.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Mutex;

use super::SessionId;
use crate::aggregate::{merge_daily, DailyAggregate};
use crate::errors::StorageError;

/// Per-day aggregates of one session
pub type DailyMetrics = BTreeMap<NaiveDate, DailyAggregate>;

/// Persistent store of per-day aggregates keyed by `(session, date)`
///
/// A commit merges chunk deltas into the stored days and moves the session
/// watermark to `through_block` in one atomic step. A commit whose
/// `through_block` does not move the watermark forward is rejected, so the
/// same blocks can never be merged twice.
#[async_trait]
pub trait MetricsSink: Send + Sync {
    async fn commit(
        &self,
        session: &SessionId,
        through_block: u64,
        deltas: DailyMetrics,
    ) -> Result<(), StorageError>;

    /// Highest block whose transfers are included, `None` before the first commit
    async fn watermark(&self, session: &SessionId) -> Result<Option<u64>, StorageError>;

    /// Everything committed for the session so far
    async fn snapshot(&self, session: &SessionId) -> Result<DailyMetrics, StorageError>;
}

#[async_trait]
impl<T: MetricsSink + ?Sized> MetricsSink for Arc<T> {
    async fn commit(
        &self,
        session: &SessionId,
        through_block: u64,
        deltas: DailyMetrics,
    ) -> Result<(), StorageError> {
        (**self).commit(session, through_block, deltas).await
    }

    async fn watermark(&self, session: &SessionId) -> Result<Option<u64>, StorageError> {
        (**self).watermark(session).await
    }

    async fn snapshot(&self, session: &SessionId) -> Result<DailyMetrics, StorageError> {
        (**self).snapshot(session).await
    }
}

/// Committed state of one session
#[derive(Debug, Clone, Default)]
pub(crate) struct SessionMetrics {
    pub(crate) through_block: Option<u64>,
    pub(crate) days: DailyMetrics,
}

impl SessionMetrics {
    /// Applies a commit in place after checking it moves the watermark forward
    pub(crate) fn apply(
        &mut self,
        session: &SessionId,
        through_block: u64,
        deltas: &DailyMetrics,
    ) -> Result<(), StorageError> {
        if let Some(watermark) = self.through_block {
            if through_block <= watermark {
                return Err(StorageError::invalid_progress(format!(
                    "session {session} already committed through block {watermark}, \
                     refusing commit through {through_block}"
                )));
            }
        }
        merge_daily(&mut self.days, deltas);
        self.through_block = Some(through_block);
        Ok(())
    }
}

/// In-process sink, lost when the process exits
#[derive(Debug, Default)]
pub struct MemoryMetricsSink {
    sessions: Mutex<HashMap<SessionId, SessionMetrics>>,
}

impl MemoryMetricsSink {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MetricsSink for MemoryMetricsSink {
    async fn commit(
        &self,
        session: &SessionId,
        through_block: u64,
        deltas: DailyMetrics,
    ) -> Result<(), StorageError> {
        let mut sessions = self.sessions.lock().await;
        sessions
            .entry(session.clone())
            .or_default()
            .apply(session, through_block, &deltas)
    }

    async fn watermark(&self, session: &SessionId) -> Result<Option<u64>, StorageError> {
        Ok(self
            .sessions
            .lock()
            .await
            .get(session)
            .and_then(|s| s.through_block))
    }

    async fn snapshot(&self, session: &SessionId) -> Result<DailyMetrics, StorageError> {
        Ok(self
            .sessions
            .lock()
            .await
            .get(session)
            .map(|s| s.days.clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::DailyAggregator;
    use crate::events::TransferEvent;
    use alloy_primitives::Address;

    fn deltas(amount: &str) -> DailyMetrics {
        let mut aggregator = DailyAggregator::new();
        aggregator.observe(
            NaiveDate::from_ymd_opt(2024, 10, 10).unwrap(),
            &TransferEvent {
                from: Address::repeat_byte(1),
                to: Address::repeat_byte(2),
                amount: amount.parse().unwrap(),
            },
        );
        aggregator.drain_completed()
    }

    #[tokio::test]
    async fn test_commits_merge_and_move_watermark() {
        let sink = MemoryMetricsSink::new();
        let session = SessionId::new("sink").unwrap();
        assert_eq!(sink.watermark(&session).await.unwrap(), None);

        sink.commit(&session, 100, deltas("1")).await.unwrap();
        sink.commit(&session, 200, deltas("2")).await.unwrap();

        assert_eq!(sink.watermark(&session).await.unwrap(), Some(200));
        let snapshot = sink.snapshot(&session).await.unwrap();
        let day = snapshot.values().next().unwrap();
        assert_eq!(day.transaction_count(), 2);
        assert_eq!(day.volume().to_string(), "3");
    }

    #[tokio::test]
    async fn test_replayed_commit_is_rejected() {
        let sink = MemoryMetricsSink::new();
        let session = SessionId::new("sink").unwrap();

        sink.commit(&session, 100, deltas("1")).await.unwrap();
        let replay = sink.commit(&session, 100, deltas("1")).await;
        assert!(matches!(replay, Err(StorageError::InvalidProgress { .. })));

        let snapshot = sink.snapshot(&session).await.unwrap();
        assert_eq!(snapshot.values().next().unwrap().transaction_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_commit_still_moves_watermark() {
        let sink = MemoryMetricsSink::new();
        let session = SessionId::new("quiet").unwrap();

        sink.commit(&session, 50, DailyMetrics::new()).await.unwrap();
        assert_eq!(sink.watermark(&session).await.unwrap(), Some(50));
        assert!(sink.snapshot(&session).await.unwrap().is_empty());
    }
}
