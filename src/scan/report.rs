// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! What a scan reports back: one [`ChunkReport`] per committed chunk and a
//! [`ScanSummary`] over the finished session.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::aggregate::DailySummary;
use crate::blocks::BlockRange;
use crate::storage::{DailyMetrics, ScanProgress};
use crate::types::amount::TokenAmount;
use crate::types::config::ChunkSize;

/// Outcome of one committed chunk
#[derive(Debug, Clone)]
pub struct ChunkReport {
    /// Blocks covered by this chunk
    pub chunk: BlockRange,
    /// Logs returned by the node
    pub fetched_logs: usize,
    /// Logs decoded and aggregated
    pub decoded_transfers: usize,
    /// Logs that failed decoding or validation and were left out
    pub skipped_logs: usize,
    /// Skipped logs over every chunk committed so far in this run
    pub total_skipped_logs: usize,
    /// Failed attempts before this chunk succeeded
    pub retries: u32,
    /// Chunk size after any backoff
    pub chunk_size: ChunkSize,
    /// Progress as saved after this chunk
    pub progress: ScanProgress,
    /// Cumulative per-day aggregates for the session
    pub daily: DailyMetrics,
}

impl ChunkReport {
    pub fn daily_summaries(&self) -> BTreeMap<NaiveDate, DailySummary> {
        self.daily
            .iter()
            .map(|(date, aggregate)| (*date, aggregate.summary()))
            .collect()
    }
}

/// Session-level statistics over every committed day
///
/// Averages are per day with activity, as only those days are stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanSummary {
    pub days: usize,
    pub total_transactions: u64,
    pub average_daily_active_addresses: f64,
    pub total_volume: TokenAmount,
    pub average_daily_senders: f64,
    pub average_daily_receivers: f64,
    /// Logs left out of the aggregates because they could not be decoded
    pub skipped_logs: usize,
}

impl ScanSummary {
    pub fn from_daily(daily: &DailyMetrics) -> Self {
        let days = daily.len();
        let mut total_transactions = 0u64;
        let mut total_volume = TokenAmount::zero();
        let (mut active, mut senders, mut receivers) = (0usize, 0usize, 0usize);

        for aggregate in daily.values() {
            total_transactions += aggregate.transaction_count();
            total_volume += aggregate.volume();
            active += aggregate.active_addresses().len();
            senders += aggregate.senders().len();
            receivers += aggregate.receivers().len();
        }

        let average = |sum: usize| {
            if days == 0 {
                0.0
            } else {
                sum as f64 / days as f64
            }
        };

        Self {
            days,
            total_transactions,
            average_daily_active_addresses: average(active),
            total_volume,
            average_daily_senders: average(senders),
            average_daily_receivers: average(receivers),
            skipped_logs: 0,
        }
    }

    #[must_use]
    pub fn with_skipped_logs(mut self, skipped_logs: usize) -> Self {
        self.skipped_logs = skipped_logs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::DailyAggregator;
    use crate::events::TransferEvent;
    use alloy_primitives::Address;

    #[test]
    fn test_summary_over_two_days() {
        let mut aggregator = DailyAggregator::new();
        let d1 = NaiveDate::from_ymd_opt(2024, 10, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 10, 2).unwrap();
        let t = |from: u8, to: u8, amount: &str| TransferEvent {
            from: Address::repeat_byte(from),
            to: Address::repeat_byte(to),
            amount: amount.parse().unwrap(),
        };
        aggregator.observe(d1, &t(1, 2, "1"));
        aggregator.observe(d1, &t(1, 3, "1"));
        aggregator.observe(d2, &t(4, 5, "0.5"));

        let summary = ScanSummary::from_daily(&aggregator.snapshot());
        assert_eq!(summary.days, 2);
        assert_eq!(summary.total_transactions, 3);
        assert_eq!(summary.total_volume.to_string(), "2.5");
        // day 1: 3 active, 1 sender, 2 receivers; day 2: 2 active, 1, 1
        assert_eq!(summary.average_daily_active_addresses, 2.5);
        assert_eq!(summary.average_daily_senders, 1.0);
        assert_eq!(summary.average_daily_receivers, 1.5);
        assert_eq!(summary.skipped_logs, 0);
        assert_eq!(summary.with_skipped_logs(4).skipped_logs, 4);
    }

    #[test]
    fn test_empty_summary() {
        let summary = ScanSummary::from_daily(&DailyMetrics::new());
        assert_eq!(summary.days, 0);
        assert_eq!(summary.average_daily_active_addresses, 0.0);
        assert!(summary.total_volume.is_zero());
    }
}
