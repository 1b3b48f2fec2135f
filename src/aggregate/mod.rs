// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Per-day transfer statistics.
//!
//! [`DailyAggregator`] is the chunk-local accumulator the scanner feeds;
//! [`DailyAggregate`] is both the accumulator cell and the persisted record.
//! Aggregates merge by set union and addition, so the order in which
//! transfers (or whole chunks) are folded in never changes the result.

use std::collections::{BTreeMap, BTreeSet};

use alloy_primitives::Address;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::events::TransferEvent;
use crate::types::amount::TokenAmount;

/// Values that can absorb another value of the same kind
pub trait Mergeable {
    /// Merge another value into self
    fn merge(&mut self, other: &Self);
}

/// Statistics for one UTC calendar day
///
/// `active_addresses` is always the union of `senders` and `receivers`.
/// Sets are ordered so serialized records are byte-for-byte reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyAggregate {
    transaction_count: u64,
    active_addresses: BTreeSet<Address>,
    volume: TokenAmount,
    senders: BTreeSet<Address>,
    receivers: BTreeSet<Address>,
}

impl DailyAggregate {
    /// Folds one transfer into the day
    pub fn record(&mut self, transfer: &TransferEvent) {
        self.transaction_count += 1;
        self.senders.insert(transfer.from);
        self.receivers.insert(transfer.to);
        self.active_addresses.insert(transfer.from);
        self.active_addresses.insert(transfer.to);
        self.volume += &transfer.amount;
    }

    pub fn transaction_count(&self) -> u64 {
        self.transaction_count
    }

    pub fn active_addresses(&self) -> &BTreeSet<Address> {
        &self.active_addresses
    }

    pub fn volume(&self) -> &TokenAmount {
        &self.volume
    }

    pub fn senders(&self) -> &BTreeSet<Address> {
        &self.senders
    }

    pub fn receivers(&self) -> &BTreeSet<Address> {
        &self.receivers
    }

    /// Whether the record satisfies the aggregate invariants
    ///
    /// Used to reject corrupt records read back from storage.
    pub fn is_consistent(&self) -> bool {
        let union: BTreeSet<Address> = self.senders.union(&self.receivers).copied().collect();
        let has_activity = !self.senders.is_empty();
        union == self.active_addresses
            && has_activity == (self.transaction_count > 0)
            && self.volume >= TokenAmount::zero()
    }

    pub fn summary(&self) -> DailySummary {
        DailySummary {
            transactions: self.transaction_count,
            active_addresses: self.active_addresses.len(),
            volume: self.volume.clone(),
            unique_senders: self.senders.len(),
            unique_receivers: self.receivers.len(),
        }
    }
}

impl Mergeable for DailyAggregate {
    fn merge(&mut self, other: &Self) {
        self.transaction_count += other.transaction_count;
        self.volume += &other.volume;
        self.senders.extend(other.senders.iter().copied());
        self.receivers.extend(other.receivers.iter().copied());
        self.active_addresses
            .extend(other.active_addresses.iter().copied());
    }
}

/// Count-only projection of a [`DailyAggregate`] for reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailySummary {
    pub transactions: u64,
    pub active_addresses: usize,
    pub volume: TokenAmount,
    pub unique_senders: usize,
    pub unique_receivers: usize,
}

/// Merges every per-day delta into `target`, creating days as needed
pub fn merge_daily(
    target: &mut BTreeMap<NaiveDate, DailyAggregate>,
    deltas: &BTreeMap<NaiveDate, DailyAggregate>,
) {
    for (date, delta) in deltas {
        target.entry(*date).or_default().merge(delta);
    }
}

/// Accumulates transfers per UTC day until drained
///
/// # Example
///
/// ```rust
/// use alloy_primitives::Address;
/// use chrono::NaiveDate;
/// use transferscan::{DailyAggregator, TransferEvent};
///
/// let day = NaiveDate::from_ymd_opt(2024, 10, 10).unwrap();
/// let mut aggregator = DailyAggregator::new();
/// aggregator.observe(
///     day,
///     &TransferEvent {
///         from: Address::repeat_byte(1),
///         to: Address::repeat_byte(2),
///         amount: "1.5".parse().unwrap(),
///     },
/// );
///
/// let drained = aggregator.drain_completed();
/// assert_eq!(drained[&day].transaction_count(), 1);
/// assert!(aggregator.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct DailyAggregator {
    days: BTreeMap<NaiveDate, DailyAggregate>,
}

impl DailyAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, date: NaiveDate, transfer: &TransferEvent) {
        self.days.entry(date).or_default().record(transfer);
    }

    /// Hands off everything accumulated so far, leaving the aggregator empty
    pub fn drain_completed(&mut self) -> BTreeMap<NaiveDate, DailyAggregate> {
        std::mem::take(&mut self.days)
    }

    pub fn snapshot(&self) -> BTreeMap<NaiveDate, DailyAggregate> {
        self.days.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Number of distinct days seen since the last drain
    pub fn len(&self) -> usize {
        self.days.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 10, d).unwrap()
    }

    fn transfer(from: u8, to: u8, amount: &str) -> TransferEvent {
        TransferEvent {
            from: Address::repeat_byte(from),
            to: Address::repeat_byte(to),
            amount: amount.parse().unwrap(),
        }
    }

    #[test]
    fn test_observe_tracks_sets_and_volume() {
        let mut aggregator = DailyAggregator::new();
        aggregator.observe(day(1), &transfer(1, 2, "1"));
        aggregator.observe(day(1), &transfer(2, 3, "2"));

        let snapshot = aggregator.snapshot();
        let agg = &snapshot[&day(1)];
        assert_eq!(agg.transaction_count(), 2);
        assert_eq!(agg.active_addresses().len(), 3);
        assert_eq!(agg.senders().len(), 2);
        assert_eq!(agg.receivers().len(), 2);
        assert_eq!(agg.volume().to_string(), "3");
        assert!(agg.is_consistent());
    }

    #[test]
    fn test_self_transfer_counts_one_address() {
        let mut agg = DailyAggregate::default();
        agg.record(&transfer(7, 7, "0.5"));

        let summary = agg.summary();
        assert_eq!(summary.transactions, 1);
        assert_eq!(summary.active_addresses, 1);
        assert_eq!(summary.unique_senders, 1);
        assert_eq!(summary.unique_receivers, 1);
    }

    #[test]
    fn test_drain_leaves_aggregator_empty() {
        let mut aggregator = DailyAggregator::new();
        aggregator.observe(day(1), &transfer(1, 2, "1"));
        aggregator.observe(day(2), &transfer(1, 2, "1"));

        let drained = aggregator.drain_completed();
        assert_eq!(drained.len(), 2);
        assert!(aggregator.is_empty());
        assert!(aggregator.drain_completed().is_empty());
    }

    #[test]
    fn test_merge_matches_single_pass() {
        let transfers = [
            (day(1), transfer(1, 2, "1")),
            (day(1), transfer(3, 4, "2.25")),
            (day(2), transfer(2, 1, "0.75")),
        ];

        let mut single = DailyAggregator::new();
        for (date, t) in &transfers {
            single.observe(*date, t);
        }

        let mut first = DailyAggregator::new();
        let mut second = DailyAggregator::new();
        first.observe(transfers[0].0, &transfers[0].1);
        second.observe(transfers[1].0, &transfers[1].1);
        second.observe(transfers[2].0, &transfers[2].1);

        let mut merged = first.drain_completed();
        merge_daily(&mut merged, &second.drain_completed());

        assert_eq!(merged, single.drain_completed());
    }

    #[test]
    fn test_inconsistent_record_is_detected() {
        let mut agg = DailyAggregate::default();
        agg.record(&transfer(1, 2, "1"));
        agg.active_addresses.remove(&Address::repeat_byte(2));
        assert!(!agg.is_consistent());

        assert!(DailyAggregate::default().is_consistent());
    }
}
