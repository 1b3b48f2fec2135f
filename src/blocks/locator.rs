// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Timestamp to block number search.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::{debug, Instrument};

use super::BlockRange;
use crate::chain::ChainClient;
use crate::errors::LocateError;
use crate::tracing::spans;
use crate::types::time::UnixTimestamp;

/// Maps timestamps and calendar dates to block numbers by binary search.
///
/// Each lookup costs `O(log height)` block fetches. Nothing is cached across
/// lookups; a scan only needs two.
///
/// # Example
///
/// ```rust,ignore
/// use transferscan::BlockTimestampLocator;
/// use chrono::NaiveDate;
///
/// let locator = BlockTimestampLocator::new(&client);
/// let range = locator
///     .range_for_dates(
///         NaiveDate::from_ymd_opt(2024, 10, 1).unwrap(),
///         NaiveDate::from_ymd_opt(2024, 10, 31).unwrap(),
///     )
///     .await?;
/// ```
pub struct BlockTimestampLocator<C> {
    client: C,
}

impl<C: ChainClient> BlockTimestampLocator<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Finds the block whose timestamp is closest to `target`
    ///
    /// Blocks are searched over `1..=height`. When no block matches exactly,
    /// the closer of the two blocks bracketing the target wins; on a tie the
    /// block at or before the target is returned.
    ///
    /// # Errors
    ///
    /// - [`LocateError::EmptyChain`] if the node reports height 0
    /// - [`LocateError::LocateFailed`] if any block fetch fails
    pub async fn locate(&self, target: UnixTimestamp) -> Result<u64, LocateError> {
        let height = self
            .client
            .current_block_height()
            .await
            .map_err(|e| LocateError::locate_failed(target.0, e))?;
        if height == 0 {
            return Err(LocateError::EmptyChain);
        }

        self.search(target, height)
            .instrument(spans::locate_block(target.0, height))
            .await
    }

    async fn search(&self, target: UnixTimestamp, height: u64) -> Result<u64, LocateError> {
        let mut seen: HashMap<u64, UnixTimestamp> = HashMap::new();
        let mut left = 1u64;
        let mut right = height;

        while left <= right {
            let mid = left + (right - left) / 2;
            let ts = self.timestamp_memo(&mut seen, mid, target).await?;

            if ts == target {
                debug!(block = mid, "Exact timestamp match");
                return Ok(mid);
            }
            if ts < target {
                left = mid + 1;
            } else {
                // mid >= 1, so this stops at 0 at worst
                right = mid - 1;
            }
        }

        // left is the first block past the target, right the last before it
        let after = if left <= height {
            Some((left, self.timestamp_memo(&mut seen, left, target).await?))
        } else {
            None
        };
        let before = if right >= 1 {
            Some((right, self.timestamp_memo(&mut seen, right, target).await?))
        } else {
            None
        };

        let block = match (before, after) {
            (Some(b), Some(a)) => closest(target, b, a),
            (Some((block, _)), None) | (None, Some((block, _))) => block,
            (None, None) => return Err(LocateError::EmptyChain),
        };
        debug!(block, fetched = seen.len(), "Located nearest block");
        Ok(block)
    }

    async fn timestamp_memo(
        &self,
        seen: &mut HashMap<u64, UnixTimestamp>,
        block: u64,
        target: UnixTimestamp,
    ) -> Result<UnixTimestamp, LocateError> {
        if let Some(ts) = seen.get(&block) {
            return Ok(*ts);
        }
        let ts = self
            .client
            .block_timestamp(block)
            .await
            .map_err(|e| LocateError::locate_failed(target.0, e))?;
        seen.insert(block, ts);
        Ok(ts)
    }

    /// Converts inclusive UTC calendar dates into an inclusive block range
    ///
    /// `start` is located at 00:00:00 and `end` at 23:59:59.
    ///
    /// # Errors
    ///
    /// [`LocateError::InvalidDateRange`] if `start > end`, plus anything
    /// [`locate`](Self::locate) returns.
    pub async fn range_for_dates(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BlockRange, LocateError> {
        if start > end {
            return Err(LocateError::invalid_date_range(
                start,
                end,
                "start date is after end date",
            ));
        }
        let (Some(from_ts), Some(to_ts)) = (
            UnixTimestamp::start_of_day(start),
            UnixTimestamp::end_of_day(end),
        ) else {
            return Err(LocateError::invalid_date_range(
                start,
                end,
                "date is outside the representable range",
            ));
        };

        async {
            let start_block = self.locate(from_ts).await?;
            let end_block = self.locate(to_ts).await?;
            BlockRange::new(start_block, end_block).ok_or_else(|| {
                LocateError::invalid_date_range(
                    start,
                    end,
                    format!("chain timestamps map it to blocks {start_block} > {end_block}"),
                )
            })
        }
        .instrument(spans::range_for_dates(start, end))
        .await
    }
}

fn closest(
    target: UnixTimestamp,
    before: (u64, UnixTimestamp),
    after: (u64, UnixTimestamp),
) -> u64 {
    let before_diff = before.1.abs_diff(target);
    let after_diff = after.1.abs_diff(target);
    match before_diff.cmp(&after_diff) {
        std::cmp::Ordering::Less => before.0,
        std::cmp::Ordering::Greater => after.0,
        std::cmp::Ordering::Equal if after.1 <= target && before.1 > target => after.0,
        std::cmp::Ordering::Equal => before.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closest_prefers_nearer_block() {
        let target = UnixTimestamp(100);
        assert_eq!(closest(target, (5, UnixTimestamp(98)), (6, UnixTimestamp(101))), 6);
        assert_eq!(closest(target, (5, UnixTimestamp(99)), (6, UnixTimestamp(103))), 5);
    }

    #[test]
    fn test_closest_tie_goes_to_block_not_exceeding_target() {
        let target = UnixTimestamp(100);
        assert_eq!(closest(target, (5, UnixTimestamp(98)), (6, UnixTimestamp(102))), 5);
    }
}
