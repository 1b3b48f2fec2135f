// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Block ranges and the timestamp-to-block locator.
//!
//! A scan is bounded by calendar dates; the node only understands block
//! numbers. [`BlockTimestampLocator`] bridges the two with a binary search
//! over block timestamps.

mod locator;
mod range;

pub use locator::BlockTimestampLocator;
pub use range::BlockRange;
