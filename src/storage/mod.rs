// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Durable scan state.
//!
//! Two stores back a resumable scan:
//!
//! - [`ProgressCheckpoint`] - the last block whose transfers are committed
//! - [`MetricsSink`] - the committed per-day aggregates, plus a watermark
//!   naming the last block they include
//!
//! Each has an in-memory implementation for tests and embedding, and a
//! JSON-on-disk implementation for the binary.

mod checkpoint;
mod disk;
mod session;
mod sink;

pub use checkpoint::{MemoryCheckpoint, ProgressCheckpoint, ScanProgress};
pub use disk::{DiskCheckpoint, DiskMetricsSink};
pub use session::SessionId;
pub use sink::{DailyMetrics, MemoryMetricsSink, MetricsSink};
