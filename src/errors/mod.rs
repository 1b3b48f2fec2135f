//! Error types for the transferscan library.
//!
//! This module provides strongly-typed errors for all public APIs in transferscan.
//! It follows a hybrid approach:
//!
//! - **Module-specific errors** for fine-grained error handling (`NodeError`,
//!   `LocateError`, `StorageError`, etc.)
//! - **Unified error type** (`TransferScanError`) for convenience when you don't need
//!   to distinguish between error sources
//!
//! # Architecture
//!
//! - [`NodeError`] - Transient failures talking to the node, classified by [`NodeErrorKind`]
//! - [`DecodeError`] - A single malformed Transfer log (skipped, never fatal)
//! - [`LocateError`] - Binary search for scan bounds failed
//! - [`StorageError`] - Checkpoint or metrics persistence failed (fatal for the run)
//! - [`ConfigError`] - Bad configuration or provider URL
//! - [`ScanError`] - Terminal outcome of a scan, including the resumable `Aborted`
//!
//! # Examples
//!
//! ```rust,ignore
//! use futures::StreamExt;
//! use transferscan::ScanError;
//!
//! let mut stream = std::pin::pin!(pipeline.run_scan(request, stop).await?);
//! while let Some(report) = stream.next().await {
//!     match report {
//!         Ok(report) => println!("through block {}", report.chunk.end()),
//!         Err(ScanError::Aborted { progress, .. }) => {
//!             eprintln!("rate limited; resume from {}", progress.resume_block());
//!         }
//!         Err(e) => return Err(e.into()),
//!     }
//! }
//! ```

mod config;
mod decode;
mod locate;
mod node;
mod scan;
mod storage;

pub use config::ConfigError;
pub use decode::DecodeError;
pub use locate::LocateError;
pub use node::{NodeError, NodeErrorKind};
pub use scan::ScanError;
pub use storage::StorageError;

/// Unified error type for all transferscan operations.
///
/// All module-specific error types automatically convert to `TransferScanError` via
/// `From` implementations, so you can use `?` to propagate errors naturally.
#[derive(Debug, thiserror::Error)]
pub enum TransferScanError {
    /// Error from the remote node.
    #[error("Node error: {0}")]
    Node(#[from] NodeError),

    /// Error decoding a Transfer log.
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Error locating blocks by timestamp.
    #[error("Locate error: {0}")]
    Locate(#[from] LocateError),

    /// Error persisting scan state.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Error in configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Terminal scan error.
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),
}
