// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Scan progress and its durable checkpoint.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::SessionId;
use crate::blocks::BlockRange;
use crate::errors::StorageError;
use crate::types::config::ChunkSize;

/// How far a session's scan has durably progressed
///
/// `last_processed_block` is `None` until the first chunk is committed and
/// then always lies within `start_block..=end_block`. It only moves forward.
///
/// # Examples
///
/// ```
/// use transferscan::{BlockRange, ChunkSize, ScanProgress};
///
/// let mut progress = ScanProgress::new(BlockRange::new(100, 500).unwrap(), ChunkSize::new(100));
/// assert_eq!(progress.resume_block(), 100);
///
/// progress.advance(199, ChunkSize::new(100)).unwrap();
/// assert_eq!(progress.resume_block(), 200);
/// assert!(progress.advance(150, ChunkSize::new(100)).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanProgress {
    start_block: u64,
    end_block: u64,
    last_processed_block: Option<u64>,
    chunk_size: ChunkSize,
}

impl ScanProgress {
    /// Fresh progress over `range` with nothing processed
    pub fn new(range: BlockRange, chunk_size: ChunkSize) -> Self {
        Self {
            start_block: range.start(),
            end_block: range.end(),
            last_processed_block: None,
            chunk_size,
        }
    }

    pub fn start_block(&self) -> u64 {
        self.start_block
    }

    pub fn end_block(&self) -> u64 {
        self.end_block
    }

    pub fn last_processed_block(&self) -> Option<u64> {
        self.last_processed_block
    }

    pub fn chunk_size(&self) -> ChunkSize {
        self.chunk_size
    }

    /// The scan's full block range
    pub fn range(&self) -> Option<BlockRange> {
        BlockRange::new(self.start_block, self.end_block)
    }

    /// First block not yet processed; `end_block + 1` once complete
    pub fn resume_block(&self) -> u64 {
        self.last_processed_block
            .map_or(self.start_block, |block| block.saturating_add(1))
    }

    pub fn is_complete(&self) -> bool {
        self.last_processed_block == Some(self.end_block)
    }

    /// Blocks still to scan, `None` when complete
    pub fn remaining(&self) -> Option<BlockRange> {
        if self.is_complete() {
            return None;
        }
        BlockRange::new(self.resume_block(), self.end_block)
    }

    /// Records that every block up to `through_block` is committed
    ///
    /// # Errors
    ///
    /// [`StorageError::InvalidProgress`] if `through_block` lies outside the
    /// range or before the last processed block.
    pub fn advance(&mut self, through_block: u64, chunk_size: ChunkSize) -> Result<(), StorageError> {
        if through_block < self.start_block || through_block > self.end_block {
            return Err(StorageError::invalid_progress(format!(
                "block {through_block} is outside {}..={}",
                self.start_block, self.end_block
            )));
        }
        if let Some(last) = self.last_processed_block {
            if through_block < last {
                return Err(StorageError::invalid_progress(format!(
                    "block {through_block} is before last processed block {last}"
                )));
            }
        }
        self.last_processed_block = Some(through_block);
        self.chunk_size = chunk_size;
        Ok(())
    }

    /// Checks the record invariants, for progress read back from storage
    pub fn validate(&self, session: &SessionId) -> Result<(), StorageError> {
        if self.chunk_size.as_u32() == 0 {
            return Err(StorageError::corrupt(session.as_str(), "chunk size is zero"));
        }
        if self.start_block > self.end_block {
            return Err(StorageError::corrupt(
                session.as_str(),
                format!(
                    "start block {} is after end block {}",
                    self.start_block, self.end_block
                ),
            ));
        }
        if let Some(last) = self.last_processed_block {
            if last < self.start_block || last > self.end_block {
                return Err(StorageError::corrupt(
                    session.as_str(),
                    format!(
                        "last processed block {last} is outside {}..={}",
                        self.start_block, self.end_block
                    ),
                ));
            }
        }
        Ok(())
    }

    /// Human-readable description of what has been covered
    pub fn coverage(&self) -> String {
        match self.last_processed_block {
            Some(last) => format!(
                "processed blocks {}..={last} of {}..={}",
                self.start_block, self.start_block, self.end_block
            ),
            None => format!(
                "no blocks processed of {}..={}",
                self.start_block, self.end_block
            ),
        }
    }
}

/// Durable store of [`ScanProgress`] per session
#[async_trait]
pub trait ProgressCheckpoint: Send + Sync {
    async fn save(&self, session: &SessionId, progress: &ScanProgress) -> Result<(), StorageError>;

    /// `Ok(None)` when the session has never been saved
    async fn load(&self, session: &SessionId) -> Result<Option<ScanProgress>, StorageError>;
}

#[async_trait]
impl<T: ProgressCheckpoint + ?Sized> ProgressCheckpoint for Arc<T> {
    async fn save(&self, session: &SessionId, progress: &ScanProgress) -> Result<(), StorageError> {
        (**self).save(session, progress).await
    }

    async fn load(&self, session: &SessionId) -> Result<Option<ScanProgress>, StorageError> {
        (**self).load(session).await
    }
}

/// In-process checkpoint, lost when the process exits
#[derive(Debug, Default)]
pub struct MemoryCheckpoint {
    sessions: Mutex<HashMap<SessionId, ScanProgress>>,
}

impl MemoryCheckpoint {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProgressCheckpoint for MemoryCheckpoint {
    async fn save(&self, session: &SessionId, progress: &ScanProgress) -> Result<(), StorageError> {
        self.sessions
            .lock()
            .await
            .insert(session.clone(), progress.clone());
        Ok(())
    }

    async fn load(&self, session: &SessionId) -> Result<Option<ScanProgress>, StorageError> {
        Ok(self.sessions.lock().await.get(session).cloned())
    }
}
