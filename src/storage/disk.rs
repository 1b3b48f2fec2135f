// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! JSON-on-disk checkpoint and metrics sink.
//!
//! Layout under the data directory:
//!
//! ```text
//! <data_dir>/<session>/progress.json       {version, session, progress}
//! <data_dir>/<session>/daily_metrics.json  {version, session, through_block, days}
//! ```
//!
//! Every write goes to a sibling temp file first, is synced to disk and is
//! then renamed over the target, so a crash or power loss leaves either the
//! old or the new record.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::checkpoint::{ProgressCheckpoint, ScanProgress};
use super::sink::{DailyMetrics, MetricsSink, SessionMetrics};
use super::SessionId;
use crate::errors::StorageError;

/// Current on-disk format version
const STORAGE_VERSION: u32 = 1;

const PROGRESS_FILE: &str = "progress.json";
const METRICS_FILE: &str = "daily_metrics.json";

#[derive(Debug, Serialize, Deserialize)]
struct ProgressRecord {
    version: u32,
    session: SessionId,
    progress: ScanProgress,
}

#[derive(Debug, Serialize, Deserialize)]
struct MetricsRecord {
    version: u32,
    session: SessionId,
    through_block: Option<u64>,
    days: DailyMetrics,
}

#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

fn session_dir(root: &Path, session: &SessionId) -> PathBuf {
    root.join(session.as_str())
}

/// Reads and parses a versioned record; `Ok(None)` if the file does not exist
async fn read_record<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StorageError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StorageError::io(path, "read record", e)),
    };

    let probe: VersionProbe =
        serde_json::from_slice(&bytes).map_err(|e| StorageError::serialization(path, e))?;
    if probe.version != STORAGE_VERSION {
        return Err(StorageError::VersionMismatch {
            path: path.display().to_string(),
            found: probe.version,
            expected: STORAGE_VERSION,
        });
    }

    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| StorageError::serialization(path, e))
}

/// Writes `record` to `path` through a temp file and rename
async fn write_record<T: Serialize>(path: &Path, record: &T) -> Result<(), StorageError> {
    let json = serde_json::to_vec_pretty(record).map_err(|e| StorageError::serialization(path, e))?;

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| StorageError::io(parent, "create session directory", e))?;
    }

    let temp_path = path.with_extension("json.tmp");
    let mut file = tokio::fs::File::create(&temp_path)
        .await
        .map_err(|e| StorageError::io(&temp_path, "create temp record", e))?;
    file.write_all(&json)
        .await
        .map_err(|e| StorageError::io(&temp_path, "write temp record", e))?;
    file.sync_all()
        .await
        .map_err(|e| StorageError::io(&temp_path, "sync temp record", e))?;
    drop(file);

    tokio::fs::rename(&temp_path, path)
        .await
        .map_err(|e| StorageError::io(path, "replace record", e))?;

    Ok(())
}

fn check_session(
    path: &Path,
    expected: &SessionId,
    found: &SessionId,
) -> Result<(), StorageError> {
    if expected != found {
        return Err(StorageError::corrupt(
            expected.as_str(),
            format!("{} belongs to session {found}", path.display()),
        ));
    }
    Ok(())
}

/// [`ProgressCheckpoint`] storing one `progress.json` per session directory
///
/// # Example
///
/// ```rust,ignore
/// use transferscan::{DiskCheckpoint, ProgressCheckpoint, SessionId};
///
/// let checkpoint = DiskCheckpoint::new("./data");
/// let progress = checkpoint.load(&SessionId::new("wigo")?).await?;
/// ```
#[derive(Debug, Clone)]
pub struct DiskCheckpoint {
    root: PathBuf,
}

impl DiskCheckpoint {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, session: &SessionId) -> PathBuf {
        session_dir(&self.root, session).join(PROGRESS_FILE)
    }
}

#[async_trait]
impl ProgressCheckpoint for DiskCheckpoint {
    async fn save(&self, session: &SessionId, progress: &ScanProgress) -> Result<(), StorageError> {
        let path = self.path_for(session);
        let record = ProgressRecord {
            version: STORAGE_VERSION,
            session: session.clone(),
            progress: progress.clone(),
        };
        write_record(&path, &record).await?;

        debug!(
            path = %path.display(),
            last_processed_block = ?progress.last_processed_block(),
            "Saved scan progress"
        );
        Ok(())
    }

    async fn load(&self, session: &SessionId) -> Result<Option<ScanProgress>, StorageError> {
        let path = self.path_for(session);
        let Some(record) = read_record::<ProgressRecord>(&path).await? else {
            debug!(path = %path.display(), "No saved progress");
            return Ok(None);
        };

        check_session(&path, session, &record.session)?;
        record.progress.validate(session)?;

        info!(
            path = %path.display(),
            resume_block = record.progress.resume_block(),
            end_block = record.progress.end_block(),
            "Loaded scan progress"
        );
        Ok(Some(record.progress))
    }
}

/// [`MetricsSink`] storing one `daily_metrics.json` per session directory
///
/// Commits are read-modify-write under an internal lock; the rewritten file
/// carries both the merged days and the new watermark.
#[derive(Debug)]
pub struct DiskMetricsSink {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl DiskMetricsSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path_for(&self, session: &SessionId) -> PathBuf {
        session_dir(&self.root, session).join(METRICS_FILE)
    }

    async fn load_session(&self, session: &SessionId) -> Result<SessionMetrics, StorageError> {
        let path = self.path_for(session);
        let Some(record) = read_record::<MetricsRecord>(&path).await? else {
            return Ok(SessionMetrics::default());
        };

        check_session(&path, session, &record.session)?;
        if let Some((date, _)) = record.days.iter().find(|(_, day)| !day.is_consistent()) {
            return Err(StorageError::corrupt(
                session.as_str(),
                format!("aggregate for {date} violates its invariants"),
            ));
        }

        Ok(SessionMetrics {
            through_block: record.through_block,
            days: record.days,
        })
    }
}

#[async_trait]
impl MetricsSink for DiskMetricsSink {
    async fn commit(
        &self,
        session: &SessionId,
        through_block: u64,
        deltas: DailyMetrics,
    ) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;

        let mut metrics = self.load_session(session).await?;
        metrics.apply(session, through_block, &deltas)?;

        let path = self.path_for(session);
        let record = MetricsRecord {
            version: STORAGE_VERSION,
            session: session.clone(),
            through_block: metrics.through_block,
            days: metrics.days,
        };
        write_record(&path, &record).await?;

        debug!(
            path = %path.display(),
            through_block,
            days_touched = deltas.len(),
            "Committed daily metrics"
        );
        Ok(())
    }

    async fn watermark(&self, session: &SessionId) -> Result<Option<u64>, StorageError> {
        Ok(self.load_session(session).await?.through_block)
    }

    async fn snapshot(&self, session: &SessionId) -> Result<DailyMetrics, StorageError> {
        Ok(self.load_session(session).await?.days)
    }
}
