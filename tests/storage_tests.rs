//! Disk-backed checkpoint and metrics sink behaviour
//!
//! Each test works in its own temporary data directory.

mod helpers;

use std::collections::BTreeMap;
use std::sync::Arc;

use alloy_chains::NamedChain;
use chrono::NaiveDate;
use helpers::{addr, drain, session, token, transfer_log, units, SyntheticChain};
use tempfile::TempDir;
use transferscan::{
    BlockRange, ChunkSize, DailyAggregator, DailyMetrics, DiskCheckpoint, DiskMetricsSink,
    MetricsSink, ProgressCheckpoint, ScanConfigBuilder, ScanError, ScanPipeline, ScanProgress,
    ScanRequest, StopSignal, StorageError, TransferEvent,
};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 10, d).unwrap()
}

fn deltas(entries: &[(u32, u8, u8, &str)]) -> DailyMetrics {
    let mut aggregator = DailyAggregator::new();
    for (d, from, to, amount) in entries {
        aggregator.observe(
            day(*d),
            &TransferEvent {
                from: addr(*from),
                to: addr(*to),
                amount: amount.parse().unwrap(),
            },
        );
    }
    aggregator.drain_completed()
}

#[tokio::test]
async fn test_checkpoint_round_trip_across_instances() {
    let temp_dir = TempDir::new().unwrap();
    let id = session("round_trip");

    let mut progress = ScanProgress::new(BlockRange::new(100, 5_000).unwrap(), ChunkSize::new(1_000));
    progress.advance(1_099, ChunkSize::new(500)).unwrap();
    DiskCheckpoint::new(temp_dir.path())
        .save(&id, &progress)
        .await
        .unwrap();

    let loaded = DiskCheckpoint::new(temp_dir.path())
        .load(&id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded, progress);
    assert_eq!(loaded.resume_block(), 1_100);
    assert_eq!(loaded.chunk_size(), ChunkSize::new(500));
}

#[tokio::test]
async fn test_missing_checkpoint_is_none() {
    let temp_dir = TempDir::new().unwrap();
    let loaded = DiskCheckpoint::new(temp_dir.path())
        .load(&session("nobody"))
        .await
        .unwrap();
    assert!(loaded.is_none());
}

#[tokio::test]
async fn test_garbled_checkpoint_is_a_serialization_error() {
    let temp_dir = TempDir::new().unwrap();
    let checkpoint = DiskCheckpoint::new(temp_dir.path());
    let id = session("garbled");
    let path = checkpoint.path_for(&id);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "{ not json").unwrap();

    assert!(matches!(
        checkpoint.load(&id).await,
        Err(StorageError::Serialization { .. })
    ));
}

#[tokio::test]
async fn test_metrics_merge_and_persist() {
    let temp_dir = TempDir::new().unwrap();
    let id = session("metrics");
    let sink = DiskMetricsSink::new(temp_dir.path());

    sink.commit(&id, 100, deltas(&[(1, 1, 2, "1.5"), (2, 3, 4, "2")]))
        .await
        .unwrap();
    sink.commit(&id, 200, deltas(&[(2, 4, 5, "0.5")])).await.unwrap();

    let reopened = DiskMetricsSink::new(temp_dir.path());
    assert_eq!(reopened.watermark(&id).await.unwrap(), Some(200));

    let days = reopened.snapshot(&id).await.unwrap();
    assert_eq!(days.len(), 2);
    assert_eq!(days[&day(1)].volume().to_string(), "1.5");
    assert_eq!(days[&day(2)].transaction_count(), 2);
    assert_eq!(days[&day(2)].volume().to_string(), "2.5");
    assert_eq!(days[&day(2)].active_addresses().len(), 3);
}

#[tokio::test]
async fn test_replayed_commit_leaves_metrics_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let id = session("replay");
    let sink = DiskMetricsSink::new(temp_dir.path());

    sink.commit(&id, 100, deltas(&[(1, 1, 2, "1")])).await.unwrap();
    let before = std::fs::read(sink.path_for(&id)).unwrap();

    let replay = sink.commit(&id, 100, deltas(&[(1, 1, 2, "1")])).await;
    assert!(matches!(replay, Err(StorageError::InvalidProgress { .. })));
    assert_eq!(std::fs::read(sink.path_for(&id)).unwrap(), before);
    assert_eq!(
        sink.snapshot(&id).await.unwrap()[&day(1)].transaction_count(),
        1
    );
}

#[tokio::test]
async fn test_metrics_file_layout() {
    let temp_dir = TempDir::new().unwrap();
    let id = session("layout");
    let sink = DiskMetricsSink::new(temp_dir.path());
    sink.commit(&id, 42, deltas(&[(3, 1, 2, "1")])).await.unwrap();

    let path = temp_dir.path().join("layout").join("daily_metrics.json");
    assert_eq!(sink.path_for(&id), path);

    let json: serde_json::Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(json["version"], 1);
    assert_eq!(json["session"], "layout");
    assert_eq!(json["through_block"], 42);
    assert!(json["days"]["2024-10-03"].is_object());
}

#[tokio::test]
async fn test_sessions_are_isolated() {
    let temp_dir = TempDir::new().unwrap();
    let sink = DiskMetricsSink::new(temp_dir.path());

    sink.commit(&session("one"), 10, deltas(&[(1, 1, 2, "1")]))
        .await
        .unwrap();

    assert_eq!(sink.watermark(&session("two")).await.unwrap(), None);
    assert_eq!(sink.snapshot(&session("two")).await.unwrap(), BTreeMap::new());
}

#[tokio::test]
async fn test_disk_session_survives_restart() {
    let temp_dir = TempDir::new().unwrap();
    let chain = Arc::new(SyntheticChain::evenly_spaced(1_000, 10).with_logs(vec![
        transfer_log(10, addr(1), addr(2), units(1)),
        transfer_log(900, addr(2), addr(3), units(2)),
    ]));
    let config = ScanConfigBuilder::new().initial_chunk_size(250).build();
    let request = || {
        ScanRequest::transfers(
            token(),
            NaiveDate::from_ymd_opt(1970, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(1970, 1, 1).unwrap(),
            session("restart"),
        )
    };

    let pipeline = ScanPipeline::new(
        chain.clone(),
        Arc::new(DiskCheckpoint::new(temp_dir.path())),
        Arc::new(DiskMetricsSink::new(temp_dir.path())),
        config.clone(),
        NamedChain::Mainnet,
    );
    let (reports, error) = drain(pipeline.run_scan(request(), StopSignal::never()).await.unwrap()).await;
    assert!(error.is_none());
    assert_eq!(reports.len(), 4);
    let finished = reports.last().unwrap().daily.clone();

    // new process, same data directory
    chain.clear_requests();
    let restarted = ScanPipeline::new(
        chain.clone(),
        Arc::new(DiskCheckpoint::new(temp_dir.path())),
        Arc::new(DiskMetricsSink::new(temp_dir.path())),
        config,
        NamedChain::Mainnet,
    );
    let (reports, error) =
        drain(restarted.run_scan(request(), StopSignal::never()).await.unwrap()).await;

    assert!(error.is_none());
    assert!(reports.is_empty());
    assert!(chain.log_requests().is_empty());
    assert!(chain.timestamp_requests().is_empty());
    assert_eq!(restarted.sink().snapshot(&session("restart")).await.unwrap(), finished);
}

#[tokio::test]
async fn test_zero_chunk_size_checkpoint_never_reaches_the_sink() {
    let temp_dir = TempDir::new().unwrap();
    let id = session("zero");
    let checkpoint = DiskCheckpoint::new(temp_dir.path());
    let path = checkpoint.path_for(&id);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(
        &path,
        r#"{"version":1,"session":"zero","progress":{"start_block":1,"end_block":5,"last_processed_block":null,"chunk_size":0}}"#,
    )
    .unwrap();

    assert!(matches!(
        checkpoint.load(&id).await,
        Err(StorageError::Corrupt { .. })
    ));

    let chain = Arc::new(SyntheticChain::new(vec![100, 200, 300, 400, 500]));
    let pipeline = ScanPipeline::new(
        chain.clone(),
        Arc::new(checkpoint),
        Arc::new(DiskMetricsSink::new(temp_dir.path())),
        ScanConfigBuilder::new().build(),
        NamedChain::Mainnet,
    );
    let request = || {
        ScanRequest::transfers(
            token(),
            NaiveDate::from_ymd_opt(1970, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(1970, 1, 1).unwrap(),
            id.clone(),
        )
    };

    // every attempt fails the same way and leaves the metrics untouched
    for _ in 0..2 {
        let result = pipeline.run_scan(request(), StopSignal::never()).await;
        assert!(matches!(
            result,
            Err(ScanError::Storage(StorageError::Corrupt { .. }))
        ));
    }
    assert!(chain.log_requests().is_empty());
    assert_eq!(pipeline.sink().watermark(&id).await.unwrap(), None);
    assert!(!pipeline.sink().path_for(&id).exists());
}
