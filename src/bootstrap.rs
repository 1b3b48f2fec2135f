//! Entry point for the `transferscan` binary.
//!
//! Reads its configuration from the environment (a `.env` file is honored),
//! scans one session to completion or until Ctrl-C, and logs a summary.

use std::path::PathBuf;
use std::sync::Arc;

use alloy_chains::NamedChain;
use alloy_primitives::Address;
use chrono::{Days, NaiveDate, Utc};
use dotenvy::dotenv;
use futures::StreamExt;
use tracing::{info, warn};

use crate::chain::{AlloyChainClient, ChainClient};
use crate::config::constants::{tokens, DEFAULT_CHAIN, DEFAULT_LOOKBACK_DAYS};
use crate::config::ScanConfig;
use crate::errors::{ConfigError, StorageError};
use crate::provider::{create_http_provider, ProviderConfig};
use crate::scan::{ScanPipeline, ScanRequest, ScanSummary, StopHandle};
use crate::storage::{DiskCheckpoint, DiskMetricsSink, MetricsSink, ProgressCheckpoint, SessionId};
use crate::types::config::ChunkSize;

const DEFAULT_DATA_DIR: &str = "./transferscan_data";

/// Settings read from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvConfig {
    pub rpc_url: String,
    pub chain: NamedChain,
    pub token: Address,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub chunk_size: Option<ChunkSize>,
    pub session: SessionId,
    pub data_dir: PathBuf,
    pub rate_limit_per_second: Option<u32>,
}

impl EnvConfig {
    /// Reads the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| dotenvy::var(key).ok())
    }

    /// Builds the configuration from any key lookup
    ///
    /// Without `START_DATE`, the range covers `LOOKBACK_DAYS` days up to
    /// `END_DATE` (today by default). Without `SESSION_ID`, a timestamped
    /// session is started.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let rpc_url = var("RPC_URL").ok_or_else(|| ConfigError::missing("RPC_URL"))?;

        let chain = match var("CHAIN_ID") {
            Some(raw) => {
                let id: u64 = parse("CHAIN_ID", &raw)?;
                NamedChain::try_from(id)
                    .map_err(|_| ConfigError::invalid_value("CHAIN_ID", format!("unknown chain {id}")))?
            }
            None => DEFAULT_CHAIN,
        };

        let token = match var("TOKEN_ADDRESS") {
            Some(raw) => parse("TOKEN_ADDRESS", &raw)?,
            None => tokens::FANTOM_WIGO,
        };

        let end_date = match var("END_DATE") {
            Some(raw) => parse("END_DATE", &raw)?,
            None => Utc::now().date_naive(),
        };
        let start_date = match var("START_DATE") {
            Some(raw) => parse("START_DATE", &raw)?,
            None => {
                let lookback = match var("LOOKBACK_DAYS") {
                    Some(raw) => parse("LOOKBACK_DAYS", &raw)?,
                    None => DEFAULT_LOOKBACK_DAYS,
                };
                end_date
                    .checked_sub_days(Days::new(u64::from(lookback)))
                    .ok_or_else(|| {
                        ConfigError::invalid_value("LOOKBACK_DAYS", format!("{lookback} days before {end_date}"))
                    })?
            }
        };

        let chunk_size = var("CHUNK_SIZE")
            .map(|raw| parse::<u32>("CHUNK_SIZE", &raw))
            .transpose()?
            .map(ChunkSize::new);

        let session = match var("SESSION_ID") {
            Some(raw) => SessionId::new(raw)?,
            None => SessionId::timestamped(Utc::now()),
        };

        let data_dir = var("DATA_DIR").map_or_else(|| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from);

        let rate_limit_per_second = var("RPC_RATE_LIMIT")
            .map(|raw| parse::<u32>("RPC_RATE_LIMIT", &raw))
            .transpose()?
            .filter(|rps| *rps > 0);

        Ok(Self {
            rpc_url,
            chain,
            token,
            start_date,
            end_date,
            chunk_size,
            session,
            data_dir,
            rate_limit_per_second,
        })
    }
}

fn parse<T>(field: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| ConfigError::invalid_value(field, format!("{raw:?}: {e}")))
}

/// Main entry point for the application.
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();

    let env = EnvConfig::from_env()?;
    let config = ScanConfig::with_common_defaults();

    let provider = create_http_provider(
        &ProviderConfig::new(env.rpc_url.clone()).with_rate_limit_opt(env.rate_limit_per_second),
    )?;
    let client = Arc::new(
        AlloyChainClient::new(provider).with_request_timeout(config.get_request_timeout(env.chain)),
    );

    let height = client.current_block_height().await?;
    info!(chain = %env.chain, height, "Connected to node");

    let (stop_handle, stop) = StopHandle::new();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Ctrl-C received, stopping after the current chunk");
            stop_handle.stop();
        }
    });

    let checkpoint = Arc::new(DiskCheckpoint::new(&env.data_dir));
    let sink = Arc::new(DiskMetricsSink::new(&env.data_dir));
    let pipeline = ScanPipeline::new(
        client,
        checkpoint.clone(),
        sink.clone(),
        config,
        env.chain,
    );

    let mut request =
        ScanRequest::transfers(env.token, env.start_date, env.end_date, env.session.clone());
    if let Some(chunk_size) = env.chunk_size {
        request = request.with_chunk_size(chunk_size);
    }

    info!(
        session = %env.session,
        token = %env.token,
        start_date = %env.start_date,
        end_date = %env.end_date,
        data_dir = %env.data_dir.display(),
        "Starting transfer scan"
    );

    let reports = pipeline.run_scan(request, stop).await?;
    let mut reports = std::pin::pin!(reports);
    let mut skipped_logs = 0;

    while let Some(report) = reports.next().await {
        let report = report?;
        info!(
            chunk = %report.chunk,
            coverage = %report.progress.coverage(),
            days = report.daily.len(),
            skipped_logs = report.total_skipped_logs,
            "Chunk done"
        );
        skipped_logs = report.total_skipped_logs;
    }

    if session_complete(&*checkpoint, &env.session).await? {
        info!(session = %env.session, "Scan complete");
    }

    let daily = sink.snapshot(&env.session).await?;
    log_summary(&ScanSummary::from_daily(&daily).with_skipped_logs(skipped_logs));
    Ok(())
}

/// Whether the saved checkpoint covers the whole range; warns when it does not
async fn session_complete<K: ProgressCheckpoint>(
    checkpoint: &K,
    session: &SessionId,
) -> Result<bool, StorageError> {
    match checkpoint.load(session).await? {
        Some(progress) if progress.is_complete() => Ok(true),
        Some(progress) => {
            warn!(
                session = %session,
                coverage = %progress.coverage(),
                resume_block = progress.resume_block(),
                "Scan stopped early"
            );
            Ok(false)
        }
        None => {
            warn!(session = %session, "No saved progress for session");
            Ok(false)
        }
    }
}

fn log_summary(summary: &ScanSummary) {
    info!(
        days = summary.days,
        total_transactions = summary.total_transactions,
        average_daily_active_addresses = format!("{:.2}", summary.average_daily_active_addresses),
        total_volume = %summary.total_volume,
        average_daily_senders = format!("{:.2}", summary.average_daily_senders),
        average_daily_receivers = format!("{:.2}", summary.average_daily_receivers),
        skipped_logs = summary.skipped_logs,
        "Scan summary"
    );
}
