//! Configuration for transferscan operations
//!
//! This module controls how the scanner paces itself against a node: chunk
//! sizes, the pause between chunks, backoff after failures, timestamp lookup
//! retries and per-request timeouts.
//!
//! # Example: Using defaults
//!
//! ```rust
//! use transferscan::ScanConfig;
//!
//! // 1000-block chunks, floor of 100, 2s backoff base
//! let config = ScanConfig::default();
//! ```
//!
//! # Example: Custom configuration
//!
//! ```rust
//! use transferscan::ScanConfigBuilder;
//! use std::time::Duration;
//! use alloy_chains::NamedChain;
//!
//! let config = ScanConfigBuilder::with_defaults()
//!     .initial_chunk_size(5_000)
//!     .chain_pacing(NamedChain::Mainnet, Duration::from_millis(100))
//!     .build();
//! ```
//!
//! # Example: Tests and local nodes (no delays)
//!
//! ```rust
//! use transferscan::ScanConfig;
//!
//! let config = ScanConfig::minimal();
//! ```

use std::collections::HashMap;
use std::time::Duration;

use alloy_chains::NamedChain;

use crate::scan::{BackoffPolicy, ScanSettings};
use crate::types::config::ChunkSize;

pub mod constants;

use constants::{
    DEFAULT_BACKOFF_BASE, DEFAULT_BACKOFF_MAX, DEFAULT_PACING_DELAY, DEFAULT_REQUEST_TIMEOUT,
    DEFAULT_TIMESTAMP_RETRIES, DEFAULT_TIMESTAMP_RETRY_DELAY,
};

/// Configuration for a scan
///
/// Use [`ScanConfigBuilder`] for a fluent API to construct instances.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Chunk size a fresh scan starts with
    /// Default: 1000 blocks
    pub initial_chunk_size: ChunkSize,

    /// Halving below this aborts the scan
    /// Default: 100 blocks
    pub min_chunk_size: ChunkSize,

    /// Pause after every successful chunk
    /// Default: 500ms
    pub pacing_delay: Duration,

    /// Backoff between failed attempts of the same chunk
    pub backoff: BackoffPolicy,

    /// Attempts for a single block timestamp lookup
    pub timestamp_retries: u32,

    /// Fixed delay between timestamp lookup attempts
    pub timestamp_retry_delay: Duration,

    /// Timeout for every node request
    /// Default: 30 seconds
    pub request_timeout: Duration,

    /// Chain-specific overrides
    pub chain_overrides: HashMap<NamedChain, ChainConfig>,
}

/// Chain-specific configuration overrides
#[derive(Debug, Clone, Default)]
pub struct ChainConfig {
    /// Override the initial chunk size for this chain
    pub initial_chunk_size: Option<ChunkSize>,

    /// Override the pacing delay for this chain
    pub pacing_delay: Option<Duration>,

    /// Override the request timeout for this chain
    pub request_timeout: Option<Duration>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::with_common_defaults()
    }
}

impl ScanConfig {
    /// Create config with defaults suited to public RPC endpoints
    ///
    /// Every chain pauses 500ms between chunks unless an override says
    /// otherwise.
    ///
    /// # Example
    ///
    /// ```rust
    /// use transferscan::ScanConfig;
    /// use alloy_chains::NamedChain;
    /// use std::time::Duration;
    ///
    /// let config = ScanConfig::with_common_defaults();
    /// assert_eq!(
    ///     config.get_pacing_delay(NamedChain::Mainnet),
    ///     Duration::from_millis(500)
    /// );
    /// ```
    pub fn with_common_defaults() -> Self {
        Self {
            initial_chunk_size: ChunkSize::DEFAULT,
            min_chunk_size: ChunkSize::MIN_FLOOR,
            pacing_delay: DEFAULT_PACING_DELAY,
            backoff: BackoffPolicy::new(DEFAULT_BACKOFF_BASE, DEFAULT_BACKOFF_MAX),
            timestamp_retries: DEFAULT_TIMESTAMP_RETRIES,
            timestamp_retry_delay: DEFAULT_TIMESTAMP_RETRY_DELAY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            chain_overrides: HashMap::new(),
        }
    }

    /// Create minimal config with no delays
    ///
    /// Meant for tests and local nodes. Backoff and timestamp retries still
    /// happen, they just don't sleep.
    pub fn minimal() -> Self {
        Self {
            initial_chunk_size: ChunkSize::DEFAULT,
            min_chunk_size: ChunkSize::MIN_FLOOR,
            pacing_delay: Duration::ZERO,
            backoff: BackoffPolicy::new(Duration::ZERO, Duration::ZERO),
            timestamp_retries: DEFAULT_TIMESTAMP_RETRIES,
            timestamp_retry_delay: Duration::ZERO,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            chain_overrides: HashMap::new(),
        }
    }

    /// Effective initial chunk size for a chain
    pub fn get_initial_chunk_size(&self, chain: NamedChain) -> ChunkSize {
        self.chain_overrides
            .get(&chain)
            .and_then(|c| c.initial_chunk_size)
            .unwrap_or(self.initial_chunk_size)
    }

    /// Effective pacing delay for a chain
    pub fn get_pacing_delay(&self, chain: NamedChain) -> Duration {
        self.chain_overrides
            .get(&chain)
            .and_then(|c| c.pacing_delay)
            .unwrap_or(self.pacing_delay)
    }

    /// Effective request timeout for a chain
    pub fn get_request_timeout(&self, chain: NamedChain) -> Duration {
        self.chain_overrides
            .get(&chain)
            .and_then(|c| c.request_timeout)
            .unwrap_or(self.request_timeout)
    }

    /// Set chain-specific override
    pub fn set_chain_override(&mut self, chain: NamedChain, config: ChainConfig) {
        self.chain_overrides.insert(chain, config);
    }

    /// Resolve the scanner settings for one chain
    ///
    /// # Example
    ///
    /// ```rust
    /// use transferscan::ScanConfig;
    /// use alloy_chains::NamedChain;
    ///
    /// let settings = ScanConfig::default().settings_for(NamedChain::Fantom);
    /// assert_eq!(settings.min_chunk_size.as_u32(), 100);
    /// ```
    pub fn settings_for(&self, chain: NamedChain) -> ScanSettings {
        ScanSettings {
            min_chunk_size: self.min_chunk_size,
            pacing_delay: self.get_pacing_delay(chain),
            backoff: self.backoff,
            timestamp_retries: self.timestamp_retries,
            timestamp_retry_delay: self.timestamp_retry_delay,
            decimals: crate::types::amount::DEFAULT_TOKEN_DECIMALS,
        }
    }
}

/// Builder for [`ScanConfig`]
///
/// # Example
///
/// ```rust
/// use transferscan::ScanConfigBuilder;
/// use alloy_chains::NamedChain;
/// use std::time::Duration;
///
/// let config = ScanConfigBuilder::new()
///     .initial_chunk_size(2_000)
///     .min_chunk_size(50)
///     .pacing_delay(Duration::from_millis(250))
///     .chain_timeout(NamedChain::Fantom, Duration::from_secs(60))
///     .build();
/// ```
pub struct ScanConfigBuilder {
    config: ScanConfig,
}

impl Default for ScanConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanConfigBuilder {
    /// Create a new builder with minimal defaults
    pub fn new() -> Self {
        Self {
            config: ScanConfig::minimal(),
        }
    }

    /// Start with common defaults
    pub fn with_defaults() -> Self {
        Self {
            config: ScanConfig::with_common_defaults(),
        }
    }

    pub fn initial_chunk_size(mut self, blocks: u32) -> Self {
        self.config.initial_chunk_size = ChunkSize::new(blocks);
        self
    }

    pub fn min_chunk_size(mut self, blocks: u32) -> Self {
        self.config.min_chunk_size = ChunkSize::new(blocks);
        self
    }

    pub fn pacing_delay(mut self, delay: Duration) -> Self {
        self.config.pacing_delay = delay;
        self
    }

    pub fn backoff(mut self, base: Duration, max: Duration) -> Self {
        self.config.backoff = BackoffPolicy::new(base, max);
        self
    }

    /// Set timestamp lookup attempts and the delay between them
    pub fn timestamp_retries(mut self, attempts: u32, delay: Duration) -> Self {
        self.config.timestamp_retries = attempts.max(1);
        self.config.timestamp_retry_delay = delay;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Add chain-specific configuration
    pub fn chain_config(mut self, chain: NamedChain, config: ChainConfig) -> Self {
        self.config.set_chain_override(chain, config);
        self
    }

    /// Convenience: set pacing delay for a specific chain
    pub fn chain_pacing(mut self, chain: NamedChain, delay: Duration) -> Self {
        let mut chain_config = self.config.chain_overrides.remove(&chain).unwrap_or_default();
        chain_config.pacing_delay = Some(delay);
        self.config.set_chain_override(chain, chain_config);
        self
    }

    /// Convenience: set initial chunk size for a specific chain
    pub fn chain_chunk_size(mut self, chain: NamedChain, blocks: u32) -> Self {
        let mut chain_config = self.config.chain_overrides.remove(&chain).unwrap_or_default();
        chain_config.initial_chunk_size = Some(ChunkSize::new(blocks));
        self.config.set_chain_override(chain, chain_config);
        self
    }

    /// Convenience: set request timeout for a specific chain
    pub fn chain_timeout(mut self, chain: NamedChain, timeout: Duration) -> Self {
        let mut chain_config = self.config.chain_overrides.remove(&chain).unwrap_or_default();
        chain_config.request_timeout = Some(timeout);
        self.config.set_chain_override(chain, chain_config);
        self
    }

    pub fn build(self) -> ScanConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ScanConfig::default();

        assert_eq!(
            config.get_pacing_delay(NamedChain::Fantom),
            Duration::from_millis(500)
        );
        assert_eq!(
            config.get_pacing_delay(NamedChain::Mainnet),
            Duration::from_millis(500)
        );
        assert_eq!(
            config.get_initial_chunk_size(NamedChain::Fantom),
            ChunkSize::new(1000)
        );
        assert_eq!(config.min_chunk_size, ChunkSize::new(100));
        assert_eq!(config.backoff.base(), Duration::from_secs(2));
    }

    #[test]
    fn test_minimal_config_has_no_sleeps() {
        let config = ScanConfig::minimal();
        let settings = config.settings_for(NamedChain::Fantom);

        assert_eq!(settings.pacing_delay, Duration::ZERO);
        assert_eq!(settings.timestamp_retry_delay, Duration::ZERO);
        assert_eq!(settings.backoff.delay_for(5, false), Duration::ZERO);
    }

    #[test]
    fn test_chain_override_falls_back_to_global() {
        let config = ScanConfigBuilder::new()
            .pacing_delay(Duration::from_millis(750))
            .chain_chunk_size(NamedChain::Mainnet, 2_000)
            .build();

        assert_eq!(
            config.get_initial_chunk_size(NamedChain::Mainnet),
            ChunkSize::new(2_000)
        );
        // Mainnet override sets no pacing, so the global value applies
        assert_eq!(
            config.get_pacing_delay(NamedChain::Mainnet),
            Duration::from_millis(750)
        );
        assert_eq!(
            config.get_initial_chunk_size(NamedChain::Fantom),
            ChunkSize::DEFAULT
        );
    }

    #[test]
    fn test_chain_helpers_preserve_existing() {
        let config = ScanConfigBuilder::new()
            .chain_chunk_size(NamedChain::Fantom, 500)
            .chain_pacing(NamedChain::Fantom, Duration::from_millis(100))
            .chain_timeout(NamedChain::Fantom, Duration::from_secs(5))
            .build();

        assert_eq!(
            config.get_initial_chunk_size(NamedChain::Fantom),
            ChunkSize::new(500)
        );
        assert_eq!(
            config.get_pacing_delay(NamedChain::Fantom),
            Duration::from_millis(100)
        );
        assert_eq!(
            config.get_request_timeout(NamedChain::Fantom),
            Duration::from_secs(5)
        );
    }

    #[test]
    fn test_timestamp_retries_never_zero() {
        let config = ScanConfigBuilder::new()
            .timestamp_retries(0, Duration::ZERO)
            .build();
        assert_eq!(config.timestamp_retries, 1);
    }
}
