// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Provider configuration options

use std::time::Duration;

/// Configuration for creating the HTTP provider
///
/// Request timeouts are applied per call by
/// [`AlloyChainClient`](crate::chain::AlloyChainClient), not here.
///
/// # Example
///
/// ```rust
/// use transferscan::provider::ProviderConfig;
/// use std::time::Duration;
///
/// let config = ProviderConfig::new("https://rpcapi.fantom.network")
///     .with_min_delay(Duration::from_millis(200));
/// assert!(config.has_rate_limiting());
/// ```
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// RPC endpoint URL
    pub url: String,
    /// Requests per second sent to the endpoint (None for unlimited)
    pub rate_limit_per_second: Option<u32>,
    /// Minimum gap between consecutive requests, used when no per-second rate is set
    pub min_delay: Option<Duration>,
}

impl ProviderConfig {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            rate_limit_per_second: None,
            min_delay: None,
        }
    }

    #[must_use]
    pub fn with_rate_limit(mut self, requests_per_second: u32) -> Self {
        self.rate_limit_per_second = Some(requests_per_second);
        self
    }

    #[must_use]
    pub fn with_rate_limit_opt(mut self, requests_per_second: Option<u32>) -> Self {
        self.rate_limit_per_second = requests_per_second;
        self
    }

    #[must_use]
    pub fn with_min_delay(mut self, delay: Duration) -> Self {
        self.min_delay = Some(delay);
        self
    }

    #[must_use]
    pub fn has_rate_limiting(&self) -> bool {
        self.rate_limit_per_second.is_some() || self.min_delay.is_some()
    }

    /// Preset for public endpoints: 5 requests per second
    #[must_use]
    pub fn public_endpoint(url: impl Into<String>) -> Self {
        Self::new(url).with_rate_limit(5)
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::new("http://localhost:8545")
    }
}
