// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Provider factory for the HTTP node client

use alloy_provider::ProviderBuilder;
use alloy_rpc_client::{ClientBuilder, RpcClient};

use crate::errors::ConfigError;
use crate::transport::RateLimitLayer;

use super::config::ProviderConfig;
use super::HttpProvider;

/// Create an HTTP provider with the given configuration
///
/// Recommended fillers are disabled: the scanner only reads, so a bare
/// [`alloy_provider::RootProvider`] is all it needs.
///
/// # Examples
///
/// ```rust,ignore
/// use transferscan::provider::{create_http_provider, ProviderConfig};
///
/// let provider = create_http_provider(
///     &ProviderConfig::new("https://rpcapi.fantom.network").with_rate_limit(5)
/// )?;
/// ```
///
/// # Errors
///
/// Returns [`ConfigError::ProviderUrlInvalid`] if the URL cannot be parsed.
pub fn create_http_provider(config: &ProviderConfig) -> Result<HttpProvider, ConfigError> {
    let url: url::Url = config
        .url
        .parse()
        .map_err(|e| ConfigError::ProviderUrlInvalid(format!("{}: {e}", config.url)))?;

    let client = build_client(config, url);

    Ok(ProviderBuilder::new()
        .disable_recommended_fillers()
        .connect_client(client))
}

fn build_client(config: &ProviderConfig, url: url::Url) -> RpcClient {
    match (config.rate_limit_per_second, config.min_delay) {
        (Some(rps), min_delay) => {
            if min_delay.is_some() {
                tracing::warn!(
                    "Both rate_limit_per_second and min_delay specified, using rate_limit_per_second"
                );
            }
            ClientBuilder::default()
                .layer(RateLimitLayer::per_second(rps))
                .http(url)
        }
        (None, Some(delay)) => ClientBuilder::default()
            .layer(RateLimitLayer::with_min_delay(delay))
            .http(url),
        (None, None) => ClientBuilder::default().http(url),
    }
}
