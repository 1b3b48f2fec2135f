// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! HTTP provider construction
//!
//! The scanner talks to the node through the [`ChainClient`](crate::ChainClient)
//! trait. This module builds the concrete alloy provider behind the
//! [`AlloyChainClient`](crate::AlloyChainClient) implementation, with an
//! optional client-side rate limit.
//!
//! ```rust,ignore
//! use transferscan::provider::{create_http_provider, ProviderConfig};
//! use alloy_provider::Provider;
//!
//! let provider = create_http_provider(&ProviderConfig::public_endpoint(rpc_url))?;
//! let height = provider.get_block_number().await?;
//! ```

mod config;
mod factory;

pub use config::ProviderConfig;
pub use factory::create_http_provider;

/// Ethereum-typed HTTP provider; Fantom and other EVM chains share its block and log shapes
pub type HttpProvider = alloy_provider::RootProvider<alloy_network::Ethereum>;
