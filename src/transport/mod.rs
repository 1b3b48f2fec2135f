// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Transport middleware for the node client.
//!
//! Only client-side rate limiting lives here. Failed requests are not
//! retried at this level: the scanner reacts to failures by shrinking its
//! chunk and backing off, and a transport retry would hide the failure
//! from it.
//!
//! ```rust,ignore
//! use transferscan::transport::RateLimitLayer;
//! use alloy_rpc_client::ClientBuilder;
//! use alloy_provider::ProviderBuilder;
//!
//! let client = ClientBuilder::default()
//!     .layer(RateLimitLayer::per_second(10))
//!     .http(rpc_url);
//!
//! let provider = ProviderBuilder::new()
//!     .disable_recommended_fillers()
//!     .connect_client(client);
//! ```

mod rate_limit;

pub use rate_limit::{RateLimitLayer, RateLimitService};
