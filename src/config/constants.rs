//! Well-known addresses and scan defaults
//!
//! The defaults target the WIGO token on Fantom, which is the collector's
//! out-of-the-box scan when no `TOKEN_ADDRESS`/`CHAIN_ID` are configured.

use std::time::Duration;

use alloy_chains::NamedChain;
use alloy_primitives::{address, Address};

/// Well-known token contracts
pub mod tokens {
    use super::*;

    /// WIGO (WigoSwap) on Fantom Opera
    ///
    /// Contract: 0xE992bEAb6659BFF447893641A378FbbF031C5bD6
    pub const FANTOM_WIGO: Address = address!("e992beab6659bff447893641a378fbbf031c5bd6");
}

/// Chain scanned when none is configured
pub const DEFAULT_CHAIN: NamedChain = NamedChain::Fantom;

/// Days scanned back from today when no explicit dates are configured
pub const DEFAULT_LOOKBACK_DAYS: u32 = 180;

/// Pause between successful chunks
pub const DEFAULT_PACING_DELAY: Duration = Duration::from_millis(500);

/// Base delay of the exponential backoff between failed chunk attempts
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_secs(2);

/// Upper bound of a single backoff sleep
pub const DEFAULT_BACKOFF_MAX: Duration = Duration::from_secs(60);

/// Attempts made for a single block timestamp lookup while decoding
pub const DEFAULT_TIMESTAMP_RETRIES: u32 = 3;

/// Fixed delay between block timestamp lookup attempts
pub const DEFAULT_TIMESTAMP_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Per-request timeout applied to every node call
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
