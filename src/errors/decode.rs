// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for Transfer log decoding.
//!
//! A decode failure only ever affects the single log it came from: the
//! scanner logs it, counts it, and moves on.

/// Reasons a raw log could not be turned into a transfer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The log does not carry exactly signature, sender and receiver topics.
    #[error("Expected 3 topics, found {found}")]
    TopicCount {
        /// Number of topics actually present
        found: usize,
    },

    /// Topic 0 is not the Transfer event signature.
    #[error("Unexpected event signature {found}")]
    UnexpectedSignature {
        /// The topic 0 value found on the log
        found: String,
    },

    /// The data payload is not a single 32-byte word.
    #[error("Expected a 32-byte amount payload, found {len} bytes")]
    PayloadLength {
        /// Length of the payload in bytes
        len: usize,
    },

    /// The log has no block number (pending or malformed node response).
    #[error("Log is missing its block number")]
    MissingBlockNumber,

    /// The node returned a log from outside the requested block window.
    #[error("Log from block {block} is outside the requested range {from_block}..={to_block}")]
    OutsideRange {
        /// Block the log claims to come from
        block: u64,
        /// First block requested
        from_block: u64,
        /// Last block requested
        to_block: u64,
    },

    /// ABI decoding rejected the log.
    #[error("Failed to decode Transfer event: {details}")]
    Abi {
        /// Decoder message
        details: String,
    },
}

impl DecodeError {
    /// Create an `Abi` error with details.
    pub fn abi(details: impl Into<String>) -> Self {
        DecodeError::Abi {
            details: details.into(),
        }
    }
}
