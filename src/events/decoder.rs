// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Raw log to transfer decoding.

use alloy_primitives::Address;
use alloy_sol_types::SolEvent;

use super::definitions::Transfer;
use crate::chain::RawLog;
use crate::errors::DecodeError;
use crate::types::amount::{TokenAmount, DEFAULT_TOKEN_DECIMALS};

/// A decoded ERC-20 transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferEvent {
    pub from: Address,
    pub to: Address,
    pub amount: TokenAmount,
}

/// Decodes Transfer logs into [`TransferEvent`]s with exact decimal amounts.
///
/// Decoding is strict: a log must carry exactly the signature, sender and
/// receiver topics, and a single 32-byte amount word. Anything else is a
/// [`DecodeError`], never a panic.
///
/// # Example
///
/// ```rust
/// use alloy_primitives::{Address, Bytes, U256};
/// use alloy_sol_types::SolEvent;
/// use transferscan::{EventDecoder, RawLog, Transfer};
///
/// let from = Address::repeat_byte(0xaa);
/// let to = Address::repeat_byte(0xbb);
/// let log = RawLog::new(
///     1,
///     vec![Transfer::SIGNATURE_HASH, from.into_word(), to.into_word()],
///     Bytes::from(U256::from(1_500_000_000_000_000_000u128).to_be_bytes::<32>().to_vec()),
/// );
///
/// let event = EventDecoder::new().decode(&log).unwrap();
/// assert_eq!(event.from, from);
/// assert_eq!(event.amount.to_string(), "1.5");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct EventDecoder {
    decimals: u8,
}

impl Default for EventDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl EventDecoder {
    /// Decoder for tokens with 18 decimals
    pub fn new() -> Self {
        Self::with_decimals(DEFAULT_TOKEN_DECIMALS)
    }

    pub fn with_decimals(decimals: u8) -> Self {
        Self { decimals }
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn decode(&self, log: &RawLog) -> Result<TransferEvent, DecodeError> {
        if log.topics.len() != 3 {
            return Err(DecodeError::TopicCount {
                found: log.topics.len(),
            });
        }
        if log.topics[0] != Transfer::SIGNATURE_HASH {
            return Err(DecodeError::UnexpectedSignature {
                found: log.topics[0].to_string(),
            });
        }
        if log.data.len() != 32 {
            return Err(DecodeError::PayloadLength {
                len: log.data.len(),
            });
        }

        let transfer = Transfer::decode_raw_log(log.topics.iter().copied(), &log.data)
            .map_err(|e| DecodeError::abi(e.to_string()))?;

        Ok(TransferEvent {
            from: transfer.from,
            to: transfer.to,
            amount: TokenAmount::from_base_units(transfer.value, self.decimals),
        })
    }
}
