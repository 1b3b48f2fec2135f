// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Exact, human-scale token amounts
//!
//! Token transfers carry an integer quantity of base units. Dividing by
//! `10^decimals` with floating point silently loses precision once supplies
//! grow past 2^53 base units, which every 18-decimal token does. This module
//! keeps the division exact by building a [`BigDecimal`] directly from the
//! base-unit digits and a scale.

use std::fmt;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

use alloy_primitives::U256;
use bigdecimal::num_bigint::{BigInt, Sign};
use bigdecimal::{BigDecimal, ParseBigDecimalError, Zero};
use serde::{Deserialize, Serialize};

/// Decimals used by the tokens this crate was built for (and by most ERC-20s)
pub const DEFAULT_TOKEN_DECIMALS: u8 = 18;

/// Non-negative token amount in human-scale units (base units / 10^decimals)
///
/// # Examples
///
/// ```
/// use alloy_primitives::U256;
/// use transferscan::TokenAmount;
///
/// let one = TokenAmount::from_base_units(U256::from(10u128.pow(18)), 18);
/// assert_eq!(one.to_string(), "1");
///
/// let half = TokenAmount::from_base_units(U256::from(5u64), 1);
/// assert_eq!(half.to_string(), "0.5");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenAmount(BigDecimal);

impl TokenAmount {
    /// Zero tokens
    pub fn zero() -> Self {
        Self(BigDecimal::zero())
    }

    /// Scales an integer base-unit quantity down by `10^decimals` without rounding
    pub fn from_base_units(value: U256, decimals: u8) -> Self {
        let digits = BigInt::from_bytes_be(Sign::Plus, &value.to_be_bytes::<32>());
        Self(BigDecimal::new(digits, i64::from(decimals)))
    }

    /// Returns the underlying decimal
    pub fn as_decimal(&self) -> &BigDecimal {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl Default for TokenAmount {
    fn default() -> Self {
        Self::zero()
    }
}

impl FromStr for TokenAmount {
    type Err = ParseBigDecimalError;

    /// Parses a human-scale amount such as `"1.5"`; negative inputs clamp to zero
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = BigDecimal::from_str(s)?;
        if value < BigDecimal::zero() {
            return Ok(Self::zero());
        }
        Ok(Self(value))
    }
}

impl Add for TokenAmount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign<&TokenAmount> for TokenAmount {
    fn add_assign(&mut self, rhs: &TokenAmount) {
        self.0 += &rhs.0;
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Plain notation: BigDecimal's Display switches to exponents for long runs of zeros
        write!(f, "{}", self.0.normalized().to_plain_string())
    }
}
