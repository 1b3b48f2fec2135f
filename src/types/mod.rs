// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Strong types for type safety across transferscan.
//!
//! This module provides newtype wrappers for various domain concepts:
//! - Exact token amounts
//! - Configuration values (chunk sizes)
//! - Unix timestamps and their UTC calendar days

pub mod amount;
pub mod config;
pub mod time;

// Note: Public types are re-exported from lib.rs, not here
