// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! ERC-20 Transfer event definition and decoding.

pub mod decoder;
pub mod definitions;

pub use decoder::{EventDecoder, TransferEvent};
pub use definitions::Transfer;
