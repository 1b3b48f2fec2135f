//! ERC-20 event definitions
//!
//! The `sol!` macro generates `SIGNATURE` and `SIGNATURE_HASH` constants, so
//! filters never hash the signature string at runtime:
//!
//! ```rust
//! use transferscan::Transfer;
//! use alloy_sol_types::SolEvent;
//!
//! assert_eq!(Transfer::SIGNATURE, "Transfer(address,address,uint256)");
//! ```

use alloy_sol_types::sol;

sol! {
    /// ERC-20 Transfer event
    ///
    /// Mints have `from = 0x0` and burns have `to = 0x0`; both are counted
    /// like any other transfer.
    event Transfer(address indexed from, address indexed to, uint256 value);
}

impl std::fmt::Debug for Transfer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Transfer({} -> {}, {})", self.from, self.to, self.value)
    }
}
