//! Core types and constants for the Kestrel network.
//!
//! Network constants, CryptoNote Base58, address encoding/decoding, payment
//! IDs, amount formatting, and the fork-height mixin table shared by the
//! RPC and wallet crates.

pub mod address;
pub mod amount;
pub mod base58;
pub mod constants;
pub mod payment_id;

pub use address::{AddressError, ParsedAddress};
pub use amount::{format_amount, parse_amount, split_into_denominations};
pub use constants::{AddressType, MixinLimit, MixinLimits, Network};
pub use payment_id::PaymentId;
