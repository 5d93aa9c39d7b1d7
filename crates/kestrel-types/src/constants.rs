//! Kestrel network constants, address prefixes, and protocol limits.

use serde::{Deserialize, Serialize};

// =============================================================================
// Network Types
// =============================================================================

/// Network type identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
}

/// Address type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressType {
    Standard,
    /// Standard address with an embedded payment ID.
    Integrated,
}

// =============================================================================
// Address Prefixes
// =============================================================================

/// Address prefix entry: the varint tag and what it identifies.
#[derive(Debug, Clone, Copy)]
pub struct PrefixInfo {
    pub prefix: u64,
    pub network: Network,
    pub address_type: AddressType,
}

/// All address prefixes (2 networks × 2 types).
pub static ALL_PREFIXES: [PrefixInfo; 4] = [
    PrefixInfo { prefix: 0x1c9b12, network: Network::Mainnet, address_type: AddressType::Standard },
    PrefixInfo { prefix: 0x2a9b12, network: Network::Mainnet, address_type: AddressType::Integrated },
    PrefixInfo { prefix: 0x3d9b12, network: Network::Testnet, address_type: AddressType::Standard },
    PrefixInfo { prefix: 0x4e9b12, network: Network::Testnet, address_type: AddressType::Integrated },
];

/// Look up prefix info by varint prefix value.
pub fn prefix_info(prefix: u64) -> Option<&'static PrefixInfo> {
    ALL_PREFIXES.iter().find(|p| p.prefix == prefix)
}

/// Get the prefix value for a network/type combination.
pub fn get_prefix(network: Network, addr_type: AddressType) -> u64 {
    ALL_PREFIXES
        .iter()
        .find(|p| p.network == network && p.address_type == addr_type)
        .map(|p| p.prefix)
        // The table covers every combination.
        .unwrap_or(ALL_PREFIXES[0].prefix)
}

// =============================================================================
// Key and Data Sizes
// =============================================================================

/// Size of a public/private key in bytes.
pub const KEY_SIZE: usize = 32;

/// Size of the address checksum in bytes.
pub const CHECKSUM_SIZE: usize = 4;

/// Size of a payment ID in bytes (rendered as 64 hex characters).
pub const PAYMENT_ID_SIZE: usize = 32;

/// Address payload size (without prefix and checksum).
pub fn address_data_size(addr_type: AddressType) -> usize {
    match addr_type {
        AddressType::Standard   => KEY_SIZE * 2,                   // 64 bytes
        AddressType::Integrated => KEY_SIZE * 2 + PAYMENT_ID_SIZE, // 96 bytes
    }
}

// =============================================================================
// Amounts and Fees
// =============================================================================

/// Number of decimal places in a human-readable amount.
pub const COIN_DECIMALS: u32 = 2;

/// Atomic units per whole coin.
pub const ATOMIC_UNITS_PER_COIN: u64 = 10u64.pow(COIN_DECIMALS);

/// Ticker used when printing amounts.
pub const TICKER: &str = "KST";

/// Smallest network fee a transaction may pay (atomic units).
pub const MINIMUM_FEE: u64 = 10;

/// Fee used when the caller does not pick one.
pub const DEFAULT_FEE: u64 = MINIMUM_FEE;

/// Largest serialized transaction the network accepts (bytes).
pub const MAX_TRANSACTION_SIZE: usize = 100_000;

/// Target seconds between blocks.
pub const DIFFICULTY_TARGET: u64 = 30;

/// Confirmations before a mined output with no unlock time can be spent.
pub const SPENDABLE_AGE: u64 = 10;

/// Unlock times below this are block heights, at or above it Unix timestamps.
pub const MAX_BLOCK_NUMBER: u64 = 500_000_000;

// =============================================================================
// Mixin Limits
// =============================================================================

/// Permitted mixin range from an activation height onwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixinLimit {
    /// First height at which this range applies.
    pub height: u64,
    pub min: u64,
    pub max: u64,
    /// Mixin used when the caller does not specify one.
    pub default: u64,
}

/// Mixin ranges indexed by fork height.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<MixinLimit>", into = "Vec<MixinLimit>")]
pub struct MixinLimits {
    limits: Vec<MixinLimit>,
}

impl From<Vec<MixinLimit>> for MixinLimits {
    fn from(limits: Vec<MixinLimit>) -> Self {
        Self::new(limits)
    }
}

impl From<MixinLimits> for Vec<MixinLimit> {
    fn from(table: MixinLimits) -> Self {
        table.limits
    }
}

impl MixinLimits {
    /// Build a table; entries are sorted by activation height.
    pub fn new(mut limits: Vec<MixinLimit>) -> Self {
        limits.sort_by_key(|l| l.height);
        Self { limits }
    }

    /// The range in force at `height`.
    ///
    /// Heights below the first activation height fall back to the first entry.
    pub fn for_height(&self, height: u64) -> MixinLimit {
        self.limits
            .iter()
            .rev()
            .find(|l| l.height <= height)
            .or_else(|| self.limits.first())
            .copied()
            .unwrap_or(MixinLimit { height: 0, min: 0, max: u64::MAX, default: 0 })
    }

    /// Default mixin at `height`.
    pub fn default_mixin(&self, height: u64) -> u64 {
        self.for_height(height).default
    }
}

impl Default for MixinLimits {
    fn default() -> Self {
        Self::new(vec![
            MixinLimit { height: 0, min: 0, max: 100, default: 3 },
            MixinLimit { height: 620_000, min: 7, max: 7, default: 7 },
            MixinLimit { height: 800_000, min: 1, max: 3, default: 3 },
        ])
    }
}
