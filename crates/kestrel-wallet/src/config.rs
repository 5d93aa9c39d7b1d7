//! Send engine configuration.

use kestrel_types::constants::{DEFAULT_FEE, MAX_TRANSACTION_SIZE, MINIMUM_FEE};
use kestrel_types::MixinLimits;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How decoys are requested from the ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecoyPolicy {
    /// Request exactly `mixin` outputs per amount. The ledger guarantees none
    /// of them belong to the caller.
    #[default]
    Exact,
    /// Request `mixin + 1` per amount and drop the input's own output from
    /// its ring. For ledgers that may hand back the caller's outputs.
    OverRequestAndFilter,
}

impl DecoyPolicy {
    /// Outputs to request (and require) per amount.
    pub fn request_count(self, mixin: u64) -> u64 {
        match self {
            DecoyPolicy::Exact => mixin,
            DecoyPolicy::OverRequestAndFilter => mixin.saturating_add(1),
        }
    }
}

/// Configuration for [`TransactionSender`](crate::send::TransactionSender).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SendConfig {
    /// Fees below this are rejected during validation.
    pub minimum_fee: u64,
    /// Fee used when the caller does not set one.
    pub default_fee: u64,
    pub decoy_policy: DecoyPolicy,
    /// Upper bound on each decoy fetch and relay. Whole seconds in JSON.
    #[serde(with = "duration_secs")]
    pub network_timeout: Duration,
    /// Serialized transactions above this size are not relayed.
    pub max_transaction_size: usize,
    pub mixin_limits: MixinLimits,
}

impl Default for SendConfig {
    fn default() -> Self {
        Self {
            minimum_fee: MINIMUM_FEE,
            default_fee: DEFAULT_FEE,
            decoy_policy: DecoyPolicy::Exact,
            network_timeout: Duration::from_secs(30),
            max_transaction_size: MAX_TRANSACTION_SIZE,
            mixin_limits: MixinLimits::default(),
        }
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

impl SendConfig {
    /// Parse a JSON config; omitted fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
