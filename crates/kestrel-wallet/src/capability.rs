//! Collaborators the send engine consumes.
//!
//! The engine never talks to a daemon, a key store, or a signing library
//! directly. It is handed implementations of these traits instead.

use async_trait::async_trait;
use kestrel_types::address::{self, AddressError, ParsedAddress};
use kestrel_types::Network;
use thiserror::Error;

use crate::assemble::TransactionDraft;

// ─── Ledger ──────────────────────────────────────────────────────────────────

/// Failure talking to the ledger service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("ledger unreachable: {0}")]
    Unreachable(String),

    #[error("ledger request timed out")]
    Timeout,

    #[error("malformed ledger response: {0}")]
    Malformed(String),
}

/// Relay fee advertised by the node. An amount of zero means no fee.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeFee {
    pub address: String,
    pub amount: u64,
}

/// A candidate decoy output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingParticipant {
    pub global_index: u64,
    pub key: [u8; 32],
}

/// Decoy candidates for one amount, in the order the ledger returned them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoyBucket {
    pub amount: u64,
    pub outputs: Vec<RingParticipant>,
}

/// The remote ledger (daemon).
///
/// `current_height` and `node_fee` are cached reads and never touch the
/// network. Implementations of `fetch_decoys` must not return outputs owned
/// by the caller unless the sender is configured with
/// [`DecoyPolicy::OverRequestAndFilter`](crate::config::DecoyPolicy).
#[async_trait]
pub trait LedgerService: Send + Sync {
    fn current_height(&self) -> u64;

    fn node_fee(&self) -> NodeFee;

    /// One batched request: `count` random outputs for each amount.
    async fn fetch_decoys(&self, amounts: &[u64], count: u64) -> Result<Vec<DecoyBucket>, LedgerError>;

    /// Submit a serialized transaction. `Ok(false)` means the node refused it.
    async fn submit_transaction(&self, raw: &[u8]) -> Result<bool, LedgerError>;
}

// ─── Wallet state ────────────────────────────────────────────────────────────

/// An output the wallet owns and can spend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedInput {
    pub tx_public_key: [u8; 32],
    /// Index of the output within its transaction.
    pub output_index: u64,
    pub global_index: u64,
    pub amount: u64,
    pub public_spend_key: [u8; 32],
    pub private_spend_key: [u8; 32],
}

/// Inputs picked to fund a transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FundingSelection {
    pub inputs: Vec<OwnedInput>,
    /// Sum of the selected input amounts as reported by the wallet.
    pub covered: u64,
}

/// Balance and output storage owned by the caller.
///
/// The engine does not lock anything: callers must not run two sends from
/// the same funding addresses at once.
pub trait WalletState: Send + Sync {
    fn addresses(&self) -> Vec<String>;

    fn primary_address(&self) -> String;

    /// Unlocked balance of `from` at `height`.
    fn unlocked_balance(&self, from: &[String], height: u64) -> u64;

    /// Pick unlocked inputs from `from` covering at least `total`.
    fn select_inputs(&self, total: u64, from: &[String], height: u64) -> FundingSelection;

    fn private_view_key(&self) -> [u8; 32];

    /// Called once a transaction spending `spent` has been relayed.
    fn on_transaction_sent(&self, _hash: &str, _spent: &[OwnedInput]) {}
}

// ─── Addresses ───────────────────────────────────────────────────────────────

/// Decodes recipient addresses.
pub trait AddressCodec: Send + Sync {
    fn decode(&self, address: &str) -> Result<ParsedAddress, AddressError>;
}

/// Address codec for one network.
#[derive(Debug, Clone, Copy)]
pub struct NetworkCodec {
    pub network: Network,
}

impl NetworkCodec {
    pub fn new(network: Network) -> Self {
        Self { network }
    }
}

impl AddressCodec for NetworkCodec {
    fn decode(&self, address: &str) -> Result<ParsedAddress, AddressError> {
        address::parse_address_for(address, self.network)
    }
}

// ─── Signing ─────────────────────────────────────────────────────────────────

/// Opaque failure from the signing library.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct SignerError(pub String);

impl SignerError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Key image plus the one-time secret needed to sign for the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyImageDerivation {
    pub key_image: [u8; 32],
    pub ephemeral_secret: [u8; 32],
}

/// A signed, serialized transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltTransaction {
    pub raw: Vec<u8>,
    pub hash: [u8; 32],
}

impl BuiltTransaction {
    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }
}

/// Ring-signature primitives.
pub trait TransactionSigner: Send + Sync {
    fn derive_key_image(
        &self,
        tx_public_key: &[u8; 32],
        private_view_key: &[u8; 32],
        public_spend_key: &[u8; 32],
        private_spend_key: &[u8; 32],
        output_index: u64,
    ) -> Result<KeyImageDerivation, SignerError>;

    fn build_transaction(&self, draft: &TransactionDraft) -> Result<BuiltTransaction, SignerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_codec_rejects_other_network() {
        let testnet = address::create_address(Network::Testnet, &[1; 32], &[2; 32], None);
        let codec = NetworkCodec::new(Network::Mainnet);
        assert!(matches!(
            codec.decode(&testnet),
            Err(AddressError::WrongNetwork { .. })
        ));
        assert!(NetworkCodec::new(Network::Testnet).decode(&testnet).is_ok());
    }

    #[test]
    fn test_built_transaction_hash_hex() {
        let built = BuiltTransaction { raw: vec![1, 2, 3], hash: [0xAB; 32] };
        assert_eq!(built.hash_hex(), "ab".repeat(32));
    }
}
