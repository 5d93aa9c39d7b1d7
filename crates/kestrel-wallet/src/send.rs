//! The send pipeline.
//!
//! ```text
//! Transfer ─► build_request ─► validate ─► select_funding ─► derive key images
//!          ─► resolve decoys ─► build_draft ─► sign ─► relay ─► hash
//! ```
//!
//! Every stage returns `Result<_, WalletError>` and the first failure ends
//! the call. Nothing touches the network before validation has passed, and
//! the only network calls are one decoy fetch (skipped for mixin 0) and one
//! relay, each bounded by [`SendConfig::network_timeout`].

use crate::assemble::{self, TransactionDraft};
use crate::capability::{
    AddressCodec, BuiltTransaction, LedgerService, OwnedInput, TransactionSigner, WalletState,
};
use crate::config::SendConfig;
use crate::decoy::DecoyResolver;
use crate::error::WalletError;
use crate::funding;
use crate::relay;
use crate::request::{self, SendRequest, Transfer};
use crate::validate::{self, ValidationContext};

/// A signed transaction that has not been relayed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedTransaction {
    /// Transaction hash (hex).
    pub hash: String,
    pub built: BuiltTransaction,
    pub draft: TransactionDraft,
    pub request: SendRequest,
    /// Inputs the transaction spends.
    pub inputs: Vec<OwnedInput>,
}

impl PreparedTransaction {
    pub fn fee(&self) -> u64 {
        self.request.fee
    }

    /// Relay fee paid to the node, zero when none.
    pub fn node_fee(&self) -> u64 {
        self.request.node_fee
    }

    pub fn raw_hex(&self) -> String {
        hex::encode(&self.built.raw)
    }
}

/// Sends transactions from one wallet through one ledger.
pub struct TransactionSender<'a> {
    ledger: &'a dyn LedgerService,
    wallet: &'a dyn WalletState,
    codec: &'a dyn AddressCodec,
    signer: &'a dyn TransactionSigner,
    config: SendConfig,
}

impl<'a> TransactionSender<'a> {
    pub fn new(
        ledger: &'a dyn LedgerService,
        wallet: &'a dyn WalletState,
        codec: &'a dyn AddressCodec,
        signer: &'a dyn TransactionSigner,
    ) -> Self {
        Self {
            ledger,
            wallet,
            codec,
            signer,
            config: SendConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SendConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &SendConfig {
        &self.config
    }

    /// Send `amount` to `address` with default mixin, fee, funding, and change.
    pub async fn send_transaction_basic(
        &self,
        address: &str,
        amount: u64,
        payment_id: Option<&str>,
    ) -> Result<String, WalletError> {
        let mut transfer = Transfer::new().to(address, amount);
        if let Some(pid) = payment_id {
            transfer = transfer.payment_id(pid);
        }
        self.send_transaction_advanced(&transfer).await
    }

    /// Run the whole pipeline and return the relayed transaction's hash.
    pub async fn send_transaction_advanced(&self, transfer: &Transfer) -> Result<String, WalletError> {
        let result = match self.prepare_transaction(transfer).await {
            Ok(prepared) => self.relay_prepared(&prepared).await,
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            log::warn!("send failed ({:?}): {}", e.kind(), e);
        }
        result
    }

    /// Resolve defaults and append the node fee. No network access.
    pub fn build_request(&self, transfer: &Transfer) -> SendRequest {
        self.build_request_at(transfer, self.ledger.current_height())
    }

    /// Validate a request against current wallet and ledger state.
    pub fn validate(&self, request: &SendRequest) -> Result<(), WalletError> {
        self.validate_at(request, self.ledger.current_height())
    }

    fn build_request_at(&self, transfer: &Transfer, height: u64) -> SendRequest {
        request::build_request(transfer, self.wallet, height, &self.ledger.node_fee(), &self.config)
    }

    fn validate_at(&self, request: &SendRequest, height: u64) -> Result<(), WalletError> {
        validate::validate(&ValidationContext {
            request,
            height,
            wallet: self.wallet,
            codec: self.codec,
            config: &self.config,
        })
    }

    /// Every stage except relay. The ledger height is read once and used by
    /// every stage.
    pub async fn prepare_transaction(&self, transfer: &Transfer) -> Result<PreparedTransaction, WalletError> {
        let height = self.ledger.current_height();
        let request = self.build_request_at(transfer, height);
        log::debug!(
            "send request: {} destinations, mixin {}, fee {}, node fee {}",
            request.destinations.len(),
            request.mixin,
            request.fee,
            request.node_fee
        );

        self.validate_at(&request, height)?;
        let payment_id = validate::effective_payment_id(&request, self.codec)?;
        let total = request
            .required_total()
            .ok_or_else(|| WalletError::BuildFailure("transaction total overflows".into()))?;

        let selection =
            funding::select_funding(self.wallet, total, &request.funding_addresses, height)?;

        let spendable = assemble::derive_spendable_outputs(
            self.signer,
            &selection.inputs,
            &self.wallet.private_view_key(),
        )?;

        let rings = DecoyResolver::new(self.ledger, self.config.decoy_policy, self.config.network_timeout)
            .resolve(&selection.inputs, request.mixin)
            .await?;
        log::debug!("resolved {} rings of {} decoys", rings.len(), request.mixin);
        let draft = assemble::build_draft(
            &request,
            self.codec,
            &selection,
            spendable,
            rings,
            payment_id,
        )?;
        let built = assemble::build_transaction(self.signer, &draft, self.config.max_transaction_size)?;
        log::debug!(
            "built transaction {}: {} inputs, {} outputs, {} bytes",
            built.hash_hex(),
            draft.inputs.len(),
            draft.outputs.len(),
            built.raw.len()
        );

        Ok(PreparedTransaction {
            hash: built.hash_hex(),
            built,
            draft,
            request,
            inputs: selection.inputs,
        })
    }

    /// Relay a prepared transaction and tell the wallet which inputs it spent.
    pub async fn relay_prepared(&self, prepared: &PreparedTransaction) -> Result<String, WalletError> {
        let hash = relay::relay(self.ledger, &prepared.built, self.config.network_timeout).await?;
        log::info!(
            "relayed transaction {} (fee {}, node fee {})",
            hash,
            prepared.fee(),
            prepared.node_fee()
        );
        self.wallet.on_transaction_sent(&hash, &prepared.inputs);
        Ok(hash)
    }
}
