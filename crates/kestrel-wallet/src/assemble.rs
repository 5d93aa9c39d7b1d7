//! Transaction assembly.
//!
//! Turns funded inputs and resolved rings into a [`TransactionDraft`] and
//! hands it to the signer. Key derivation and serialization belong to the
//! [`TransactionSigner`]; this module only decides what goes in.

use crate::capability::{
    AddressCodec, BuiltTransaction, FundingSelection, OwnedInput, TransactionSigner,
};
use crate::decoy::RingParticipantSet;
use crate::error::WalletError;
use crate::request::{Destination, SendRequest};
use kestrel_types::{split_into_denominations, PaymentId};

/// An owned input ready to be signed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpendableOutput {
    pub key_image: [u8; 32],
    pub amount: u64,
    pub global_index: u64,
    pub tx_public_key: [u8; 32],
    pub output_index: u64,
    /// One-time secret key for this output.
    pub ephemeral_secret: [u8; 32],
}

/// One transaction output: a single denomination paid to a key pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    pub spend_public_key: [u8; 32],
    pub view_public_key: [u8; 32],
    pub amount: u64,
}

/// Everything the signer needs to produce a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDraft {
    /// Recipients, node fee destination last when present.
    pub destinations: Vec<Destination>,
    pub change: Option<Destination>,
    /// Denominated outputs for every destination, then change.
    pub outputs: Vec<OutputTarget>,
    pub inputs: Vec<SpendableOutput>,
    /// Decoys for each input, same order as `inputs`.
    pub ring_participants: RingParticipantSet,
    pub mixin: u64,
    pub fee: u64,
    pub payment_id: Option<PaymentId>,
}

impl TransactionDraft {
    pub fn destination_total(&self) -> u64 {
        self.destinations.iter().map(|d| d.amount).sum()
    }

    /// Destinations plus fee: what the inputs must cover.
    pub fn required_total(&self) -> u64 {
        self.destination_total() + self.fee
    }

    pub fn input_total(&self) -> u64 {
        self.inputs.iter().map(|i| i.amount).sum()
    }

    pub fn output_total(&self) -> u64 {
        self.outputs.iter().map(|o| o.amount).sum()
    }

    pub fn key_images(&self) -> Vec<[u8; 32]> {
        self.inputs.iter().map(|i| i.key_image).collect()
    }
}

/// Derive key images and one-time secrets for every input, in order.
pub fn derive_spendable_outputs(
    signer: &dyn TransactionSigner,
    inputs: &[OwnedInput],
    private_view_key: &[u8; 32],
) -> Result<Vec<SpendableOutput>, WalletError> {
    inputs
        .iter()
        .map(|input| {
            let derived = signer
                .derive_key_image(
                    &input.tx_public_key,
                    private_view_key,
                    &input.public_spend_key,
                    &input.private_spend_key,
                    input.output_index,
                )
                .map_err(|e| {
                    WalletError::BuildFailure(format!(
                        "key image derivation failed for output {}: {}",
                        input.global_index, e
                    ))
                })?;
            Ok(SpendableOutput {
                key_image: derived.key_image,
                amount: input.amount,
                global_index: input.global_index,
                tx_public_key: input.tx_public_key,
                output_index: input.output_index,
                ephemeral_secret: derived.ephemeral_secret,
            })
        })
        .collect()
}

fn denominated_outputs(
    codec: &dyn AddressCodec,
    dest: &Destination,
) -> Result<Vec<OutputTarget>, WalletError> {
    let parsed = codec.decode(&dest.address).map_err(|e| {
        WalletError::BuildFailure(format!("cannot decode {}: {}", dest.address, e))
    })?;
    Ok(split_into_denominations(dest.amount)
        .into_iter()
        .map(|amount| OutputTarget {
            spend_public_key: parsed.spend_public_key,
            view_public_key: parsed.view_public_key,
            amount,
        })
        .collect())
}

/// Lay out a transaction for a validated, funded request.
pub fn build_draft(
    request: &SendRequest,
    codec: &dyn AddressCodec,
    selection: &FundingSelection,
    inputs: Vec<SpendableOutput>,
    ring_participants: RingParticipantSet,
    payment_id: Option<PaymentId>,
) -> Result<TransactionDraft, WalletError> {
    if inputs.len() != ring_participants.len() {
        return Err(WalletError::BuildFailure(format!(
            "{} inputs but {} rings",
            inputs.len(),
            ring_participants.len()
        )));
    }

    let required = request
        .required_total()
        .ok_or_else(|| WalletError::BuildFailure("transaction total overflows".into()))?;
    let change_amount = selection.covered.checked_sub(required).ok_or_else(|| {
        WalletError::BuildFailure(format!(
            "inputs cover {} but {} is required",
            selection.covered, required
        ))
    })?;
    let change = (change_amount > 0)
        .then(|| Destination::new(request.change_address.clone(), change_amount));

    let mut outputs = Vec::new();
    for dest in request.destinations.iter().chain(change.iter()) {
        outputs.extend(denominated_outputs(codec, dest)?);
    }

    Ok(TransactionDraft {
        destinations: request.destinations.clone(),
        change,
        outputs,
        inputs,
        ring_participants,
        mixin: request.mixin,
        fee: request.fee,
        payment_id,
    })
}

/// Sign and serialize the draft.
pub fn build_transaction(
    signer: &dyn TransactionSigner,
    draft: &TransactionDraft,
    max_size: usize,
) -> Result<BuiltTransaction, WalletError> {
    let built = signer
        .build_transaction(draft)
        .map_err(|e| WalletError::BuildFailure(e.to_string()))?;

    if built.raw.len() > max_size {
        return Err(WalletError::BuildFailure(format!(
            "transaction is {} bytes, limit is {}",
            built.raw.len(),
            max_size
        )));
    }
    Ok(built)
}
