//! Decoy resolution.
//!
//! Fetches decoy outputs for every input amount in a single ledger call,
//! checks the response, and shapes it into one ring (minus the real input)
//! per input.

use crate::capability::{DecoyBucket, LedgerService, OwnedInput, RingParticipant};
use crate::config::DecoyPolicy;
use crate::error::WalletError;
use std::collections::HashSet;
use std::time::Duration;

/// Decoys for each input, in input order. Every list holds exactly `mixin` entries.
pub type RingParticipantSet = Vec<Vec<RingParticipant>>;

/// Resolves decoys against a ledger.
pub struct DecoyResolver<'a> {
    ledger: &'a dyn LedgerService,
    policy: DecoyPolicy,
    timeout: Duration,
}

impl<'a> DecoyResolver<'a> {
    pub fn new(ledger: &'a dyn LedgerService, policy: DecoyPolicy, timeout: Duration) -> Self {
        Self {
            ledger,
            policy,
            timeout,
        }
    }

    /// Pick `mixin` decoys for every input.
    ///
    /// With `mixin == 0` (or no inputs) nothing is fetched.
    pub async fn resolve(
        &self,
        inputs: &[OwnedInput],
        mixin: u64,
    ) -> Result<RingParticipantSet, WalletError> {
        if mixin == 0 || inputs.is_empty() {
            return Ok(vec![Vec::new(); inputs.len()]);
        }

        let amounts = distinct_amounts(inputs);
        let count = self.policy.request_count(mixin);
        log::debug!(
            "requesting {} decoys for {} amounts ({:?})",
            count,
            amounts.len(),
            self.policy
        );

        let response = match tokio::time::timeout(
            self.timeout,
            self.ledger.fetch_decoys(&amounts, count),
        )
        .await
        {
            Ok(Ok(buckets)) => buckets,
            Ok(Err(e)) => return Err(WalletError::DecoyServiceUnavailable(e.to_string())),
            Err(_) => {
                return Err(WalletError::DecoyServiceUnavailable(format!(
                    "no decoy response within {:?}",
                    self.timeout
                )))
            }
        };

        check_response(inputs, &amounts, &response, count)?;
        shape_rings(inputs, &response, mixin, self.policy)
    }
}

/// Input amounts without repeats, in order of first appearance.
pub fn distinct_amounts(inputs: &[OwnedInput]) -> Vec<u64> {
    let mut seen = HashSet::new();
    inputs
        .iter()
        .map(|i| i.amount)
        .filter(|a| seen.insert(*a))
        .collect()
}

fn bucket_for(response: &[DecoyBucket], amount: u64) -> Option<&DecoyBucket> {
    response.iter().find(|b| b.amount == amount)
}

/// Check a decoy response against the inputs it was requested for.
///
/// Checks run in a fixed order so the reported error is deterministic:
/// emptiness, then missing amounts, then short buckets (both in input
/// order), then structural problems.
pub fn check_response(
    inputs: &[OwnedInput],
    amounts: &[u64],
    response: &[DecoyBucket],
    count: u64,
) -> Result<(), WalletError> {
    if response.is_empty() {
        return Err(WalletError::DecoyServiceUnavailable(
            "ledger returned no decoy buckets".into(),
        ));
    }

    for input in inputs {
        if bucket_for(response, input.amount).is_none() {
            return Err(WalletError::DecoyInsufficiency {
                amount: input.amount,
                needed: count,
                found: 0,
            });
        }
    }

    for input in inputs {
        let found = bucket_for(response, input.amount)
            .map(|b| b.outputs.len() as u64)
            .unwrap_or(0);
        if found < count {
            return Err(WalletError::DecoyInsufficiency {
                amount: input.amount,
                needed: count,
                found,
            });
        }
    }

    if response.len() != amounts.len() {
        return Err(WalletError::DecoyServiceUnavailable(format!(
            "expected {} decoy buckets, got {}",
            amounts.len(),
            response.len()
        )));
    }

    let mut bucket_amounts = HashSet::new();
    for bucket in response {
        if !bucket_amounts.insert(bucket.amount) {
            return Err(WalletError::DecoyServiceUnavailable(format!(
                "duplicate decoy bucket for amount {}",
                bucket.amount
            )));
        }
        let mut indices = HashSet::new();
        if let Some(dup) = bucket
            .outputs
            .iter()
            .find(|o| !indices.insert(o.global_index))
        {
            return Err(WalletError::DecoyServiceUnavailable(format!(
                "output {} listed twice for amount {}",
                dup.global_index, bucket.amount
            )));
        }
    }

    Ok(())
}

/// Build one ring per input from a checked response.
pub fn shape_rings(
    inputs: &[OwnedInput],
    response: &[DecoyBucket],
    mixin: u64,
    policy: DecoyPolicy,
) -> Result<RingParticipantSet, WalletError> {
    let take = usize::try_from(mixin).unwrap_or(usize::MAX);
    inputs
        .iter()
        .map(|input| {
            let outputs = bucket_for(response, input.amount)
                .map(|b| b.outputs.as_slice())
                .unwrap_or(&[]);
            let ring: Vec<RingParticipant> = outputs
                .iter()
                .filter(|o| {
                    policy == DecoyPolicy::Exact || o.global_index != input.global_index
                })
                .take(take)
                .copied()
                .collect();
            if (ring.len() as u64) < mixin {
                return Err(WalletError::DecoyInsufficiency {
                    amount: input.amount,
                    needed: mixin,
                    found: ring.len() as u64,
                });
            }
            Ok(ring)
        })
        .collect()
}
