//! Input selection for a validated request.

use crate::capability::{FundingSelection, WalletState};
use crate::error::{ValidationError, WalletError};

/// Ask the wallet for inputs covering `total` and check its answer.
///
/// The covered amount is recomputed from the returned inputs rather than
/// trusted. An empty or short selection is reported as insufficient funds.
pub fn select_funding(
    wallet: &dyn WalletState,
    total: u64,
    from: &[String],
    height: u64,
) -> Result<FundingSelection, WalletError> {
    let selection = wallet.select_inputs(total, from, height);

    let covered = selection
        .inputs
        .iter()
        .try_fold(0u64, |acc, input| acc.checked_add(input.amount))
        .ok_or_else(|| WalletError::BuildFailure("selected input amounts overflow".into()))?;

    if covered != selection.covered {
        log::warn!(
            "wallet reported {} covered but selected inputs sum to {}",
            selection.covered,
            covered
        );
    }

    if selection.inputs.is_empty() || covered < total {
        log::warn!(
            "funding shortfall: needed {}, wallet selected {} across {} inputs",
            total,
            covered,
            selection.inputs.len()
        );
        return Err(ValidationError::InsufficientFunds {
            needed: total,
            available: covered,
        }
        .into());
    }

    log::debug!(
        "selected {} inputs covering {} for {}",
        selection.inputs.len(),
        covered,
        total
    );
    Ok(FundingSelection {
        inputs: selection.inputs,
        covered,
    })
}
