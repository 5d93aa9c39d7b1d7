//! Wallet error types.
//!
//! `WalletError` is the only error a send call returns. Every collaborator
//! failure is converted into one of its kinds at the stage that observed it.

use kestrel_types::amount::format_amount;
use thiserror::Error;

fn amt(atomic: &u64) -> String {
    format_amount(*atomic)
}

/// A request parameter failed validation. Always raised before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid destination: {0}")]
    InvalidDestination(String),

    #[error("conflicting payment IDs: {0}")]
    PaymentIdConflict(String),

    #[error("address is not part of this wallet: {0}")]
    UnknownOwnAddress(String),

    #[error("fee {} is below the network minimum of {}", amt(.fee), amt(.minimum))]
    FeeTooSmall { fee: u64, minimum: u64 },

    #[error("insufficient balance: need {}, have {}", amt(.needed), amt(.available))]
    InsufficientFunds { needed: u64, available: u64 },

    #[error("mixin {mixin} outside the permitted range {min}..={max}")]
    InvalidMixin { mixin: u64, min: u64, max: u64 },

    #[error("payment ID must be 64 hex characters: {0:?}")]
    InvalidPaymentIdFormat(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(
        "not enough decoys for amount {} ({amount}): need {needed}, found {found}",
        amt(.amount)
    )]
    DecoyInsufficiency { amount: u64, needed: u64, found: u64 },

    #[error("decoy service unavailable: {0}")]
    DecoyServiceUnavailable(String),

    #[error("failed to build transaction: {0}")]
    BuildFailure(String),

    #[error("daemon rejected the transaction: {0}")]
    RelayRejected(String),

    #[error("daemon unreachable while relaying: {0}")]
    RelayUnavailable(String),
}

/// Discriminant of [`WalletError`], for callers that branch on the kind only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WalletErrorKind {
    Validation,
    DecoyInsufficiency,
    DecoyServiceUnavailable,
    BuildFailure,
    RelayRejected,
    RelayUnavailable,
}

impl WalletError {
    pub fn kind(&self) -> WalletErrorKind {
        match self {
            WalletError::Validation(_) => WalletErrorKind::Validation,
            WalletError::DecoyInsufficiency { .. } => WalletErrorKind::DecoyInsufficiency,
            WalletError::DecoyServiceUnavailable(_) => WalletErrorKind::DecoyServiceUnavailable,
            WalletError::BuildFailure(_) => WalletErrorKind::BuildFailure,
            WalletError::RelayRejected(_) => WalletErrorKind::RelayRejected,
            WalletError::RelayUnavailable(_) => WalletErrorKind::RelayUnavailable,
        }
    }

    /// The validation failure, if this is one.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            WalletError::Validation(v) => Some(v),
            _ => None,
        }
    }

    /// Whether the daemon could not be reached (as opposed to answering "no").
    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            WalletError::DecoyServiceUnavailable(_) | WalletError::RelayUnavailable(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decoy_message_names_formatted_amount() {
        let err = WalletError::DecoyInsufficiency { amount: 250, needed: 3, found: 2 };
        assert_eq!(
            err.to_string(),
            "not enough decoys for amount 2.50 (250): need 3, found 2"
        );
        assert_eq!(err.kind(), WalletErrorKind::DecoyInsufficiency);
    }

    #[test]
    fn test_validation_is_transparent() {
        let err: WalletError = ValidationError::InsufficientFunds { needed: 1050, available: 1000 }.into();
        assert_eq!(err.to_string(), "insufficient balance: need 10.50, have 10.00");
        assert!(err.as_validation().is_some());
        assert!(!err.is_connectivity());
    }

    #[test]
    fn test_connectivity_kinds() {
        assert!(WalletError::RelayUnavailable("timeout".into()).is_connectivity());
        assert!(WalletError::DecoyServiceUnavailable("empty".into()).is_connectivity());
        assert!(!WalletError::RelayRejected("double spend".into()).is_connectivity());
    }
}
