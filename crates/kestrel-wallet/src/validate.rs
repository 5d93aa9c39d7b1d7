//! Request validation.
//!
//! Seven checks run in a fixed order and the first failure wins. Each check
//! is a pure function of the request and cached wallet/ledger state, so
//! validation never touches the network and gives the same answer every
//! time it runs against the same inputs.

use crate::capability::{AddressCodec, WalletState};
use crate::config::SendConfig;
use crate::error::{ValidationError, WalletError};
use crate::request::SendRequest;
use kestrel_types::PaymentId;

/// Everything a check may look at.
pub struct ValidationContext<'a> {
    pub request: &'a SendRequest,
    /// Ledger height used for unlock and mixin rules.
    pub height: u64,
    pub wallet: &'a dyn WalletState,
    pub codec: &'a dyn AddressCodec,
    pub config: &'a SendConfig,
}

type Check = fn(&ValidationContext<'_>) -> Result<(), ValidationError>;

const CHECKS: [(&str, Check); 7] = [
    ("destinations", check_destinations),
    ("payment id conflict", check_payment_id_conflict),
    ("funding addresses", check_funding_addresses),
    ("fee and balance", check_fee_and_balance),
    ("mixin", check_mixin),
    ("payment id format", check_payment_id_format),
    ("change address", check_change_address),
];

/// Run every check in order and return the first failure.
pub fn validate(ctx: &ValidationContext<'_>) -> Result<(), WalletError> {
    CHECKS.iter().try_for_each(|(name, check)| {
        check(ctx).map_err(|e| {
            log::debug!("validation failed at {}: {}", name, e);
            WalletError::from(e)
        })
    })
}

/// Destinations exist, decode, carry positive amounts, and sum without overflow.
pub fn check_destinations(ctx: &ValidationContext<'_>) -> Result<(), ValidationError> {
    let destinations = &ctx.request.destinations;
    if ctx.request.caller_destinations().is_empty() {
        return Err(ValidationError::InvalidDestination("no destinations".into()));
    }

    for dest in destinations {
        ctx.codec
            .decode(&dest.address)
            .map_err(|e| ValidationError::InvalidDestination(format!("{}: {}", dest.address, e)))?;
        if dest.amount == 0 {
            return Err(ValidationError::InvalidDestination(format!(
                "amount for {} must be positive",
                dest.address
            )));
        }
    }

    ctx.request
        .destination_total()
        .map(|_| ())
        .ok_or_else(|| ValidationError::InvalidDestination("destination amounts overflow".into()))
}

/// Payment IDs embedded in integrated destinations, deduplicated, in order.
fn embedded_payment_ids(
    request: &SendRequest,
    codec: &dyn AddressCodec,
) -> Vec<PaymentId> {
    let mut ids: Vec<PaymentId> = Vec::new();
    for parsed in request
        .destinations
        .iter()
        .filter_map(|d| codec.decode(&d.address).ok())
    {
        if let Some(pid) = parsed.payment_id {
            if !ids.contains(&pid) {
                ids.push(pid);
            }
        }
    }
    ids
}

/// At most one payment ID across integrated destinations and the explicit field.
pub fn check_payment_id_conflict(ctx: &ValidationContext<'_>) -> Result<(), ValidationError> {
    let embedded = embedded_payment_ids(ctx.request, ctx.codec);
    if embedded.len() > 1 {
        return Err(ValidationError::PaymentIdConflict(format!(
            "destinations embed {} different payment IDs",
            embedded.len()
        )));
    }

    let explicit = ctx.request.payment_id.as_str();
    if let (Some(embedded), false) = (embedded.first(), explicit.is_empty()) {
        let matches = explicit
            .parse::<PaymentId>()
            .map(|pid| pid == *embedded)
            .unwrap_or(false);
        if !matches {
            return Err(ValidationError::PaymentIdConflict(format!(
                "explicit payment ID {} differs from integrated address payment ID {}",
                explicit, embedded
            )));
        }
    }
    Ok(())
}

/// Every funding address belongs to the wallet.
pub fn check_funding_addresses(ctx: &ValidationContext<'_>) -> Result<(), ValidationError> {
    if ctx.request.funding_addresses.is_empty() {
        return Err(ValidationError::UnknownOwnAddress(
            "no funding addresses".into(),
        ));
    }
    let owned = ctx.wallet.addresses();
    match ctx
        .request
        .funding_addresses
        .iter()
        .find(|a| !owned.contains(a))
    {
        Some(unknown) => Err(ValidationError::UnknownOwnAddress(unknown.clone())),
        None => Ok(()),
    }
}

/// Fee meets the minimum and the funding addresses hold enough unlocked balance.
pub fn check_fee_and_balance(ctx: &ValidationContext<'_>) -> Result<(), ValidationError> {
    let request = ctx.request;
    if request.fee < ctx.config.minimum_fee {
        return Err(ValidationError::FeeTooSmall {
            fee: request.fee,
            minimum: ctx.config.minimum_fee,
        });
    }

    let available = ctx
        .wallet
        .unlocked_balance(&request.funding_addresses, ctx.height);
    let needed = request.required_total().unwrap_or(u64::MAX);
    if needed > available {
        return Err(ValidationError::InsufficientFunds { needed, available });
    }
    Ok(())
}

/// Mixin inside the range permitted at the current height.
pub fn check_mixin(ctx: &ValidationContext<'_>) -> Result<(), ValidationError> {
    let limit = ctx.config.mixin_limits.for_height(ctx.height);
    let mixin = ctx.request.mixin;
    if mixin < limit.min || mixin > limit.max {
        return Err(ValidationError::InvalidMixin {
            mixin,
            min: limit.min,
            max: limit.max,
        });
    }
    Ok(())
}

/// Explicit payment ID is empty or exactly 64 hex characters.
pub fn check_payment_id_format(ctx: &ValidationContext<'_>) -> Result<(), ValidationError> {
    let pid = &ctx.request.payment_id;
    if pid.is_empty() || pid.parse::<PaymentId>().is_ok() {
        Ok(())
    } else {
        Err(ValidationError::InvalidPaymentIdFormat(pid.clone()))
    }
}

/// Change goes back to one of the wallet's own addresses.
pub fn check_change_address(ctx: &ValidationContext<'_>) -> Result<(), ValidationError> {
    let change = &ctx.request.change_address;
    if ctx.wallet.addresses().contains(change) {
        Ok(())
    } else {
        Err(ValidationError::UnknownOwnAddress(change.clone()))
    }
}

/// The payment ID the transaction will carry: the one embedded in an
/// integrated destination, else the explicit one, else none.
///
/// Only meaningful once [`validate`] has passed.
pub fn effective_payment_id(
    request: &SendRequest,
    codec: &dyn AddressCodec,
) -> Result<Option<PaymentId>, ValidationError> {
    if let Some(embedded) = embedded_payment_ids(request, codec).first() {
        return Ok(Some(*embedded));
    }
    if request.payment_id.is_empty() {
        return Ok(None);
    }
    request
        .payment_id
        .parse()
        .map(Some)
        .map_err(|_| ValidationError::InvalidPaymentIdFormat(request.payment_id.clone()))
}
