//! Send requests.
//!
//! A [`Transfer`] is what the caller asks for. [`build_request`] resolves it
//! against the wallet, the ledger's cached state, and the config into a
//! [`SendRequest`] with every default filled in and the node fee appended.

use crate::capability::{NodeFee, WalletState};
use crate::config::SendConfig;

/// One recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub address: String,
    pub amount: u64,
}

impl Destination {
    pub fn new(address: impl Into<String>, amount: u64) -> Self {
        Self {
            address: address.into(),
            amount,
        }
    }
}

/// Caller-facing transfer description.
///
/// ```ignore
/// let transfer = Transfer::new()
///     .to("KST1...", 250)
///     .mixin(3)
///     .payment_id("ab".repeat(32));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transfer {
    destinations: Vec<Destination>,
    mixin: Option<u64>,
    fee: Option<u64>,
    payment_id: Option<String>,
    funding_addresses: Vec<String>,
    change_address: Option<String>,
}

impl Transfer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a recipient.
    pub fn to(mut self, address: impl Into<String>, amount: u64) -> Self {
        self.destinations.push(Destination::new(address, amount));
        self
    }

    pub fn destination(mut self, destination: Destination) -> Self {
        self.destinations.push(destination);
        self
    }

    /// Ring size minus one. Defaults to the network default for the current height.
    pub fn mixin(mut self, mixin: u64) -> Self {
        self.mixin = Some(mixin);
        self
    }

    pub fn fee(mut self, fee: u64) -> Self {
        self.fee = Some(fee);
        self
    }

    /// 64 hex characters. An empty string means none.
    pub fn payment_id(mut self, payment_id: impl Into<String>) -> Self {
        self.payment_id = Some(payment_id.into());
        self
    }

    /// Spend only from this address. Can be called repeatedly.
    pub fn from_address(mut self, address: impl Into<String>) -> Self {
        self.funding_addresses.push(address.into());
        self
    }

    pub fn from_addresses<I, S>(mut self, addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.funding_addresses
            .extend(addresses.into_iter().map(Into::into));
        self
    }

    pub fn change_address(mut self, address: impl Into<String>) -> Self {
        self.change_address = Some(address.into());
        self
    }

    pub fn destinations(&self) -> &[Destination] {
        &self.destinations
    }
}

/// A fully resolved send request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendRequest {
    /// Caller destinations in order, then the node fee destination if any.
    pub destinations: Vec<Destination>,
    /// Amount of the appended node fee destination, zero when none.
    pub node_fee: u64,
    pub mixin: u64,
    pub fee: u64,
    /// Explicit payment ID as given, empty when none.
    pub payment_id: String,
    pub funding_addresses: Vec<String>,
    pub change_address: String,
}

impl SendRequest {
    /// Sum of all destination amounts, `None` on overflow.
    pub fn destination_total(&self) -> Option<u64> {
        self.destinations
            .iter()
            .try_fold(0u64, |acc, d| acc.checked_add(d.amount))
    }

    /// Destinations plus the network fee, `None` on overflow.
    pub fn required_total(&self) -> Option<u64> {
        self.destination_total()?.checked_add(self.fee)
    }

    /// Destinations supplied by the caller, without the node fee.
    pub fn caller_destinations(&self) -> &[Destination] {
        let n = self.destinations.len();
        if self.node_fee > 0 && n > 0 {
            &self.destinations[..n - 1]
        } else {
            &self.destinations
        }
    }
}

/// Resolve a transfer into a send request.
///
/// Never touches the network: `height` and `node_fee` come from the ledger's
/// cached state.
pub fn build_request(
    transfer: &Transfer,
    wallet: &dyn WalletState,
    height: u64,
    node_fee: &NodeFee,
    config: &SendConfig,
) -> SendRequest {
    let mut destinations = transfer.destinations.clone();
    let injected = if node_fee.amount > 0 {
        destinations.push(Destination::new(node_fee.address.clone(), node_fee.amount));
        node_fee.amount
    } else {
        0
    };

    let funding_addresses = if transfer.funding_addresses.is_empty() {
        wallet.addresses()
    } else {
        transfer.funding_addresses.clone()
    };

    SendRequest {
        destinations,
        node_fee: injected,
        mixin: transfer
            .mixin
            .unwrap_or_else(|| config.mixin_limits.default_mixin(height)),
        fee: transfer.fee.unwrap_or(config.default_fee),
        payment_id: transfer.payment_id.clone().unwrap_or_default(),
        funding_addresses,
        change_address: transfer
            .change_address
            .clone()
            .unwrap_or_else(|| wallet.primary_address()),
    }
}
