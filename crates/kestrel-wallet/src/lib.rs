//! Kestrel wallet send engine.
//!
//! Turns a transfer request into a validated, funded, decoy-padded, signed
//! transaction and relays it to a daemon. The daemon, wallet storage,
//! address codec, and signing primitives are supplied by the caller through
//! the traits in [`capability`].
//!
//! # Example
//!
//! ```ignore
//! use kestrel_wallet::{DaemonLedger, MemoryWallet, NetworkCodec, TransactionSender, Transfer};
//!
//! let ledger = DaemonLedger::new("http://localhost:11898")?;
//! ledger.refresh().await?;
//! let sender = TransactionSender::new(&ledger, &wallet, &codec, &signer);
//! let hash = sender
//!     .send_transaction_advanced(&Transfer::new().to(address, 250).mixin(3))
//!     .await?;
//! ```

pub mod assemble;
pub mod capability;
pub mod config;
pub mod decoy;
pub mod error;
pub mod funding;
#[cfg(feature = "transport")]
pub mod ledger;
pub mod memory;
pub mod relay;
pub mod request;
pub mod send;
pub mod utxo;
pub mod validate;

pub use assemble::{OutputTarget, SpendableOutput, TransactionDraft};
pub use capability::{
    AddressCodec, BuiltTransaction, DecoyBucket, FundingSelection, KeyImageDerivation,
    LedgerError, LedgerService, NetworkCodec, NodeFee, OwnedInput, RingParticipant,
    SignerError, TransactionSigner, WalletState,
};
pub use config::{DecoyPolicy, SendConfig};
pub use decoy::{DecoyResolver, RingParticipantSet};
pub use error::{ValidationError, WalletError, WalletErrorKind};
#[cfg(feature = "transport")]
pub use ledger::{DaemonLedger, LedgerStatus};
pub use memory::{MemoryWallet, StoredOutput};
pub use request::{Destination, SendRequest, Transfer};
pub use send::{PreparedTransaction, TransactionSender};
pub use utxo::SelectionStrategy;
