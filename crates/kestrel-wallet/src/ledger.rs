//! [`LedgerService`] backed by the daemon's HTTP API.

use crate::capability::{DecoyBucket, LedgerError, LedgerService, NodeFee, RingParticipant};
use async_trait::async_trait;
use kestrel_rpc::daemon::RandomOutsForAmount;
use kestrel_rpc::{DaemonRpc, RpcConfig, RpcError};
use std::sync::{PoisonError, RwLock};

impl From<RpcError> for LedgerError {
    fn from(err: RpcError) -> Self {
        match &err {
            RpcError::Timeout { .. } => LedgerError::Timeout,
            RpcError::Json(_) | RpcError::Decode { .. } | RpcError::NoResult { .. } => {
                LedgerError::Malformed(err.to_string())
            }
            RpcError::HttpStatus { status, .. } if *status < 500 => {
                LedgerError::Malformed(err.to_string())
            }
            _ => LedgerError::Unreachable(err.to_string()),
        }
    }
}

/// Chain state cached by [`DaemonLedger::refresh`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerStatus {
    pub height: u64,
    pub network_height: u64,
    pub node_fee: NodeFee,
}

/// Daemon-backed ledger.
///
/// Height and node fee are read from a cache; call [`refresh`](Self::refresh)
/// before building a send so they are current.
pub struct DaemonLedger {
    daemon: DaemonRpc,
    status: RwLock<LedgerStatus>,
}

impl DaemonLedger {
    pub fn new(url: &str) -> Result<Self, LedgerError> {
        Ok(Self::from_daemon(DaemonRpc::new(url)?))
    }

    pub fn with_config(config: RpcConfig) -> Result<Self, LedgerError> {
        Ok(Self::from_daemon(DaemonRpc::with_config(config)?))
    }

    pub fn from_daemon(daemon: DaemonRpc) -> Self {
        Self {
            daemon,
            status: RwLock::new(LedgerStatus::default()),
        }
    }

    pub fn daemon(&self) -> &DaemonRpc {
        &self.daemon
    }

    /// Last cached status.
    pub fn status(&self) -> LedgerStatus {
        self.status
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Fetch `/info` and `/fee` and replace the cached status.
    pub async fn refresh(&self) -> Result<LedgerStatus, LedgerError> {
        let info = self.daemon.get_info().await?;
        let fee = self.daemon.get_fee_info().await?;
        let status = LedgerStatus {
            height: info.height,
            network_height: info.network_height.max(info.height),
            node_fee: NodeFee {
                address: fee.address,
                amount: fee.amount,
            },
        };
        log::debug!(
            "ledger at height {}/{}, node fee {}",
            status.height,
            status.network_height,
            status.node_fee.amount
        );
        *self.status.write().unwrap_or_else(PoisonError::into_inner) = status.clone();
        Ok(status)
    }
}

fn parse_key(hex_key: &str) -> Result<[u8; 32], LedgerError> {
    let mut key = [0u8; 32];
    hex::decode_to_slice(hex_key, &mut key)
        .map_err(|e| LedgerError::Malformed(format!("output key {:?}: {}", hex_key, e)))?;
    Ok(key)
}

/// Convert a `/getrandom_outs` entry into a decoy bucket.
pub fn to_bucket(outs: RandomOutsForAmount) -> Result<DecoyBucket, LedgerError> {
    let outputs = outs
        .outs
        .iter()
        .map(|o| {
            Ok(RingParticipant {
                global_index: o.global_amount_index,
                key: parse_key(&o.out_key)?,
            })
        })
        .collect::<Result<Vec<_>, LedgerError>>()?;
    Ok(DecoyBucket {
        amount: outs.amount,
        outputs,
    })
}

#[async_trait]
impl LedgerService for DaemonLedger {
    fn current_height(&self) -> u64 {
        self.status.read().unwrap_or_else(PoisonError::into_inner).height
    }

    fn node_fee(&self) -> NodeFee {
        self.status
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .node_fee
            .clone()
    }

    async fn fetch_decoys(&self, amounts: &[u64], count: u64) -> Result<Vec<DecoyBucket>, LedgerError> {
        self.daemon
            .get_random_outs(amounts, count)
            .await?
            .into_iter()
            .map(to_bucket)
            .collect()
    }

    async fn submit_transaction(&self, raw: &[u8]) -> Result<bool, LedgerError> {
        let result = self.daemon.send_raw_transaction(&hex::encode(raw)).await?;
        if !result.is_accepted() {
            log::warn!(
                "daemon refused transaction: {} {}",
                result.status,
                result.error.as_deref().unwrap_or("")
            );
        }
        Ok(result.is_accepted())
    }
}
