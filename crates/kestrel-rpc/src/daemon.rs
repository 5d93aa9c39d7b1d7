//! Daemon RPC client.
//!
//! Typed async methods for the daemon endpoints a sending wallet needs:
//! chain info, the node fee advertisement, random outputs for ring
//! construction, and raw transaction submission.

use crate::client::{RpcClient, RpcConfig};
use crate::error::RpcError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// Response Types
// =============================================================================

/// Daemon `/info` response.
#[derive(Debug, Clone, Deserialize)]
pub struct DaemonInfo {
    pub height: u64,
    #[serde(default)]
    pub network_height: u64,
    #[serde(default)]
    pub synced: bool,
    #[serde(default)]
    pub incoming_connections_count: u64,
    #[serde(default)]
    pub outgoing_connections_count: u64,
    #[serde(default)]
    pub tx_pool_size: u64,
    #[serde(default)]
    pub version: String,
    pub status: String,
    /// Catch-all for additional fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Daemon `/fee` response: the fee the node charges for relaying.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FeeInfo {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub amount: u64,
    #[serde(default)]
    pub status: String,
}

/// One random output from `/getrandom_outs`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RandomOutput {
    pub global_amount_index: u64,
    /// Output public key (hex).
    pub out_key: String,
}

/// Random outputs for one amount.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RandomOutsForAmount {
    pub amount: u64,
    #[serde(default)]
    pub outs: Vec<RandomOutput>,
}

/// `/sendrawtransaction` response.
#[derive(Debug, Clone, Deserialize)]
pub struct SendRawTxResult {
    pub status: String,
    #[serde(default)]
    pub error: Option<String>,
}

impl SendRawTxResult {
    pub fn is_accepted(&self) -> bool {
        self.status == "OK"
    }
}

/// Request body for `/getrandom_outs`.
#[derive(Debug, Clone, Serialize)]
pub struct RandomOutsRequest<'a> {
    pub amounts: &'a [u64],
    pub outs_count: u64,
}

// =============================================================================
// DaemonRpc
// =============================================================================

/// Async RPC client for the Kestrel daemon.
pub struct DaemonRpc {
    client: RpcClient,
}

impl DaemonRpc {
    /// Create a daemon RPC client connected to the given URL.
    pub fn new(url: &str) -> Result<Self, RpcError> {
        Ok(Self {
            client: RpcClient::new(url)?,
        })
    }

    /// Create with full configuration.
    pub fn with_config(config: RpcConfig) -> Result<Self, RpcError> {
        Ok(Self {
            client: RpcClient::with_config(config)?,
        })
    }

    /// Get the underlying RPC client for custom calls.
    pub fn client(&self) -> &RpcClient {
        &self.client
    }

    /// Get daemon info (height, sync status, peers).
    pub async fn get_info(&self) -> Result<DaemonInfo, RpcError> {
        let val = self.client.get("/info").await?;
        Ok(serde_json::from_value(val)?)
    }

    /// Get the fee this node charges for relaying a transaction.
    ///
    /// An amount of zero means the node charges nothing.
    pub async fn get_fee_info(&self) -> Result<FeeInfo, RpcError> {
        let val = self.client.get("/fee").await?;
        Ok(serde_json::from_value(val)?)
    }

    /// Fetch `outs_count` random outputs for every amount in one request.
    pub async fn get_random_outs(
        &self,
        amounts: &[u64],
        outs_count: u64,
    ) -> Result<Vec<RandomOutsForAmount>, RpcError> {
        let body = serde_json::to_value(RandomOutsRequest { amounts, outs_count })?;
        let val = self.client.post("/getrandom_outs", &body).await?;
        let outs = val
            .get("outs")
            .ok_or(RpcError::NoResult { context: "getrandom_outs".into() })?;
        Ok(serde_json::from_value(outs.clone())?)
    }

    /// Submit a hex-encoded transaction for relay.
    pub async fn send_raw_transaction(&self, tx_as_hex: &str) -> Result<SendRawTxResult, RpcError> {
        let val = self
            .client
            .post(
                "/sendrawtransaction",
                &serde_json::json!({ "tx_as_hex": tx_as_hex }),
            )
            .await?;
        Ok(serde_json::from_value(val)?)
    }
}
