//! Relay of a built transaction to the daemon.

use crate::capability::{BuiltTransaction, LedgerService};
use crate::error::WalletError;
use std::time::Duration;

/// Submit `built` once and return its hash as hex.
///
/// The ledger's answer decides the error kind: a refusal is
/// [`WalletError::RelayRejected`], anything that prevents an answer
/// (transport error, garbled reply, timeout) is
/// [`WalletError::RelayUnavailable`].
pub async fn relay(
    ledger: &dyn LedgerService,
    built: &BuiltTransaction,
    timeout: Duration,
) -> Result<String, WalletError> {
    let hash = built.hash_hex();
    log::debug!("relaying {} ({} bytes)", hash, built.raw.len());

    match tokio::time::timeout(timeout, ledger.submit_transaction(&built.raw)).await {
        Ok(Ok(true)) => Ok(hash),
        Ok(Ok(false)) => Err(WalletError::RelayRejected(format!(
            "daemon refused transaction {}",
            hash
        ))),
        Ok(Err(e)) => Err(WalletError::RelayUnavailable(e.to_string())),
        Err(_) => Err(WalletError::RelayUnavailable(format!(
            "no relay response within {:?}",
            timeout
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{DecoyBucket, LedgerError, NodeFee};
    use async_trait::async_trait;

    enum Answer {
        Accept,
        Refuse,
        Fail,
        Hang,
    }

    struct Daemon(Answer);

    #[async_trait]
    impl LedgerService for Daemon {
        fn current_height(&self) -> u64 {
            0
        }
        fn node_fee(&self) -> NodeFee {
            NodeFee::default()
        }
        async fn fetch_decoys(&self, _amounts: &[u64], _count: u64) -> Result<Vec<DecoyBucket>, LedgerError> {
            Ok(vec![])
        }
        async fn submit_transaction(&self, _raw: &[u8]) -> Result<bool, LedgerError> {
            match self.0 {
                Answer::Accept => Ok(true),
                Answer::Refuse => Ok(false),
                Answer::Fail => Err(LedgerError::Malformed("not json".into())),
                Answer::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(true)
                }
            }
        }
    }

    fn built() -> BuiltTransaction {
        BuiltTransaction { raw: vec![1, 2, 3], hash: [0x5A; 32] }
    }

    #[tokio::test]
    async fn test_accepted_returns_hash_unchanged() {
        let hash = relay(&Daemon(Answer::Accept), &built(), Duration::from_secs(1)).await.unwrap();
        assert_eq!(hash, "5a".repeat(32));
    }

    #[tokio::test]
    async fn test_refused_is_rejected() {
        let err = relay(&Daemon(Answer::Refuse), &built(), Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, WalletError::RelayRejected(_)));
    }

    #[tokio::test]
    async fn test_garbled_reply_is_unavailable() {
        let err = relay(&Daemon(Answer::Fail), &built(), Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, WalletError::RelayUnavailable(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_unavailable() {
        let err = relay(&Daemon(Answer::Hang), &built(), Duration::from_secs(5)).await.unwrap_err();
        assert!(matches!(err, WalletError::RelayUnavailable(msg) if msg.contains("5s")));
    }
}
