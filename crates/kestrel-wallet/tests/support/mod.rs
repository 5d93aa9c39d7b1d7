//! In-process collaborators for send pipeline tests.

#![allow(dead_code)]

use async_trait::async_trait;
use kestrel_types::address::create_address;
use kestrel_types::base58::keccak256;
use kestrel_types::{Network, PaymentId};
use kestrel_wallet::{
    BuiltTransaction, DecoyBucket, KeyImageDerivation, LedgerError, LedgerService, MemoryWallet,
    NetworkCodec, NodeFee, OwnedInput, RingParticipant, SendConfig, SignerError, StoredOutput,
    TransactionDraft, TransactionSender, TransactionSigner,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub const HEIGHT: u64 = 900_000;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn address(seed: u8) -> String {
    create_address(Network::Mainnet, &[seed; 32], &[seed.wrapping_add(100); 32], None)
}

pub fn integrated(seed: u8, payment_id: u8) -> String {
    let pid = PaymentId::from_bytes([payment_id; 32]);
    create_address(Network::Mainnet, &[seed; 32], &[seed.wrapping_add(100); 32], Some(&pid))
}

pub fn alice() -> String {
    address(1)
}

pub fn bob() -> String {
    address(2)
}

pub fn node() -> String {
    address(3)
}

// ─── Ledger ──────────────────────────────────────────────────────────────────

pub enum Decoys {
    /// `count` outputs per requested amount, global indices `0..count`.
    Generated,
    Fixed(Vec<DecoyBucket>),
    Fail,
    Hang,
}

pub enum Submit {
    Accept,
    Refuse,
    Fail,
    Hang,
}

pub struct FakeLedger {
    pub height: u64,
    pub node_fee: NodeFee,
    pub decoys: Decoys,
    pub submit: Submit,
    pub fetch_calls: AtomicUsize,
    pub submit_calls: AtomicUsize,
    pub height_reads: AtomicUsize,
    pub last_fetch: Mutex<Option<(Vec<u64>, u64)>>,
    pub submitted: Mutex<Vec<Vec<u8>>>,
}

impl FakeLedger {
    pub fn new() -> Self {
        Self {
            height: HEIGHT,
            node_fee: NodeFee::default(),
            decoys: Decoys::Generated,
            submit: Submit::Accept,
            fetch_calls: AtomicUsize::new(0),
            submit_calls: AtomicUsize::new(0),
            height_reads: AtomicUsize::new(0),
            last_fetch: Mutex::new(None),
            submitted: Mutex::new(Vec::new()),
        }
    }

    pub fn with_height(mut self, height: u64) -> Self {
        self.height = height;
        self
    }

    pub fn with_node_fee(mut self, address: String, amount: u64) -> Self {
        self.node_fee = NodeFee { address, amount };
        self
    }

    pub fn with_decoys(mut self, decoys: Decoys) -> Self {
        self.decoys = decoys;
        self
    }

    pub fn with_submit(mut self, submit: Submit) -> Self {
        self.submit = submit;
        self
    }

    pub fn fetches(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn submits(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn height_reads(&self) -> usize {
        self.height_reads.load(Ordering::SeqCst)
    }

    pub fn network_calls(&self) -> usize {
        self.fetches() + self.submits()
    }
}

pub fn bucket(amount: u64, indices: &[u64]) -> DecoyBucket {
    DecoyBucket {
        amount,
        outputs: indices
            .iter()
            .map(|&i| RingParticipant { global_index: i, key: [i as u8; 32] })
            .collect(),
    }
}

#[async_trait]
impl LedgerService for FakeLedger {
    fn current_height(&self) -> u64 {
        self.height_reads.fetch_add(1, Ordering::SeqCst);
        self.height
    }

    fn node_fee(&self) -> NodeFee {
        self.node_fee.clone()
    }

    async fn fetch_decoys(&self, amounts: &[u64], count: u64) -> Result<Vec<DecoyBucket>, LedgerError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_fetch.lock().unwrap() = Some((amounts.to_vec(), count));
        match &self.decoys {
            Decoys::Generated => Ok(amounts
                .iter()
                .map(|&amount| bucket(amount, &(0..count).collect::<Vec<_>>()))
                .collect()),
            Decoys::Fixed(buckets) => Ok(buckets.clone()),
            Decoys::Fail => Err(LedgerError::Unreachable("connection refused".into())),
            Decoys::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(vec![])
            }
        }
    }

    async fn submit_transaction(&self, raw: &[u8]) -> Result<bool, LedgerError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        self.submitted.lock().unwrap().push(raw.to_vec());
        match self.submit {
            Submit::Accept => Ok(true),
            Submit::Refuse => Ok(false),
            Submit::Fail => Err(LedgerError::Malformed("unexpected body".into())),
            Submit::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(true)
            }
        }
    }
}

// ─── Signer ──────────────────────────────────────────────────────────────────

/// Serializes a draft into a byte string and hashes it with Keccak-256.
pub struct FakeSigner {
    pub fail_build: Option<String>,
    pub padding: usize,
    pub last_draft: Mutex<Option<TransactionDraft>>,
}

impl FakeSigner {
    pub fn new() -> Self {
        Self {
            fail_build: None,
            padding: 0,
            last_draft: Mutex::new(None),
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            fail_build: Some(msg.to_string()),
            ..Self::new()
        }
    }

    pub fn padded(padding: usize) -> Self {
        Self {
            padding,
            ..Self::new()
        }
    }

    pub fn last_draft(&self) -> TransactionDraft {
        self.last_draft.lock().unwrap().clone().expect("no draft built")
    }
}

impl TransactionSigner for FakeSigner {
    fn derive_key_image(
        &self,
        tx_public_key: &[u8; 32],
        _private_view_key: &[u8; 32],
        _public_spend_key: &[u8; 32],
        private_spend_key: &[u8; 32],
        output_index: u64,
    ) -> Result<KeyImageDerivation, SignerError> {
        let mut preimage = tx_public_key.to_vec();
        preimage.extend_from_slice(&output_index.to_le_bytes());
        Ok(KeyImageDerivation {
            key_image: keccak256(&preimage),
            ephemeral_secret: *private_spend_key,
        })
    }

    fn build_transaction(&self, draft: &TransactionDraft) -> Result<BuiltTransaction, SignerError> {
        if let Some(msg) = &self.fail_build {
            return Err(SignerError::new(msg.clone()));
        }
        *self.last_draft.lock().unwrap() = Some(draft.clone());

        let mut raw = Vec::new();
        for input in &draft.inputs {
            raw.extend_from_slice(&input.key_image);
            raw.extend_from_slice(&input.amount.to_le_bytes());
        }
        for ring in &draft.ring_participants {
            for member in ring {
                raw.extend_from_slice(&member.global_index.to_le_bytes());
            }
        }
        for output in &draft.outputs {
            raw.extend_from_slice(&output.spend_public_key);
            raw.extend_from_slice(&output.amount.to_le_bytes());
        }
        raw.extend_from_slice(&draft.fee.to_le_bytes());
        if let Some(pid) = &draft.payment_id {
            raw.extend_from_slice(pid.as_bytes());
        }
        raw.resize(raw.len() + self.padding, 0);

        Ok(BuiltTransaction {
            hash: keccak256(&raw),
            raw,
        })
    }
}

// ─── Wallet ──────────────────────────────────────────────────────────────────

pub fn owned(amount: u64, global_index: u64) -> OwnedInput {
    OwnedInput {
        tx_public_key: keccak256(&global_index.to_le_bytes()),
        output_index: 0,
        global_index,
        amount,
        public_spend_key: [1; 32],
        private_spend_key: [2; 32],
    }
}

/// Alice's wallet holding unlocked outputs of the given amounts at `alice()`.
pub fn wallet_with(amounts: &[u64]) -> MemoryWallet {
    let wallet = MemoryWallet::new(alice(), [7; 32]);
    for (i, &amount) in amounts.iter().enumerate() {
        wallet.add_output(StoredOutput::new(alice(), owned(amount, 100 + i as u64), 1_000));
    }
    wallet
}

pub struct Harness {
    pub ledger: FakeLedger,
    pub wallet: MemoryWallet,
    pub codec: NetworkCodec,
    pub signer: FakeSigner,
    pub config: SendConfig,
}

impl Harness {
    pub fn new(ledger: FakeLedger, wallet: MemoryWallet) -> Self {
        init_logging();
        Self {
            ledger,
            wallet,
            codec: NetworkCodec::new(Network::Mainnet),
            signer: FakeSigner::new(),
            config: SendConfig::default(),
        }
    }

    pub fn with_signer(mut self, signer: FakeSigner) -> Self {
        self.signer = signer;
        self
    }

    pub fn with_config(mut self, config: SendConfig) -> Self {
        self.config = config;
        self
    }

    pub fn sender(&self) -> TransactionSender<'_> {
        TransactionSender::new(&self.ledger, &self.wallet, &self.codec, &self.signer)
            .with_config(self.config.clone())
    }
}
