//! In-memory wallet state.
//!
//! Holds owned outputs per address and answers balance and selection
//! queries. Outputs spent by a relayed transaction stay locked until the
//! caller drops or confirms them. Suitable for tests, tools, and callers
//! that keep their own persistence.

use crate::capability::{FundingSelection, OwnedInput, WalletState};
use crate::utxo::{self, SelectionStrategy, UtxoCandidate};
use kestrel_types::constants::{DIFFICULTY_TARGET, MAX_BLOCK_NUMBER, SPENDABLE_AGE};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// An output owned by one of the wallet's addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredOutput {
    pub address: String,
    pub input: OwnedInput,
    pub block_height: u64,
    pub block_timestamp: u64,
    /// Zero for none, a height below [`MAX_BLOCK_NUMBER`], else a Unix timestamp.
    pub unlock_time: u64,
}

impl StoredOutput {
    pub fn new(address: impl Into<String>, input: OwnedInput, block_height: u64) -> Self {
        Self {
            address: address.into(),
            input,
            block_height,
            block_timestamp: 0,
            unlock_time: 0,
        }
    }

    pub fn with_unlock_time(mut self, unlock_time: u64) -> Self {
        self.unlock_time = unlock_time;
        self
    }

    /// Whether the output can be spent in a block at `height`.
    pub fn is_unlocked(&self, height: u64) -> bool {
        if self.unlock_time == 0 {
            return height >= self.block_height.saturating_add(SPENDABLE_AGE);
        }
        if self.unlock_time < MAX_BLOCK_NUMBER {
            height >= self.unlock_time
        } else {
            let elapsed = height.saturating_sub(self.block_height).saturating_mul(DIFFICULTY_TARGET);
            self.block_timestamp.saturating_add(elapsed) >= self.unlock_time
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    output: StoredOutput,
    /// Hash of the relayed transaction spending this output.
    spent_in: Option<String>,
}

/// [`WalletState`] over a list of outputs held in memory.
#[derive(Debug)]
pub struct MemoryWallet {
    addresses: Vec<String>,
    private_view_key: [u8; 32],
    strategy: SelectionStrategy,
    max_inputs: usize,
    entries: Mutex<Vec<Entry>>,
}

impl MemoryWallet {
    pub fn new(primary_address: impl Into<String>, private_view_key: [u8; 32]) -> Self {
        Self {
            addresses: vec![primary_address.into()],
            private_view_key,
            strategy: SelectionStrategy::Default,
            max_inputs: 16,
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Add a secondary address.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        let address = address.into();
        if !self.addresses.contains(&address) {
            self.addresses.push(address);
        }
        self
    }

    pub fn with_strategy(mut self, strategy: SelectionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_max_inputs(mut self, max_inputs: usize) -> Self {
        self.max_inputs = max_inputs.max(1);
        self
    }

    fn entries(&self) -> MutexGuard<'_, Vec<Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_output(&self, output: StoredOutput) {
        self.entries().push(Entry {
            output,
            spent_in: None,
        });
    }

    /// Outputs locked by the transaction `hash`.
    pub fn spent_by(&self, hash: &str) -> Vec<StoredOutput> {
        self.entries()
            .iter()
            .filter(|e| e.spent_in.as_deref() == Some(hash))
            .map(|e| e.output.clone())
            .collect()
    }

    /// Drop outputs spent by `hash` once it is confirmed.
    pub fn confirm(&self, hash: &str) -> usize {
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|e| e.spent_in.as_deref() != Some(hash));
        before - entries.len()
    }

    /// Release outputs locked by `hash`, e.g. after it left the pool.
    pub fn release(&self, hash: &str) -> usize {
        let mut released = 0;
        for entry in self.entries().iter_mut() {
            if entry.spent_in.as_deref() == Some(hash) {
                entry.spent_in = None;
                released += 1;
            }
        }
        released
    }

    /// Unspent outputs of `from` that are unlocked at `height`, with their slots.
    fn spendable(entries: &[Entry], from: &[String], height: u64) -> Vec<(usize, StoredOutput)> {
        entries
            .iter()
            .enumerate()
            .filter(|(_, e)| {
                e.spent_in.is_none() && from.contains(&e.output.address) && e.output.is_unlocked(height)
            })
            .map(|(slot, e)| (slot, e.output.clone()))
            .collect()
    }
}

impl WalletState for MemoryWallet {
    fn addresses(&self) -> Vec<String> {
        self.addresses.clone()
    }

    fn primary_address(&self) -> String {
        self.addresses[0].clone()
    }

    fn unlocked_balance(&self, from: &[String], height: u64) -> u64 {
        Self::spendable(&self.entries(), from, height)
            .iter()
            .fold(0u64, |acc, (_, o)| acc.saturating_add(o.input.amount))
    }

    fn select_inputs(&self, total: u64, from: &[String], height: u64) -> FundingSelection {
        let entries = self.entries();
        let spendable = Self::spendable(&entries, from, height);
        let candidates: Vec<UtxoCandidate> = spendable
            .iter()
            .map(|(slot, o)| UtxoCandidate {
                slot: *slot,
                amount: o.input.amount,
                block_height: o.block_height,
            })
            .collect();

        match utxo::select_utxos_limited(&candidates, total, self.strategy, self.max_inputs) {
            Some(result) => FundingSelection {
                inputs: result
                    .selected
                    .iter()
                    .map(|c| entries[c.slot].output.input.clone())
                    .collect(),
                covered: result.total,
            },
            None => FundingSelection::default(),
        }
    }

    fn private_view_key(&self) -> [u8; 32] {
        self.private_view_key
    }

    fn on_transaction_sent(&self, hash: &str, spent: &[OwnedInput]) {
        let mut locked = 0;
        for entry in self.entries().iter_mut() {
            if entry.spent_in.is_none() && spent.contains(&entry.output.input) {
                entry.spent_in = Some(hash.to_string());
                locked += 1;
            }
        }
        log::debug!("locked {} outputs spent by {}", locked, hash);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(amount: u64, global_index: u64) -> OwnedInput {
        OwnedInput {
            tx_public_key: [global_index as u8; 32],
            output_index: 0,
            global_index,
            amount,
            public_spend_key: [1; 32],
            private_spend_key: [2; 32],
        }
    }

    fn wallet() -> MemoryWallet {
        let w = MemoryWallet::new("alice", [9; 32]).with_address("alice-savings");
        w.add_output(StoredOutput::new("alice", input(100, 1), 10));
        w.add_output(StoredOutput::new("alice", input(250, 2), 20));
        w.add_output(StoredOutput::new("alice-savings", input(1000, 3), 10));
        w
    }

    fn from(addrs: &[&str]) -> Vec<String> {
        addrs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_unlock_rules() {
        let out = StoredOutput::new("a", input(1, 1), 100);
        assert!(!out.is_unlocked(109));
        assert!(out.is_unlocked(110));

        let by_height = out.clone().with_unlock_time(500);
        assert!(!by_height.is_unlocked(499));
        assert!(by_height.is_unlocked(500));

        let mut by_time = out.with_unlock_time(1_700_000_000);
        by_time.block_timestamp = 1_700_000_000 - 300;
        assert!(!by_time.is_unlocked(109));
        assert!(by_time.is_unlocked(110));
    }

    #[test]
    fn test_time_lock_at_extreme_height() {
        let mut out = StoredOutput::new("a", input(1, 1), 100).with_unlock_time(u64::MAX);
        out.block_timestamp = 1_700_000_000;
        assert!(out.is_unlocked(u64::MAX));
        assert!(!out.is_unlocked(110));
    }

    #[test]
    fn test_balance_per_address_and_height() {
        let w = wallet();
        assert_eq!(w.unlocked_balance(&from(&["alice"]), 25), 100);
        assert_eq!(w.unlocked_balance(&from(&["alice"]), 30), 350);
        assert_eq!(w.unlocked_balance(&from(&["alice", "alice-savings"]), 30), 1350);
        assert_eq!(w.unlocked_balance(&from(&["bob"]), 30), 0);
    }

    #[test]
    fn test_select_only_from_funding_addresses() {
        let w = wallet();
        let selection = w.select_inputs(300, &from(&["alice"]), 30);
        assert_eq!(selection.covered, 350);
        assert!(selection.inputs.iter().all(|i| i.global_index != 3));

        assert_eq!(w.select_inputs(400, &from(&["alice"]), 30), FundingSelection::default());
    }

    #[test]
    fn test_sent_outputs_are_locked_until_released() {
        let w = wallet();
        let spent = vec![input(250, 2)];
        w.on_transaction_sent("tx1", &spent);

        assert_eq!(w.unlocked_balance(&from(&["alice"]), 30), 100);
        assert_eq!(w.spent_by("tx1").len(), 1);

        assert_eq!(w.release("tx1"), 1);
        assert_eq!(w.unlocked_balance(&from(&["alice"]), 30), 350);

        w.on_transaction_sent("tx2", &spent);
        assert_eq!(w.confirm("tx2"), 1);
        assert!(w.spent_by("tx2").is_empty());
        assert_eq!(w.unlocked_balance(&from(&["alice"]), 30), 100);
    }

    #[test]
    fn test_addresses() {
        let w = wallet().with_address("alice");
        assert_eq!(w.addresses(), vec!["alice", "alice-savings"]);
        assert_eq!(w.primary_address(), "alice");
        assert_eq!(w.private_view_key(), [9; 32]);
    }
}
