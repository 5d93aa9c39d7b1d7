//! Output selection strategies.
//!
//! Picks unlocked outputs covering a needed total. Used by
//! [`MemoryWallet`](crate::memory::MemoryWallet); other wallet
//! implementations are free to select however they like.

use serde::{Deserialize, Serialize};

/// How outputs are picked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    /// Smallest single output that covers the total, else largest first.
    #[default]
    Default,
    /// Fewest inputs.
    LargestFirst,
    /// Consolidates small outputs.
    SmallestFirst,
    Random,
    /// Oldest outputs first.
    Fifo,
}

/// An unlocked output eligible for selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtxoCandidate {
    /// Caller's handle for the output.
    pub slot: usize,
    pub amount: u64,
    pub block_height: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionResult {
    pub selected: Vec<UtxoCandidate>,
    pub total: u64,
}

impl SelectionResult {
    pub fn change(&self, needed: u64) -> u64 {
        self.total.saturating_sub(needed)
    }
}

/// Select candidates covering `needed`, or `None` if they can't.
pub fn select_utxos(
    candidates: &[UtxoCandidate],
    needed: u64,
    strategy: SelectionStrategy,
) -> Option<SelectionResult> {
    if candidates.is_empty() {
        return None;
    }

    match strategy {
        SelectionStrategy::LargestFirst => select_sorted(candidates, needed, true),
        SelectionStrategy::SmallestFirst => select_sorted(candidates, needed, false),
        SelectionStrategy::Random => select_random(candidates, needed),
        SelectionStrategy::Default => select_default(candidates, needed),
        SelectionStrategy::Fifo => select_fifo(candidates, needed),
    }
}

/// Like [`select_utxos`], but never more than `max_inputs` outputs.
///
/// If the strategy needs too many inputs, retries largest-first over the
/// `max_inputs` biggest candidates.
pub fn select_utxos_limited(
    candidates: &[UtxoCandidate],
    needed: u64,
    strategy: SelectionStrategy,
    max_inputs: usize,
) -> Option<SelectionResult> {
    let result = select_utxos(candidates, needed, strategy)?;
    if result.selected.len() <= max_inputs {
        return Some(result);
    }

    let mut largest = candidates.to_vec();
    largest.sort_by(|a, b| b.amount.cmp(&a.amount));
    largest.truncate(max_inputs);
    accumulate(&largest, needed)
}

fn select_sorted(
    candidates: &[UtxoCandidate],
    needed: u64,
    largest_first: bool,
) -> Option<SelectionResult> {
    let mut sorted = candidates.to_vec();
    if largest_first {
        sorted.sort_by(|a, b| b.amount.cmp(&a.amount));
    } else {
        sorted.sort_by_key(|c| c.amount);
    }
    accumulate(&sorted, needed)
}

fn select_random(candidates: &[UtxoCandidate], needed: u64) -> Option<SelectionResult> {
    use rand::seq::SliceRandom;
    let mut shuffled = candidates.to_vec();
    shuffled.shuffle(&mut rand::thread_rng());
    accumulate(&shuffled, needed)
}

fn select_default(candidates: &[UtxoCandidate], needed: u64) -> Option<SelectionResult> {
    let single = candidates
        .iter()
        .filter(|c| c.amount >= needed)
        .min_by_key(|c| c.amount);

    match single {
        Some(best) => Some(SelectionResult {
            selected: vec![*best],
            total: best.amount,
        }),
        None => select_sorted(candidates, needed, true),
    }
}

fn select_fifo(candidates: &[UtxoCandidate], needed: u64) -> Option<SelectionResult> {
    let mut sorted = candidates.to_vec();
    sorted.sort_by_key(|c| c.block_height);
    accumulate(&sorted, needed)
}

/// Take outputs in order until the total is reached.
fn accumulate(ordered: &[UtxoCandidate], needed: u64) -> Option<SelectionResult> {
    let mut selected = Vec::new();
    let mut total = 0u64;

    for candidate in ordered {
        selected.push(*candidate);
        total = total.checked_add(candidate.amount)?;
        if total >= needed {
            return Some(SelectionResult { selected, total });
        }
    }
    None
}
