//! Run-length compaction of price level histories.
//!
//! Consecutive observations with the same size collapse into the entry that
//! started the run. A size that comes back after a change starts a new run.

use crate::ledger::PriceLedger;
use orderstream_core::{LevelEntry, Price};
use std::collections::{BTreeMap, BTreeSet};

/// Compacted size history per price.
pub type LevelHistory = BTreeMap<Price, Vec<LevelEntry>>;

/// Collapse consecutive equal sizes, keeping the row where each run began.
pub fn compact<I>(observations: I) -> Vec<LevelEntry>
where
    I: IntoIterator<Item = LevelEntry>,
{
    let mut runs: Vec<LevelEntry> = Vec::new();
    for entry in observations {
        match runs.last() {
            Some(prev) if prev.size == entry.size => {}
            _ => runs.push(entry),
        }
    }
    runs
}

/// Compact the ledger history of every price in `prices`.
///
/// Prices never quoted in the ledger get an empty history so the key set
/// always matches `prices`.
pub fn build_history(prices: &BTreeSet<Price>, ledger: &PriceLedger) -> LevelHistory {
    prices
        .iter()
        .map(|&price| (price, compact(ledger.observations(price).iter().copied())))
        .collect()
}

/// Sum of sizes wide enough that no number of `i64` sizes can overflow it.
pub type SizeTotal = i128;

/// Total size across the compacted entries of every price.
pub fn summed_sizes(history: &LevelHistory) -> BTreeMap<Price, SizeTotal> {
    history
        .iter()
        .map(|(&price, entries)| {
            (price, entries.iter().map(|e| SizeTotal::from(e.size)).sum())
        })
        .collect()
}
