//! Row filtering and per-price ledgers.
//!
//! Invalid rows are skipped but still consume a row index, so every ledger
//! observation points back at its position in the unfiltered feed.

use orderstream_core::{BestQuote, FeedRow, LevelEntry, PerSide, Price, RowIndex, Side, Size};
use std::collections::BTreeMap;
use tracing::debug;

/// Chronological size observations per price for one side.
#[derive(Debug, Clone, Default)]
pub struct PriceLedger {
    entries: BTreeMap<Price, Vec<LevelEntry>>,
}

impl PriceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `size` at `price` for `row`.
    ///
    /// Rows must arrive in ascending order. A second observation of the same
    /// price within one row is dropped; returns whether the observation was kept.
    pub fn record(&mut self, price: Price, row: RowIndex, size: Size) -> bool {
        let observations = self.entries.entry(price).or_default();
        if let Some(last) = observations.last() {
            debug_assert!(last.row <= row, "ledger rows must be ascending");
            if last.row == row {
                return false;
            }
        }
        observations.push(LevelEntry::new(size, row));
        true
    }

    /// Observations for `price`, oldest first. Empty if the price was never quoted.
    pub fn observations(&self, price: Price) -> &[LevelEntry] {
        self.entries.get(&price).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All prices in ascending order.
    pub fn prices(&self) -> impl Iterator<Item = Price> + '_ {
        self.entries.keys().copied()
    }

    /// Number of distinct prices.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Output of the ingestion filter.
#[derive(Debug, Clone, Default)]
pub struct Ingested {
    /// Depth ledgers built from valid rows.
    pub ledgers: PerSide<PriceLedger>,
    /// Best bid/ask per valid row, in row order.
    pub best_series: Vec<BestQuote>,
    /// Best ask minus best bid, aligned with `best_series`.
    pub spread_series: Vec<Price>,
    /// Best-of-book sizes per valid row, aligned with `best_series`.
    pub best_sizes: PerSide<Vec<Size>>,
    /// Rows seen, valid or not.
    pub row_count: usize,
    /// Observations dropped because the price repeated within a row.
    pub duplicate_levels: usize,
}

impl Ingested {
    /// True when no row passed the validity filter.
    pub fn is_empty(&self) -> bool {
        self.best_series.is_empty()
    }

    /// Number of valid rows.
    pub fn valid_count(&self) -> usize {
        self.best_series.len()
    }
}

/// Filter rows and build ledgers and best-of-book series in one pass.
pub fn ingest(rows: &[FeedRow]) -> Ingested {
    let mut out = Ingested {
        row_count: rows.len(),
        ..Default::default()
    };

    for (row_index, row) in rows.iter().enumerate() {
        if !row.is_valid() {
            continue;
        }

        let quote = row.best_quote();
        out.best_series.push(quote);
        out.spread_series.push(quote.spread());

        for side in Side::BOTH {
            out.best_sizes.get_mut(side).push(row.best(side).size);

            let ledger = out.ledgers.get_mut(side);
            for level in row.levels(side) {
                if !ledger.record(level.price, row_index, level.size) {
                    out.duplicate_levels += 1;
                }
            }
        }
    }

    debug!(
        rows = out.row_count,
        valid = out.valid_count(),
        bid_prices = out.ledgers.bid.len(),
        ask_prices = out.ledgers.ask.len(),
        duplicates = out.duplicate_levels,
        "ingested rows"
    );

    out
}
