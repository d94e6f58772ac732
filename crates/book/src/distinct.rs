//! Distinct best-of-book price and size sets.

use crate::ledger::Ingested;
use orderstream_core::{PerSide, Price, Side, Size};
use serde::Serialize;
use std::collections::BTreeSet;

/// Ascending sets of the prices and sizes seen at the top of the book.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DistinctLevels {
    pub prices: PerSide<BTreeSet<Price>>,
    pub sizes: PerSide<BTreeSet<Size>>,
}

impl DistinctLevels {
    /// Collect the sets from the best-of-book series of valid rows.
    pub fn from_ingested(ingested: &Ingested) -> Self {
        let prices = PerSide::new(
            ingested.best_series.iter().map(|q| q.price(Side::Bid)).collect(),
            ingested.best_series.iter().map(|q| q.price(Side::Ask)).collect(),
        );
        let sizes = PerSide::new(
            ingested.best_sizes.bid.iter().copied().collect(),
            ingested.best_sizes.ask.iter().copied().collect(),
        );
        Self { prices, sizes }
    }

    pub fn is_empty(&self) -> bool {
        self.prices.bid.is_empty() && self.prices.ask.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::ingest;
    use orderstream_core::{FeedRow, PriceSize};

    fn make_row(bid: PriceSize, ask: PriceSize) -> FeedRow {
        FeedRow {
            best_bid: bid,
            best_ask: ask,
            ..Default::default()
        }
    }

    #[test]
    fn test_sets_are_sorted_and_deduplicated() {
        let rows = vec![
            make_row(PriceSize::new(102, 7), PriceSize::new(105, 3)),
            make_row(PriceSize::new(100, 2), PriceSize::new(104, 3)),
            make_row(PriceSize::new(0, 99), PriceSize::new(90, 99)),
            make_row(PriceSize::new(102, 2), PriceSize::new(105, 1)),
        ];
        let distinct = DistinctLevels::from_ingested(&ingest(&rows));

        assert_eq!(distinct.prices.bid.iter().copied().collect::<Vec<_>>(), vec![100, 102]);
        assert_eq!(distinct.prices.ask.iter().copied().collect::<Vec<_>>(), vec![104, 105]);
        assert_eq!(distinct.sizes.bid.iter().copied().collect::<Vec<_>>(), vec![2, 7]);
        assert_eq!(distinct.sizes.ask.iter().copied().collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn test_empty() {
        assert!(DistinctLevels::from_ingested(&ingest(&[])).is_empty());
    }
}
