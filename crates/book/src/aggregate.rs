//! The immutable order book aggregate.
//!
//! Built once, in row order, from a finished feed. A feed without a single
//! valid row yields the empty aggregate: no sets, series, histories, walls
//! or variations.

use crate::compactor::{build_history, LevelHistory};
use crate::distinct::DistinctLevels;
use crate::ledger::ingest;
use crate::variation::Variation;
use crate::wall::{last_wall, Wall};
use orderstream_core::{BestQuote, BuildStep, FeedRow, LevelEntry, PerSide, Price, Side, Size};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// One price of a depth ladder with its leading compacted sizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LadderRow {
    pub price: Price,
    pub sizes: Vec<Size>,
}

/// Consolidated per-price history of one feed.
#[derive(Debug, Clone)]
pub struct OrderBookAggregate {
    label: String,
    instrument: String,
    book_depth: usize,
    row_count: usize,
    distinct: DistinctLevels,
    best_series: Vec<BestQuote>,
    spread_series: Vec<Price>,
    level_history: PerSide<LevelHistory>,
    last_wall: PerSide<Wall>,
    variation: PerSide<Option<Variation>>,
}

impl OrderBookAggregate {
    /// The aggregate of a feed with no valid rows.
    pub fn empty(label: impl Into<String>, book_depth: usize) -> Self {
        Self {
            label: label.into(),
            instrument: String::new(),
            book_depth,
            row_count: 0,
            distinct: DistinctLevels::default(),
            best_series: Vec::new(),
            spread_series: Vec::new(),
            level_history: PerSide::default(),
            last_wall: PerSide::default(),
            variation: PerSide::default(),
        }
    }

    /// Build the aggregate of `rows`, which must be in feed order.
    ///
    /// `book_depth` is carried for renderers; the engine keeps full histories.
    pub fn build(label: impl Into<String>, rows: &[FeedRow], book_depth: usize) -> Self {
        Self::build_tracked(label, rows, book_depth, &mut |_: BuildStep| {})
    }

    /// Like [`build`](Self::build), reporting each step to `on_step` before it
    /// runs, so a failure can be located.
    pub fn build_tracked(
        label: impl Into<String>,
        rows: &[FeedRow],
        book_depth: usize,
        on_step: &mut dyn FnMut(BuildStep),
    ) -> Self {
        let label = label.into();
        let instrument = rows.first().map(|r| r.instrument.clone()).unwrap_or_default();

        on_step(BuildStep::Ingest);
        let ingested = ingest(rows);
        if ingested.is_empty() {
            warn!(feed = %label, rows = rows.len(), "no valid rows, aggregate is empty");
            let mut empty = Self::empty(label, book_depth);
            empty.instrument = instrument;
            empty.row_count = rows.len();
            return empty;
        }

        on_step(BuildStep::Compact);
        let distinct = DistinctLevels::from_ingested(&ingested);
        let level_history = PerSide::new(
            build_history(&distinct.prices.bid, &ingested.ledgers.bid),
            build_history(&distinct.prices.ask, &ingested.ledgers.ask),
        );
        let variation = PerSide::new(
            Variation::for_side(&ingested.best_series, Side::Bid),
            Variation::for_side(&ingested.best_series, Side::Ask),
        );
        debug!(
            feed = %label,
            bid_levels = level_history.bid.len(),
            ask_levels = level_history.ask.len(),
            "compacted level histories"
        );

        on_step(BuildStep::Wall);
        let last_wall = last_wall(rows);

        let aggregate = Self {
            label,
            instrument,
            book_depth,
            row_count: ingested.row_count,
            distinct,
            best_series: ingested.best_series,
            spread_series: ingested.spread_series,
            level_history,
            last_wall,
            variation,
        };

        info!(
            feed = %aggregate.label,
            instrument = %aggregate.instrument,
            rows = aggregate.row_count,
            valid = aggregate.valid_row_count(),
            "built order book aggregate"
        );
        aggregate
    }

    /// Feed label, usually its path.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Instrument of the first row.
    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    /// Rendering depth the aggregate was built for.
    pub fn book_depth(&self) -> usize {
        self.book_depth
    }

    /// Rows in the feed, valid or not.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn valid_row_count(&self) -> usize {
        self.best_series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.best_series.is_empty()
    }

    /// Distinct best-of-book prices of one side, ascending.
    pub fn distinct_prices(&self, side: Side) -> &BTreeSet<Price> {
        self.distinct.prices.get(side)
    }

    /// Distinct best-of-book sizes of one side, ascending.
    pub fn distinct_sizes(&self, side: Side) -> &BTreeSet<Size> {
        self.distinct.sizes.get(side)
    }

    /// Bid prices, best (highest) first.
    pub fn bid_prices_desc(&self) -> impl Iterator<Item = Price> + '_ {
        self.distinct.prices.bid.iter().rev().copied()
    }

    /// Ask prices, best (lowest) first.
    pub fn ask_prices_asc(&self) -> impl Iterator<Item = Price> + '_ {
        self.distinct.prices.ask.iter().copied()
    }

    /// Best bid/ask per valid row.
    pub fn best_series(&self) -> &[BestQuote] {
        &self.best_series
    }

    /// Spread per valid row, aligned with [`best_series`](Self::best_series).
    pub fn spread_series(&self) -> &[Price] {
        &self.spread_series
    }

    pub fn level_history(&self, side: Side) -> &LevelHistory {
        self.level_history.get(side)
    }

    /// Compacted entries of one price, oldest first.
    pub fn history_at(&self, side: Side, price: Price) -> Option<&[LevelEntry]> {
        self.level_history.get(side).get(&price).map(Vec::as_slice)
    }

    pub fn wall(&self, side: Side) -> &Wall {
        self.last_wall.get(side)
    }

    pub fn variation(&self, side: Side) -> Option<&Variation> {
        self.variation.get(side).as_ref()
    }

    /// Prices in display order (bids descending, asks ascending), each with
    /// at most `depth` leading compacted sizes.
    pub fn ladder(&self, side: Side, depth: usize) -> Vec<LadderRow> {
        let row = |price: Price| LadderRow {
            price,
            sizes: self
                .history_at(side, price)
                .unwrap_or(&[])
                .iter()
                .take(depth)
                .map(|e| e.size)
                .collect(),
        };
        match side {
            Side::Bid => self.bid_prices_desc().map(row).collect(),
            Side::Ask => self.ask_prices_asc().map(row).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orderstream_core::{PriceSize, RowIndex};
    use proptest::prelude::*;

    fn make_row(bid: PriceSize, ask: PriceSize, bids: &[(Price, Size)], asks: &[(Price, Size)]) -> FeedRow {
        FeedRow {
            instrument: "FDAX".to_string(),
            timestamp: "20180912-09:00:00.000".to_string(),
            status: "T".to_string(),
            best_bid: bid,
            best_ask: ask,
            bid_levels: bids.iter().map(|&(p, s)| PriceSize::new(p, s)).collect(),
            ask_levels: asks.iter().map(|&(p, s)| PriceSize::new(p, s)).collect(),
        }
    }

    fn entries(pairs: &[(Size, RowIndex)]) -> Vec<LevelEntry> {
        pairs.iter().map(|&(s, r)| LevelEntry::new(s, r)).collect()
    }

    fn session() -> Vec<FeedRow> {
        [10, 10, 20, 20, 10]
            .iter()
            .map(|&size| {
                make_row(
                    PriceSize::new(100, size),
                    PriceSize::new(102, 5),
                    &[(100, size), (99, 3)],
                    &[(102, 5)],
                )
            })
            .collect()
    }

    #[test]
    fn test_compacted_history() {
        let agg = OrderBookAggregate::build("a.csv", &session(), 5);

        assert_eq!(
            agg.history_at(Side::Bid, 100).unwrap(),
            entries(&[(10, 0), (20, 2), (10, 4)]).as_slice()
        );
        assert_eq!(agg.history_at(Side::Ask, 102).unwrap(), entries(&[(5, 0)]).as_slice());
        // Depth-only prices are not best-of-book and get no history.
        assert!(agg.history_at(Side::Bid, 99).is_none());
    }

    #[test]
    fn test_metadata_and_series() {
        let agg = OrderBookAggregate::build("a.csv", &session(), 3);

        assert_eq!(agg.label(), "a.csv");
        assert_eq!(agg.instrument(), "FDAX");
        assert_eq!(agg.book_depth(), 3);
        assert_eq!(agg.row_count(), 5);
        assert_eq!(agg.valid_row_count(), 5);
        assert_eq!(agg.spread_series(), &[2, 2, 2, 2, 2]);
        assert_eq!(agg.distinct_sizes(Side::Bid).iter().copied().collect::<Vec<_>>(), vec![10, 20]);
        assert_eq!(agg.variation(Side::Bid).unwrap().to_string(), "0.00");
    }

    #[test]
    fn test_variation_per_side() {
        let rows = vec![
            make_row(PriceSize::new(100, 1), PriceSize::new(50, 1), &[], &[]),
            make_row(PriceSize::new(0, 1), PriceSize::new(999, 1), &[], &[]),
            make_row(PriceSize::new(105, 1), PriceSize::new(55, 1), &[], &[]),
            make_row(PriceSize::new(90, 1), PriceSize::new(60, 1), &[], &[]),
        ];
        let agg = OrderBookAggregate::build("a", &rows, 5);

        assert_eq!(agg.variation(Side::Bid).unwrap().to_string(), "-11.11");
        assert_eq!(agg.variation(Side::Ask).unwrap().to_string(), "16.67");
    }

    #[test]
    fn test_zero_valid_rows_is_empty() {
        let rows = vec![
            make_row(PriceSize::new(0, 1), PriceSize::new(101, 1), &[(100, 1)], &[(101, 1)]),
            make_row(PriceSize::new(100, 1), PriceSize::new(0, 1), &[(100, 1)], &[(101, 1)]),
        ];
        let agg = OrderBookAggregate::build("a", &rows, 5);

        assert!(agg.is_empty());
        assert_eq!(agg.row_count(), 2);
        assert!(agg.distinct_prices(Side::Bid).is_empty());
        assert!(agg.distinct_sizes(Side::Ask).is_empty());
        assert!(agg.best_series().is_empty());
        assert!(agg.spread_series().is_empty());
        assert!(agg.level_history(Side::Bid).is_empty());
        assert!(agg.wall(Side::Bid).is_empty());
        assert!(agg.variation(Side::Bid).is_none());
        assert!(agg.variation(Side::Ask).is_none());
    }

    #[test]
    fn test_build_reports_each_step() {
        let mut steps = Vec::new();
        OrderBookAggregate::build_tracked("steps", &session(), 5, &mut |step: BuildStep| steps.push(step));
        assert_eq!(steps, vec![BuildStep::Ingest, BuildStep::Compact, BuildStep::Wall]);

        steps.clear();
        OrderBookAggregate::build_tracked("empty", &[], 5, &mut |step: BuildStep| steps.push(step));
        assert_eq!(steps, vec![BuildStep::Ingest]);
    }

    #[test]
    fn test_no_rows() {
        let agg = OrderBookAggregate::build("a", &[], 5);
        assert!(agg.is_empty());
        assert_eq!(agg.instrument(), "");
    }

    #[test]
    fn test_wall_from_final_row() {
        let mut rows = session();
        rows.push(make_row(
            PriceSize::new(0, 0),
            PriceSize::new(0, 0),
            &[(98, 11), (97, 12)],
            &[(103, 13)],
        ));
        let agg = OrderBookAggregate::build("a", &rows, 5);

        assert_eq!(agg.wall(Side::Bid).by_price.get(&98), Some(&11));
        assert_eq!(agg.wall(Side::Bid).by_size.get(&12), Some(&97));
        assert_eq!(agg.wall(Side::Ask).by_price.get(&103), Some(&13));
    }

    #[test]
    fn test_ladder_order_and_depth() {
        let rows = vec![
            make_row(PriceSize::new(100, 1), PriceSize::new(103, 1), &[(100, 1)], &[(103, 1)]),
            make_row(PriceSize::new(101, 1), PriceSize::new(102, 1), &[(101, 1), (100, 2)], &[(102, 1), (103, 2)]),
            make_row(PriceSize::new(101, 1), PriceSize::new(102, 1), &[(101, 1), (100, 3)], &[(102, 1), (103, 3)]),
        ];
        let agg = OrderBookAggregate::build("a", &rows, 2);

        assert_eq!(agg.bid_prices_desc().collect::<Vec<_>>(), vec![101, 100]);
        assert_eq!(agg.ask_prices_asc().collect::<Vec<_>>(), vec![102, 103]);

        let bids = agg.ladder(Side::Bid, 2);
        assert_eq!(bids[0], LadderRow { price: 101, sizes: vec![1] });
        assert_eq!(bids[1], LadderRow { price: 100, sizes: vec![1, 2] });

        let asks = agg.ladder(Side::Ask, 5);
        assert_eq!(asks[1], LadderRow { price: 103, sizes: vec![1, 2, 3] });
    }

    fn arb_rows() -> impl Strategy<Value = Vec<FeedRow>> {
        let level = (95i64..105, 1i64..4);
        let row = (0i64..103, 98i64..108, prop::collection::vec(level.clone(), 0..4), prop::collection::vec(level, 0..4))
            .prop_map(|(bid, ask, bids, asks)| {
                let mut bids: Vec<(Price, Size)> = bids;
                bids.insert(0, (bid, 2));
                let mut asks: Vec<(Price, Size)> = asks;
                asks.insert(0, (ask, 2));
                make_row(PriceSize::new(bid, 2), PriceSize::new(ask, 2), &bids, &asks)
            });
        prop::collection::vec(row, 0..30)
    }

    proptest! {
        #[test]
        fn prop_history_keys_match_distinct_prices(rows in arb_rows()) {
            let agg = OrderBookAggregate::build("p", &rows, 5);
            for side in Side::BOTH {
                let keys: BTreeSet<Price> = agg.level_history(side).keys().copied().collect();
                prop_assert_eq!(&keys, agg.distinct_prices(side));
            }
        }

        #[test]
        fn prop_series_aligned(rows in arb_rows()) {
            let agg = OrderBookAggregate::build("p", &rows, 5);
            let valid = rows.iter().filter(|r| r.is_valid()).count();
            prop_assert_eq!(agg.best_series().len(), valid);
            prop_assert_eq!(agg.spread_series().len(), valid);
            for (quote, spread) in agg.best_series().iter().zip(agg.spread_series()) {
                prop_assert_eq!(quote.ask - quote.bid, *spread);
            }
        }

        #[test]
        fn prop_histories_have_no_adjacent_duplicates(rows in arb_rows()) {
            let agg = OrderBookAggregate::build("p", &rows, 5);
            for side in Side::BOTH {
                for entries in agg.level_history(side).values() {
                    for pair in entries.windows(2) {
                        prop_assert_ne!(pair[0].size, pair[1].size);
                        prop_assert!(pair[0].row < pair[1].row);
                        prop_assert!(rows[pair[1].row].is_valid());
                    }
                }
            }
        }
    }
}
