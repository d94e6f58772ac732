//! Price-level reconciliation of two aggregates.
//!
//! Each price's compacted entries are summed per aggregate, and prices quoted
//! by both aggregates report the absolute difference of the two sums. Prices
//! seen by only one aggregate are left out.

use orderstream_book::compactor::summed_sizes;
use orderstream_book::OrderBookAggregate;
use orderstream_core::{Price, Side};
use serde::Serialize;
use std::collections::BTreeMap;

/// Absolute quantity difference per shared price of one side.
pub fn reconcile(a: &OrderBookAggregate, b: &OrderBookAggregate, side: Side) -> BTreeMap<Price, u128> {
    let sums_a = summed_sizes(a.level_history(side));
    let sums_b = summed_sizes(b.level_history(side));

    sums_a
        .iter()
        .filter_map(|(price, sum_a)| sums_b.get(price).map(|sum_b| (*price, sum_a.abs_diff(*sum_b))))
        .collect()
}

/// Reconciliation of both sides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    pub bid: BTreeMap<Price, u128>,
    pub ask: BTreeMap<Price, u128>,
}

impl Reconciliation {
    pub fn between(a: &OrderBookAggregate, b: &OrderBookAggregate) -> Self {
        Self {
            bid: reconcile(a, b, Side::Bid),
            ask: reconcile(a, b, Side::Ask),
        }
    }

    pub fn side(&self, side: Side) -> &BTreeMap<Price, u128> {
        match side {
            Side::Bid => &self.bid,
            Side::Ask => &self.ask,
        }
    }

    /// True when the two feeds share no price on either side.
    pub fn is_empty(&self) -> bool {
        self.bid.is_empty() && self.ask.is_empty()
    }
}
