//! Depth wall from the final snapshot of a feed.

use orderstream_core::{FeedRow, PerSide, Price, PriceSize, Side, Size};
use serde::Serialize;
use std::collections::BTreeMap;

/// Price to size and size to price views of one side of a snapshot.
///
/// When a price or a size repeats within the snapshot, the first level in
/// feed order wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Wall {
    pub by_price: BTreeMap<Price, Size>,
    pub by_size: BTreeMap<Size, Price>,
}

impl Wall {
    pub fn from_levels(levels: &[PriceSize]) -> Self {
        let mut wall = Wall::default();
        for level in levels {
            wall.by_price.entry(level.price).or_insert(level.size);
            wall.by_size.entry(level.size).or_insert(level.price);
        }
        wall
    }

    pub fn is_empty(&self) -> bool {
        self.by_price.is_empty()
    }
}

/// Walls of both sides of the last row, valid or not.
pub fn last_wall(rows: &[FeedRow]) -> PerSide<Wall> {
    match rows.last() {
        Some(row) => PerSide::new(
            Wall::from_levels(row.levels(Side::Bid)),
            Wall::from_levels(row.levels(Side::Ask)),
        ),
        None => PerSide::default(),
    }
}
