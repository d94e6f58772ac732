//! Core data types for the orderstream system.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Integer price in feed ticks.
pub type Price = i64;

/// Integer quantity.
pub type Size = i64;

/// 0-based position of a row in the original, unfiltered feed.
pub type RowIndex = usize;

/// Book side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Bid,
    Ask,
}

impl Side {
    /// Both sides, bid first.
    pub const BOTH: [Side; 2] = [Side::Bid, Side::Ask];
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Bid => f.write_str("bid"),
            Side::Ask => f.write_str("ask"),
        }
    }
}

/// Which of the two independently built feeds a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    A,
    B,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::A => f.write_str("source A"),
            Source::B => f.write_str("source B"),
        }
    }
}

/// A (price, size) pair as quoted by the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PriceSize {
    pub price: Price,
    pub size: Size,
}

impl PriceSize {
    #[inline]
    pub fn new(price: Price, size: Size) -> Self {
        Self { price, size }
    }
}

/// One parsed market-depth snapshot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeedRow {
    /// Instrument identifier.
    pub instrument: String,
    /// Timestamp as found in the feed.
    pub timestamp: String,
    /// Feed status code.
    pub status: String,
    /// Best bid price and size.
    pub best_bid: PriceSize,
    /// Best ask price and size.
    pub best_ask: PriceSize,
    /// Bid levels in feed order.
    pub bid_levels: Vec<PriceSize>,
    /// Ask levels in feed order.
    pub ask_levels: Vec<PriceSize>,
}

impl FeedRow {
    /// A row is valid when both best prices are positive.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.best_bid.price > 0 && self.best_ask.price > 0
    }

    /// Best-of-book for one side.
    #[inline]
    pub fn best(&self, side: Side) -> PriceSize {
        match side {
            Side::Bid => self.best_bid,
            Side::Ask => self.best_ask,
        }
    }

    /// Depth levels for one side.
    #[inline]
    pub fn levels(&self, side: Side) -> &[PriceSize] {
        match side {
            Side::Bid => &self.bid_levels,
            Side::Ask => &self.ask_levels,
        }
    }

    /// Best-of-book prices for this row.
    #[inline]
    pub fn best_quote(&self) -> BestQuote {
        BestQuote {
            bid: self.best_bid.price,
            ask: self.best_ask.price,
        }
    }
}

/// Best bid and best ask prices of a single valid row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestQuote {
    pub bid: Price,
    pub ask: Price,
}

impl BestQuote {
    /// Calculate spread.
    #[inline]
    pub fn spread(&self) -> Price {
        self.ask - self.bid
    }

    /// Price on one side.
    #[inline]
    pub fn price(&self, side: Side) -> Price {
        match side {
            Side::Bid => self.bid,
            Side::Ask => self.ask,
        }
    }
}

/// One run of a compacted level history: the size and the row where the run began.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelEntry {
    pub size: Size,
    pub row: RowIndex,
}

impl LevelEntry {
    #[inline]
    pub fn new(size: Size, row: RowIndex) -> Self {
        Self { size, row }
    }
}

/// A pair of values, one per book side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerSide<T> {
    pub bid: T,
    pub ask: T,
}

impl<T> PerSide<T> {
    pub fn new(bid: T, ask: T) -> Self {
        Self { bid, ask }
    }

    pub fn get(&self, side: Side) -> &T {
        match side {
            Side::Bid => &self.bid,
            Side::Ask => &self.ask,
        }
    }

    pub fn get_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::Bid => &mut self.bid,
            Side::Ask => &mut self.ask,
        }
    }

    /// Apply `f` to both sides.
    pub fn map<U>(self, mut f: impl FnMut(Side, T) -> U) -> PerSide<U> {
        PerSide {
            bid: f(Side::Bid, self.bid),
            ask: f(Side::Ask, self.ask),
        }
    }
}
