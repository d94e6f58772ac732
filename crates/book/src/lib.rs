//! Order book aggregation for the orderstream system.
//!
//! This crate handles:
//! - Row filtering and per-price ledgers with row provenance
//! - Distinct best-of-book price and size sets
//! - Run-length compaction of each price level's size history
//! - Best-of-book variation metrics
//! - The last-snapshot depth wall
//!
//! Everything is gathered into one immutable [`OrderBookAggregate`].

pub mod ledger;
pub mod distinct;
pub mod compactor;
pub mod variation;
pub mod wall;
pub mod aggregate;

pub use aggregate::{LadderRow, OrderBookAggregate};
pub use compactor::{compact, LevelHistory, SizeTotal};
pub use distinct::DistinctLevels;
pub use ledger::{ingest, Ingested, PriceLedger};
pub use variation::Variation;
pub use wall::Wall;
