//! The row source capability.
//!
//! The aggregation engine only ever sees an ordered `Vec<FeedRow>`; which
//! encoding produced it stays behind this trait.

use crate::{CsvFeed, LogFeed};
use orderstream_core::config::{Encoding, FeedConfig};
use orderstream_core::{FeedRow, Result};

/// Produces the full, ordered row sequence of one feed.
pub trait RowSource: Send + Sync {
    /// Human readable name of the feed (usually its path).
    fn label(&self) -> &str;

    /// Read every row, in feed order.
    fn read_rows(&self) -> Result<Vec<FeedRow>>;
}

/// Rows that are already in memory.
#[derive(Debug, Clone)]
pub struct MemorySource {
    label: String,
    rows: Vec<FeedRow>,
}

impl MemorySource {
    pub fn new(label: impl Into<String>, rows: Vec<FeedRow>) -> Self {
        Self {
            label: label.into(),
            rows,
        }
    }
}

impl RowSource for MemorySource {
    fn label(&self) -> &str {
        &self.label
    }

    fn read_rows(&self) -> Result<Vec<FeedRow>> {
        Ok(self.rows.clone())
    }
}

/// Create the source matching a feed's configured encoding.
pub fn open_feed(config: &FeedConfig, max_levels: usize) -> Box<dyn RowSource> {
    match config.encoding {
        Encoding::Csv => Box::new(CsvFeed::new(&config.path, max_levels)),
        Encoding::Log => Box::new(LogFeed::new(&config.path, max_levels)),
    }
}
