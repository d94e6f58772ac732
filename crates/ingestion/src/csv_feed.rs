//! Quoted CSV export encoding.
//!
//! One header line, then one snapshot per record. Depth columns hold runs of
//! `Price: <int> Quantity: <int>` pairs.

use crate::levels::parse_labelled_levels;
use crate::source::RowSource;
use orderstream_core::{Error, FeedRow, PriceSize, Result, Size};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

const COL_INSTRUMENT: usize = 0;
const COL_DATETIME: usize = 1;
const COL_STATUS: usize = 4;
const COL_ASK_PRICE: usize = 7;
const COL_ASK_SIZE: usize = 8;
const COL_BID_PRICE: usize = 9;
const COL_BID_SIZE: usize = 10;
const COL_BID_LEVELS: usize = 11;
const COL_ASK_LEVELS: usize = 12;

/// Reader for the CSV export encoding.
#[derive(Debug, Clone)]
pub struct CsvFeed {
    path: PathBuf,
    label: String,
    max_levels: usize,
}

impl CsvFeed {
    /// Create a reader for `path`, keeping at most `max_levels` levels per side.
    pub fn new(path: impl AsRef<Path>, max_levels: usize) -> Self {
        let path = path.as_ref().to_path_buf();
        let label = path.display().to_string();
        Self {
            path,
            label,
            max_levels,
        }
    }

    /// Parse rows from any reader positioned at the header line.
    pub fn parse<R: Read>(&self, reader: R) -> Result<Vec<FeedRow>> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
            rows.push(self.parse_record(&record, line)?);
        }

        debug!(feed = %self.label, rows = rows.len(), "parsed csv feed");
        Ok(rows)
    }

    fn parse_record(&self, record: &csv::StringRecord, line: usize) -> Result<FeedRow> {
        let field = |idx: usize| {
            record
                .get(idx)
                .ok_or_else(|| Error::parse(line, format!("missing column {idx}")))
        };
        let number = |idx: usize| -> Result<Size> {
            let text = field(idx)?.trim();
            text.parse::<Size>()
                .map_err(|e| Error::parse(line, format!("column {idx} '{text}': {e}")))
        };
        let levels = |idx: usize| -> Result<Vec<PriceSize>> {
            parse_labelled_levels(field(idx)?, self.max_levels).map_err(|e| Error::parse(line, e))
        };

        Ok(FeedRow {
            instrument: field(COL_INSTRUMENT)?.to_string(),
            timestamp: field(COL_DATETIME)?.to_string(),
            status: field(COL_STATUS)?.to_string(),
            best_bid: PriceSize::new(number(COL_BID_PRICE)?, number(COL_BID_SIZE)?),
            best_ask: PriceSize::new(number(COL_ASK_PRICE)?, number(COL_ASK_SIZE)?),
            bid_levels: levels(COL_BID_LEVELS)?,
            ask_levels: levels(COL_ASK_LEVELS)?,
        })
    }
}

impl RowSource for CsvFeed {
    fn label(&self) -> &str {
        &self.label
    }

    fn read_rows(&self) -> Result<Vec<FeedRow>> {
        let file = File::open(&self.path)?;
        self.parse(file)
    }
}
