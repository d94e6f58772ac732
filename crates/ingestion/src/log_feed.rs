//! Brace-delimited log encoding.
//!
//! One snapshot per line. The timestamp is the first run shaped like
//! `20180912-09:00:00.125`; every other field sits inside `{...}`:
//! instrument, status, data quality, best bid, best ask, bid book, ask book.
//! Prices and sizes are written as `price,size`.

use crate::levels::{digit_run_end, parse_pair, parse_pairs};
use crate::source::RowSource;
use orderstream_core::{Error, FeedRow, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

const FIELD_INSTRUMENT: usize = 0;
const FIELD_STATUS: usize = 1;
const FIELD_BEST_BID: usize = 3;
const FIELD_BEST_ASK: usize = 4;
const FIELD_BID_BOOK: usize = 5;
const FIELD_ASK_BOOK: usize = 6;
const FIELD_COUNT: usize = 7;

/// Reader for the log encoding.
#[derive(Debug, Clone)]
pub struct LogFeed {
    path: PathBuf,
    label: String,
    max_levels: usize,
}

impl LogFeed {
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

    /// Parse rows from any reader.
    pub fn parse<R: Read>(&self, reader: R) -> Result<Vec<FeedRow>> {
        let mut rows = Vec::new();

        for (idx, line) in BufReader::new(reader).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            rows.push(self.parse_line(&line, idx + 1)?);
        }

        debug!(feed = %self.label, rows = rows.len(), "parsed log feed");
        Ok(rows)
    }

    fn parse_line(&self, line: &str, line_no: usize) -> Result<FeedRow> {
        let fields = brace_fields(line);
        if fields.len() < FIELD_COUNT {
            return Err(Error::parse(
                line_no,
                format!("expected {FIELD_COUNT} brace fields, found {}", fields.len()),
            ));
        }

        let pair = |idx: usize| {
            parse_pair(fields[idx])
                .map(Option::unwrap_or_default)
                .map_err(|e| Error::parse(line_no, e))
        };
        let book = |idx: usize| {
            parse_pairs(fields[idx], self.max_levels).map_err(|e| Error::parse(line_no, e))
        };

        // A missing best price leaves it at zero, which marks the row invalid.
        Ok(FeedRow {
            instrument: fields[FIELD_INSTRUMENT].to_string(),
            timestamp: find_timestamp(line).unwrap_or_default().to_string(),
            status: fields[FIELD_STATUS].to_string(),
            best_bid: pair(FIELD_BEST_BID)?,
            best_ask: pair(FIELD_BEST_ASK)?,
            bid_levels: book(FIELD_BID_BOOK)?,
            ask_levels: book(FIELD_ASK_BOOK)?,
        })
    }
}

impl RowSource for LogFeed {
    fn label(&self) -> &str {
        &self.label
    }

    fn read_rows(&self) -> Result<Vec<FeedRow>> {
        let file = File::open(&self.path)?;
        self.parse(file)
    }
}

/// Contents of every `{...}` group, in order.
fn brace_fields(line: &str) -> Vec<&str> {
    let mut fields = Vec::new();
    let mut rest = line;

    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                fields.push(&after[..close]);
                rest = &after[close + 1..];
            }
            None => break,
        }
    }

    fields
}

/// First substring shaped `digits-[digits:]+<sep>digits`, wherever it sits
/// in the line.
fn find_timestamp(line: &str) -> Option<&str> {
    let bytes = line.as_bytes();
    (0..bytes.len())
        .filter(|&i| bytes[i].is_ascii_digit() && (i == 0 || !bytes[i - 1].is_ascii_digit()))
        .find_map(|start| timestamp_end(bytes, start).map(|end| &line[start..end]))
}

/// End of a timestamp starting at the digit run at `start`.
fn timestamp_end(bytes: &[u8], start: usize) -> Option<usize> {
    let date_end = digit_run_end(bytes, start);
    if bytes.get(date_end) != Some(&b'-') {
        return None;
    }

    let clock_start = date_end + 1;
    let mut clock_end = clock_start;
    while clock_end < bytes.len() && (bytes[clock_end].is_ascii_digit() || bytes[clock_end] == b':') {
        clock_end += 1;
    }
    if clock_end == clock_start {
        return None;
    }

    // One separator byte, then at least one digit.
    let fraction_start = clock_end + 1;
    let fraction_end = digit_run_end(bytes, fraction_start);
    (fraction_end > fraction_start).then_some(fraction_end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use orderstream_core::PriceSize;

    fn make_line(ts: &str, bid: &str, ask: &str) -> String {
        format!("INFO {ts} book {{FDAX}}{{T}}{{Q}}{{{bid}}}{{{ask}}}{{12000,3 11999,5 11998,2}}{{12001,4 12002,6}}")
    }

    #[test]
    fn test_parse_line() {
        let text = make_line("20180912-09:00:00.125", "12000,3", "12001,4");
        let rows = LogFeed::new("mem.log", 5).parse(text.as_bytes()).unwrap();

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.instrument, "FDAX");
        assert_eq!(row.status, "T");
        assert_eq!(row.timestamp, "20180912-09:00:00.125");
        assert_eq!(row.best_bid, PriceSize::new(12000, 3));
        assert_eq!(row.best_ask, PriceSize::new(12001, 4));
        assert_eq!(row.bid_levels.len(), 3);
        assert_eq!(row.ask_levels, vec![PriceSize::new(12001, 4), PriceSize::new(12002, 6)]);
    }

    #[test]
    fn test_missing_best_bid_is_invalid_row() {
        let text = make_line("20180912-09:00:00.125", "", "12001,4");
        let rows = LogFeed::new("mem.log", 5).parse(text.as_bytes()).unwrap();
        assert_eq!(rows[0].best_bid, PriceSize::default());
        assert!(!rows[0].is_valid());
    }

    #[test]
    fn test_blank_lines_skipped_and_levels_capped() {
        let text = format!(
            "{}\n\n{}\n",
            make_line("20180912-09:00:00.125", "12000,3", "12001,4"),
            make_line("20180912-09:00:01.000", "12000,2", "12001,4")
        );
        let rows = LogFeed::new("mem.log", 2).parse(text.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].bid_levels.len(), 2);
        assert_eq!(rows[1].best_bid.size, 2);
    }

    #[test]
    fn test_too_few_fields() {
        let text = format!("{}\n{{FDAX}}{{T}}\n", make_line("1-1.1", "1,1", "2,2"));
        let err = LogFeed::new("mem.log", 5).parse(text.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 2, .. }));
    }

    #[test]
    fn test_timestamp_shape() {
        assert_eq!(find_timestamp("INFO 20180912-09:00:00.125 x"), Some("20180912-09:00:00.125"));
        assert_eq!(find_timestamp("book"), None);
        assert_eq!(find_timestamp("2018- x"), None);
        assert_eq!(find_timestamp("x-09:00.1"), None);
        assert_eq!(find_timestamp("no time {A}"), None);
    }

    #[test]
    fn test_timestamp_inside_punctuation() {
        assert_eq!(
            find_timestamp("[20180912-09:00:00.125] book"),
            Some("20180912-09:00:00.125")
        );
        assert_eq!(find_timestamp("at=20180912-09:00:01.5,"), Some("20180912-09:00:01.5"));

        let text = "[20180912-09:00:00.125]{FDAX}{T}{Q}{100,1}{101,1}{100,1}{101,1}";
        let rows = LogFeed::new("mem.log", 5).parse(text.as_bytes()).unwrap();
        assert_eq!(rows[0].timestamp, "20180912-09:00:00.125");
    }

    #[test]
    fn test_brace_fields() {
        assert_eq!(brace_fields("a{1}b{}{x y}{open"), vec!["1", "", "x y"]);
    }
}
