//! Serializable session report.
//!
//! Everything a renderer needs from a finished session, with ladders already
//! cut to the configured book depth.

use crate::reconciler::Reconciliation;
use crate::session::Session;
use orderstream_book::{LadderRow, OrderBookAggregate, Variation, Wall};
use orderstream_core::{PerSide, Price, Result, Side, Source};
use serde::Serialize;
use std::path::Path;

/// Summary of one feed.
#[derive(Debug, Clone, Serialize)]
pub struct FeedSummary {
    pub source: Source,
    pub label: String,
    pub instrument: String,
    pub rows: usize,
    pub valid_rows: usize,
    pub bid_variation: Option<Variation>,
    pub ask_variation: Option<Variation>,
    pub last_spread: Option<Price>,
    pub spread_series: Vec<Price>,
    pub wall: PerSide<Wall>,
    pub ladder: PerSide<Vec<LadderRow>>,
}

impl FeedSummary {
    pub fn new(source: Source, aggregate: &OrderBookAggregate) -> Self {
        let depth = aggregate.book_depth();
        Self {
            source,
            label: aggregate.label().to_string(),
            instrument: aggregate.instrument().to_string(),
            rows: aggregate.row_count(),
            valid_rows: aggregate.valid_row_count(),
            bid_variation: aggregate.variation(Side::Bid).copied(),
            ask_variation: aggregate.variation(Side::Ask).copied(),
            last_spread: aggregate.spread_series().last().copied(),
            spread_series: aggregate.spread_series().to_vec(),
            wall: PerSide::new(aggregate.wall(Side::Bid).clone(), aggregate.wall(Side::Ask).clone()),
            ladder: PerSide::new(aggregate.ladder(Side::Bid, depth), aggregate.ladder(Side::Ask, depth)),
        }
    }

    fn variation_text(variation: Option<&Variation>) -> String {
        variation.map(|v| format!("{v}%")).unwrap_or_else(|| "n/a".to_string())
    }

    /// One-line text summary.
    pub fn summary_line(&self) -> String {
        format!(
            "{} [{}] {}: {} rows ({} valid), bid {} ask {}",
            self.source,
            self.label,
            self.instrument,
            self.rows,
            self.valid_rows,
            Self::variation_text(self.bid_variation.as_ref()),
            Self::variation_text(self.ask_variation.as_ref()),
        )
    }
}

/// Report of a reconciled session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub feeds: Vec<FeedSummary>,
    pub reconciliation: Reconciliation,
}

impl SessionReport {
    pub fn from_session(session: &Session) -> Self {
        Self {
            feeds: vec![
                FeedSummary::new(Source::A, &session.a),
                FeedSummary::new(Source::B, &session.b),
            ],
            reconciliation: session.reconciliation.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Text summary: one line per feed, then one line per reconciled price.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.feeds.iter().map(FeedSummary::summary_line).collect();
        for side in Side::BOTH {
            for (price, diff) in self.reconciliation.side(side) {
                lines.push(format!("{side} {price}: diff {diff}"));
            }
        }
        lines
    }
}
