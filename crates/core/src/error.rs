//! Error types for the orderstream system.

use crate::types::Source;
use std::fmt;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Step of an aggregate build, used to locate a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStep {
    /// Reading rows from the feed.
    Read,
    /// Filtering rows into ledgers and series.
    Ingest,
    /// Compacting level histories.
    Compact,
    /// Building the last-snapshot wall.
    Wall,
    /// Joining the build thread.
    Join,
}

impl fmt::Display for BuildStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuildStep::Read => "read",
            BuildStep::Ingest => "ingest",
            BuildStep::Compact => "compact",
            BuildStep::Wall => "wall",
            BuildStep::Join => "join",
        };
        f.write_str(name)
    }
}

/// Main error type for the orderstream system.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A feed line could not be turned into a row.
    #[error("Parse error at line {line}: {reason}")]
    Parse { line: usize, reason: String },

    /// One aggregate build failed.
    #[error("Build of {feed} failed during {step}: {reason}")]
    Build {
        feed: Source,
        step: BuildStep,
        reason: String,
    },

    /// A build produced no valid rows.
    #[error("Aggregate for {feed} is empty")]
    EmptyAggregate { feed: Source },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV decoding error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a parse error for a 1-based line number.
    pub fn parse(line: usize, reason: impl Into<String>) -> Self {
        Error::Parse {
            line,
            reason: reason.into(),
        }
    }

    /// Create a build error tagged with its source and step.
    pub fn build(feed: Source, step: BuildStep, reason: impl Into<String>) -> Self {
        Error::Build {
            feed,
            step,
            reason: reason.into(),
        }
    }

    /// Tag an arbitrary error as a build failure of `feed` at `step`.
    ///
    /// Errors that already carry a build tag are returned unchanged.
    pub fn in_build(self, feed: Source, step: BuildStep) -> Self {
        match self {
            e @ Error::Build { .. } => e,
            other => Error::build(feed, step, other.to_string()),
        }
    }
}
