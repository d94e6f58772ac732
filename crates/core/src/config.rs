//! Configuration structures for the orderstream system.

use crate::error::{Error, Result};
use crate::types::Source;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration for a reconciliation session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Session configuration.
    pub session: SessionConfig,
    /// Feed locations.
    pub sources: SourcesConfig,
    /// Report output configuration.
    pub report: ReportConfig,
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: Config = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the parsers and renderers cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.session.max_book_levels == 0 {
            return Err(Error::config("session.max_book_levels must be at least 1"));
        }
        if self.session.book_depth == 0 {
            return Err(Error::config("session.book_depth must be at least 1"));
        }
        Ok(())
    }

    /// Feed configuration for one source.
    pub fn feed(&self, source: Source) -> &FeedConfig {
        match source {
            Source::A => &self.sources.primary,
            Source::B => &self.sources.secondary,
        }
    }
}

/// Session-wide limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Maximum levels captured per row per side.
    pub max_book_levels: usize,
    /// Number of compacted entries per price shown by renderers.
    pub book_depth: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_book_levels: 5,
            book_depth: 5,
        }
    }
}

/// Text encoding of a feed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// Quoted CSV export with a header line.
    Csv,
    /// Brace-delimited log lines.
    Log,
}

/// Location and encoding of one feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Path to the feed file.
    pub path: PathBuf,
    /// Feed encoding.
    pub encoding: Encoding,
}

/// The two feeds of a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Source A.
    pub primary: FeedConfig,
    /// Source B.
    pub secondary: FeedConfig,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            primary: FeedConfig {
                path: PathBuf::from("feed.csv"),
                encoding: Encoding::Csv,
            },
            secondary: FeedConfig {
                path: PathBuf::from("feed.log"),
                encoding: Encoding::Log,
            },
        }
    }
}

/// Report output configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Log a text summary of both books.
    pub console_output: bool,
    /// Write the JSON report to this path.
    pub output: Option<PathBuf>,
}
