//! `orderstream`: build two order book feeds and reconcile them.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use orderstream_core::config::{Encoding, FeedConfig};
use orderstream_core::{Config, Source};
use orderstream_ingestion::open_feed;
use orderstream_reconcile::{Session, SessionReport};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EncodingArg {
    Csv,
    Log,
}

impl From<EncodingArg> for Encoding {
    fn from(arg: EncodingArg) -> Self {
        match arg {
            EncodingArg::Csv => Encoding::Csv,
            EncodingArg::Log => Encoding::Log,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "orderstream")]
#[command(about = "Aggregates two market-depth feeds of one session and reconciles them price by price")]
struct Args {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Feed file for source A
    #[arg(long)]
    primary: Option<PathBuf>,

    /// Encoding of source A
    #[arg(long, value_enum)]
    primary_encoding: Option<EncodingArg>,

    /// Feed file for source B
    #[arg(long)]
    secondary: Option<PathBuf>,

    /// Encoding of source B
    #[arg(long, value_enum)]
    secondary_encoding: Option<EncodingArg>,

    /// Maximum levels captured per row per side
    #[arg(long)]
    max_levels: Option<usize>,

    /// Compacted entries per price shown in the report
    #[arg(long)]
    depth: Option<usize>,

    /// Write the JSON report here
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log a text summary of the session
    #[arg(long)]
    console: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn into_config(self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => Config::default(),
        };

        override_feed(&mut config.sources.primary, self.primary, self.primary_encoding);
        override_feed(&mut config.sources.secondary, self.secondary, self.secondary_encoding);
        if let Some(levels) = self.max_levels {
            config.session.max_book_levels = levels;
        }
        if let Some(depth) = self.depth {
            config.session.book_depth = depth;
        }
        if self.output.is_some() {
            config.report.output = self.output;
        }
        config.report.console_output |= self.console;

        config.validate()?;
        Ok(config)
    }
}

fn override_feed(feed: &mut FeedConfig, path: Option<PathBuf>, encoding: Option<EncodingArg>) {
    if let Some(path) = path {
        feed.path = path;
    }
    if let Some(encoding) = encoding {
        feed.encoding = encoding.into();
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = args.into_config()?;
    let levels = config.session.max_book_levels;
    let a = open_feed(config.feed(Source::A), levels);
    let b = open_feed(config.feed(Source::B), levels);
    info!(primary = a.label(), secondary = b.label(), levels, depth = config.session.book_depth, "starting session");

    let session = Session::run(a.as_ref(), b.as_ref(), &config.session)
        .context("feed difference report was not generated")?;
    let report = SessionReport::from_session(&session);

    if config.report.console_output {
        for line in report.summary_lines() {
            info!("{line}");
        }
    }

    match &config.report.output {
        Some(path) => {
            report
                .write_json(path)
                .with_context(|| format!("writing report {}", path.display()))?;
            info!(path = %path.display(), "report written");
        }
        None => println!("{}", report.to_json()?),
    }

    Ok(())
}
