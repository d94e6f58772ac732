//! Feed ingestion for the orderstream system.
//!
//! This crate handles:
//! - The row source capability shared by every feed encoding
//! - Quoted CSV export parsing
//! - Brace-delimited log parsing
//! - Price/size level extraction with a per-side level cap

pub mod levels;
pub mod source;
pub mod csv_feed;
pub mod log_feed;

pub use csv_feed::CsvFeed;
pub use log_feed::LogFeed;
pub use source::{open_feed, MemorySource, RowSource};
