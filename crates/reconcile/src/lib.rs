//! Cross-feed reconciliation for the orderstream system.
//!
//! This crate provides:
//! - Price-level quantity reconciliation of two aggregates
//! - Independent, parallel builds of both feeds with per-feed failure reporting
//! - A serializable session report for renderers

pub mod reconciler;
pub mod session;
pub mod report;

pub use reconciler::{reconcile, Reconciliation};
pub use session::{build_aggregate, build_pair, Builds, Session};
pub use report::{FeedSummary, SessionReport};
