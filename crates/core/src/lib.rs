//! Core types and configuration for the orderstream system.
//!
//! This crate provides shared types used across all other crates:
//! - Feed row and price level types
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{BuildStep, Error, Result};
pub use types::*;
