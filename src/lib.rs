//! # Seglex Config
//!
//! Configuration and resource provisioning for the Seglex text segmentation
//! engine.
//!
//! ## Features
//!
//! - Tolerant TOML property snapshots (missing resources degrade to empty)
//! - Extension dictionary and stopword path resolution
//! - Bounded, lazily connected database pool for dictionary loading
//! - Copy-and-swap reload with torn-read-free semantics
//! - Explicit context construction plus an optional process-wide instance
//!
//! The segmentation engine itself (dictionaries, tokenizer, scoring) lives
//! in its own crates and consumes this one through [`AnalyzerConfig`].

pub mod config;
pub mod error;

pub use config::{AnalyzerConfig, ConnectionPool, Snapshot};
pub use error::{ConfigError, Result};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
