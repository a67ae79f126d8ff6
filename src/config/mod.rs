//! Configuration subsystem for the Seglex analyzer.
//!
//! Leaves first: [`snapshot`] reads one TOML resource into a flat key-value
//! [`Snapshot`]; [`dictionary`] resolves `;`-separated path lists and owns
//! the canonical dictionary identifiers; [`db`] validates the `db.*` key set
//! into [`DbParams`]; [`pool`] turns parameters into an opaque
//! [`ConnectionPool`] handle. [`analyzer`] composes them all behind
//! [`AnalyzerConfig`].

pub mod analyzer;
pub mod db;
pub mod dictionary;
pub mod pool;
pub mod snapshot;

// Re-export commonly used types
pub use analyzer::{AnalyzerConfig, CONFIG_DIR_ENV};
pub use db::{DbParams, Driver};
pub use dictionary::{MAIN_DICTIONARY, QUANTIFIER_DICTIONARY, resolve_paths};
pub use pool::ConnectionPool;
pub use snapshot::Snapshot;
