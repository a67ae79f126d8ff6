//! Error types for the Seglex configuration component.
//!
//! All failures are represented by the [`ConfigError`] enum. A missing
//! configuration resource is deliberately *not* an error: the loaders
//! substitute an empty snapshot so that startup never depends on optional
//! resources being present. Errors here cover malformed resources and
//! database pool provisioning.

use std::io;

use thiserror::Error;

/// The error type for configuration and pool provisioning operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// I/O errors while reading configuration resources.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A configuration resource exists but cannot be parsed.
    #[error("Malformed resource: {0}")]
    Malformed(String),

    /// Database pool parameters are missing or invalid.
    #[error("Pool configuration error: {0}")]
    PoolConfig(String),

    /// The connection pool was never built; any use fails with this.
    #[error("Connection pool is disabled: {0}")]
    PoolDisabled(String),

    /// Errors surfaced by the database driver.
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Generic anyhow error.
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with [`ConfigError`].
pub type Result<T> = std::result::Result<T, ConfigError>;

impl ConfigError {
    /// Create a new malformed-resource error.
    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        ConfigError::Malformed(msg.into())
    }

    /// Create a new pool configuration error.
    pub fn pool_config<S: Into<String>>(msg: S) -> Self {
        ConfigError::PoolConfig(msg.into())
    }

    /// Create a new disabled-pool error.
    pub fn pool_disabled<S: Into<String>>(msg: S) -> Self {
        ConfigError::PoolDisabled(msg.into())
    }
}
