//! Pooled database connections for dictionary loading.
//!
//! The pool is built once per load cycle from validated [`DbParams`] and
//! handed to callers as an opaque [`ConnectionPool`]. Connections are
//! established lazily: sizing and parameter problems fail at build time, an
//! unreachable server surfaces on the first acquire. A failed build leaves
//! the configuration with a disabled handle whose every use errors, rather
//! than crashing the process.

use std::io;

use lazy_static::lazy_static;
use sqlx::mysql::{MySql, MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use sqlx::pool::PoolConnection;
use tokio::runtime::{Handle, Runtime};
use tracing::info;

use super::db::DbParams;
use crate::error::{ConfigError, Result};

lazy_static! {
    // Pool maintenance tasks need a Tokio context. Synchronous callers
    // (startup, reload) get this shared single-worker runtime; async callers
    // reuse their own.
    static ref POOL_RUNTIME: io::Result<Runtime> = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("seglex-pool")
        .enable_all()
        .build();
}

fn fallback_runtime() -> Result<&'static Runtime> {
    POOL_RUNTIME.as_ref().map_err(|e| {
        ConfigError::pool_config(format!("failed to start pool maintenance runtime: {e}"))
    })
}

/// Opaque handle over the bounded database connection pool.
///
/// Cheap to clone; clones share the underlying pool. The handle never
/// exposes the raw connection parameters.
#[derive(Debug, Clone)]
pub struct ConnectionPool {
    pool: Option<MySqlPool>,
    connection_string: String,
}

impl ConnectionPool {
    /// A handle with no usable pool behind it.
    pub fn disabled() -> ConnectionPool {
        ConnectionPool {
            pool: None,
            connection_string: String::new(),
        }
    }

    /// Whether a pool was actually built.
    pub fn is_enabled(&self) -> bool {
        self.pool.is_some()
    }

    /// Diagnostic connection string in the fixed
    /// `jdbc:<scheme>://<host>:<port>/<dbname>` form; empty for a disabled
    /// handle.
    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }

    /// Check out a connection.
    ///
    /// Fails with [`ConfigError::PoolDisabled`] if the pool was never built,
    /// or with the driver error if the database is unreachable.
    pub async fn acquire(&self) -> Result<PoolConnection<MySql>> {
        let pool = self.inner()?;
        Ok(pool.acquire().await?)
    }

    /// The underlying pool, for callers issuing queries directly.
    pub fn inner(&self) -> Result<&MySqlPool> {
        self.pool
            .as_ref()
            .ok_or_else(|| ConfigError::pool_disabled("connection pool was not built"))
    }
}

/// Build a pooled connection handle from validated parameters.
///
/// Pool bounds are the totals over all partitions
/// (`partitions × per-partition`). Credentials are set structurally on the
/// connect options, so URL metacharacters in them need no escaping. No
/// connection is attempted here; callable from both sync and async contexts.
pub fn build_pool(params: &DbParams) -> Result<ConnectionPool> {
    let connect_options = MySqlConnectOptions::new()
        .host(params.host())
        .port(params.port_number()?)
        .username(params.user())
        .password(params.password())
        .database(params.dbname());

    let pool_options = MySqlPoolOptions::new()
        .max_connections(params.max_connections())
        .min_connections(params.min_connections());

    let pool = match Handle::try_current() {
        Ok(_) => pool_options.connect_lazy_with(connect_options),
        Err(_) => {
            let runtime = fallback_runtime()?;
            let _guard = runtime.enter();
            pool_options.connect_lazy_with(connect_options)
        }
    };

    let connection_string = params.jdbc_url();
    info!(
        url = %connection_string,
        max_connections = params.max_connections(),
        min_connections = params.min_connections(),
        "connection pool configured"
    );

    Ok(ConnectionPool {
        pool: Some(pool),
        connection_string,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::db::{self, DbParams};
    use crate::config::snapshot::Snapshot;

    fn params() -> DbParams {
        let snapshot = Snapshot::from_pairs([
            (db::DRIVER_KEY, "mysql"),
            (db::HOST_KEY, "127.0.0.1"),
            (db::PORT_KEY, "3306"),
            (db::USER_KEY, "seg"),
            (db::PASSWORD_KEY, "secret"),
            (db::DBNAME_KEY, "lexicon"),
            (db::MAX_CONNS_KEY, "4"),
            (db::MIN_CONNS_KEY, "1"),
            (db::PARTITIONS_KEY, "2"),
        ]);
        DbParams::from_snapshot(&snapshot).unwrap()
    }

    #[test]
    fn test_build_pool_reports_exact_connection_string() {
        // Plain sync caller, no ambient runtime: must not panic.
        let pool = build_pool(&params()).unwrap();

        assert!(pool.is_enabled());
        assert_eq!(
            pool.connection_string(),
            "jdbc:mysql://127.0.0.1:3306/lexicon"
        );
    }

    #[test]
    fn test_build_pool_inside_async_context() {
        tokio_test::block_on(async {
            let pool = build_pool(&params()).unwrap();
            assert!(pool.is_enabled());
            assert_eq!(
                pool.connection_string(),
                "jdbc:mysql://127.0.0.1:3306/lexicon"
            );
        });
    }

    #[test]
    fn test_build_pool_with_metacharacter_credentials() {
        let snapshot = Snapshot::from_pairs([
            (db::DRIVER_KEY, "mysql"),
            (db::HOST_KEY, "127.0.0.1"),
            (db::PORT_KEY, "3306"),
            (db::USER_KEY, "seg@home"),
            (db::PASSWORD_KEY, "p@ss/wo:rd"),
            (db::DBNAME_KEY, "lexicon"),
            (db::MAX_CONNS_KEY, "4"),
            (db::MIN_CONNS_KEY, "1"),
            (db::PARTITIONS_KEY, "2"),
        ]);
        let params = DbParams::from_snapshot(&snapshot).unwrap();

        // Credentials go into the connect options structurally; the build
        // must succeed and keep the diagnostic string pointed at the
        // configured host.
        let pool = build_pool(&params).unwrap();
        assert!(pool.is_enabled());
        assert_eq!(
            pool.connection_string(),
            "jdbc:mysql://127.0.0.1:3306/lexicon"
        );
    }

    #[test]
    fn test_build_pool_rejects_non_numeric_port() {
        let snapshot = Snapshot::from_pairs([
            (db::DRIVER_KEY, "mysql"),
            (db::HOST_KEY, "127.0.0.1"),
            (db::PORT_KEY, "default"),
            (db::USER_KEY, "seg"),
            (db::PASSWORD_KEY, "secret"),
            (db::DBNAME_KEY, "lexicon"),
            (db::MAX_CONNS_KEY, "4"),
            (db::MIN_CONNS_KEY, "1"),
            (db::PARTITIONS_KEY, "2"),
        ]);
        let params = DbParams::from_snapshot(&snapshot).unwrap();

        match build_pool(&params) {
            Err(ConfigError::PoolConfig(msg)) => assert!(msg.contains("db.port")),
            other => panic!("Expected pool configuration error, got {other:?}"),
        }
    }

    #[test]
    fn test_disabled_pool_fails_on_use_not_retrieval() {
        let pool = ConnectionPool::disabled();

        // Retrieval-side accessors never error.
        assert!(!pool.is_enabled());
        assert_eq!(pool.connection_string(), "");

        match pool.inner() {
            Err(ConfigError::PoolDisabled(_)) => {}
            other => panic!("Expected disabled-pool error, got {other:?}"),
        }

        let err = tokio_test::block_on(pool.acquire()).unwrap_err();
        match err {
            ConfigError::PoolDisabled(_) => {}
            other => panic!("Expected disabled-pool error, got {other:?}"),
        }
    }

    #[test]
    fn test_clones_share_the_handle_state() {
        let pool = build_pool(&params()).unwrap();
        let clone = pool.clone();

        assert!(clone.is_enabled());
        assert_eq!(clone.connection_string(), pool.connection_string());
    }
}
