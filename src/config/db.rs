//! Database connection parameters.
//!
//! [`DbParams`] is a structured view over the flat database configuration
//! snapshot, restricted to the recognized `db.*` key set. All nine keys are
//! required for pool construction; validation failures are pool
//! configuration errors and leave the rest of the system untouched.

use std::fmt;

use super::snapshot::Snapshot;
use crate::error::{ConfigError, Result};

/// Default name of the database configuration resource.
pub const DB_RESOURCE: &str = "dbconfig.toml";

/// Key of the driver identifier.
pub const DRIVER_KEY: &str = "db.driver";
/// Key of the database host.
pub const HOST_KEY: &str = "db.host";
/// Key of the database port.
pub const PORT_KEY: &str = "db.port";
/// Key of the database user.
pub const USER_KEY: &str = "db.user";
/// Key of the database password.
pub const PASSWORD_KEY: &str = "db.password";
/// Key of the database name.
pub const DBNAME_KEY: &str = "db.dbname";
/// Key of the maximum connections per partition.
pub const MAX_CONNS_KEY: &str = "db.maxconns";
/// Key of the minimum connections per partition.
pub const MIN_CONNS_KEY: &str = "db.minconns";
/// Key of the partition count.
pub const PARTITIONS_KEY: &str = "db.partitions";

/// Recognized database drivers.
///
/// The configured driver identifier selects both the native driver and the
/// scheme token of the diagnostic connection string. The mapping is an
/// explicit table; an identifier outside it is a configuration error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    MySql,
    MariaDb,
}

impl Driver {
    /// Resolve a configured driver identifier.
    pub fn from_id(id: &str) -> Result<Driver> {
        match id {
            "mysql" => Ok(Driver::MySql),
            "mariadb" => Ok(Driver::MariaDb),
            other => Err(ConfigError::pool_config(format!(
                "unrecognized database driver: {other}"
            ))),
        }
    }

    /// Scheme token used in the diagnostic connection string.
    pub fn scheme(&self) -> &'static str {
        match self {
            Driver::MySql => "mysql",
            Driver::MariaDb => "mariadb",
        }
    }
}

/// Validated connection parameters for the analyzer database.
///
/// Constructed once per load cycle from the database snapshot. The raw
/// parameters never leave this type; callers get the pool handle instead.
#[derive(Clone)]
pub struct DbParams {
    driver: Driver,
    host: String,
    port: String,
    user: String,
    password: String,
    dbname: String,
    max_per_partition: u32,
    min_per_partition: u32,
    partitions: u32,
}

impl DbParams {
    /// Build parameters from a database configuration snapshot.
    ///
    /// Every `db.*` key is required and the three sizing fields must parse
    /// as integers; anything else is a [`ConfigError::PoolConfig`].
    pub fn from_snapshot(snapshot: &Snapshot) -> Result<DbParams> {
        let driver = Driver::from_id(required(snapshot, DRIVER_KEY)?)?;
        let host = required(snapshot, HOST_KEY)?.to_owned();
        let port = required(snapshot, PORT_KEY)?.to_owned();
        let user = required(snapshot, USER_KEY)?.to_owned();
        let password = required(snapshot, PASSWORD_KEY)?.to_owned();
        let dbname = required(snapshot, DBNAME_KEY)?.to_owned();
        let max_per_partition = numeric(snapshot, MAX_CONNS_KEY)?;
        let min_per_partition = numeric(snapshot, MIN_CONNS_KEY)?;
        let partitions = numeric(snapshot, PARTITIONS_KEY)?;

        Ok(DbParams {
            driver,
            host,
            port,
            user,
            password,
            dbname,
            max_per_partition,
            min_per_partition,
            partitions,
        })
    }

    /// The configured driver.
    pub fn driver(&self) -> Driver {
        self.driver
    }

    /// Upper connection bound: partitions × per-partition maximum.
    pub fn max_connections(&self) -> u32 {
        self.partitions.saturating_mul(self.max_per_partition)
    }

    /// Lower connection bound: partitions × per-partition minimum.
    pub fn min_connections(&self) -> u32 {
        self.partitions.saturating_mul(self.min_per_partition)
    }

    /// Diagnostic connection string in the fixed
    /// `jdbc:<scheme>://<host>:<port>/<dbname>` form. Callers may depend on
    /// this exact format for logging.
    pub fn jdbc_url(&self) -> String {
        format!(
            "jdbc:{}://{}:{}/{}",
            self.driver.scheme(),
            self.host,
            self.port,
            self.dbname
        )
    }

    /// Database host, for the pool builder.
    pub(crate) fn host(&self) -> &str {
        &self.host
    }

    /// Database port as a number. The snapshot carries it as a string; a
    /// non-numeric value is a pool configuration error at build time.
    pub(crate) fn port_number(&self) -> Result<u16> {
        self.port.trim().parse().map_err(|_| {
            ConfigError::pool_config(format!("non-numeric value for {PORT_KEY}: {}", self.port))
        })
    }

    /// Database user, for the pool builder. Never logged.
    pub(crate) fn user(&self) -> &str {
        &self.user
    }

    /// Database password, for the pool builder. Carried verbatim; never
    /// interpolated into a URL and never logged.
    pub(crate) fn password(&self) -> &str {
        &self.password
    }

    /// Database name, for the pool builder.
    pub(crate) fn dbname(&self) -> &str {
        &self.dbname
    }
}

// Credentials must not leak through debug output.
impl fmt::Debug for DbParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbParams")
            .field("driver", &self.driver)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("dbname", &self.dbname)
            .field("max_per_partition", &self.max_per_partition)
            .field("min_per_partition", &self.min_per_partition)
            .field("partitions", &self.partitions)
            .finish()
    }
}

fn required<'a>(snapshot: &'a Snapshot, key: &str) -> Result<&'a str> {
    snapshot
        .get(key)
        .ok_or_else(|| ConfigError::pool_config(format!("missing required key: {key}")))
}

fn numeric(snapshot: &Snapshot, key: &str) -> Result<u32> {
    let raw = required(snapshot, key)?;
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::pool_config(format!("non-numeric value for {key}: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_snapshot() -> Snapshot {
        Snapshot::from_pairs([
            (DRIVER_KEY, "mysql"),
            (HOST_KEY, "127.0.0.1"),
            (PORT_KEY, "3306"),
            (USER_KEY, "seg"),
            (PASSWORD_KEY, "secret"),
            (DBNAME_KEY, "lexicon"),
            (MAX_CONNS_KEY, "4"),
            (MIN_CONNS_KEY, "1"),
            (PARTITIONS_KEY, "2"),
        ])
    }

    #[test]
    fn test_from_snapshot_with_all_keys() {
        let params = DbParams::from_snapshot(&valid_snapshot()).unwrap();

        assert_eq!(params.driver(), Driver::MySql);
        assert_eq!(params.max_connections(), 8);
        assert_eq!(params.min_connections(), 2);
        assert_eq!(params.jdbc_url(), "jdbc:mysql://127.0.0.1:3306/lexicon");
    }

    #[test]
    fn test_from_snapshot_missing_key() {
        // db.maxconns deliberately absent
        let snapshot = Snapshot::from_pairs([
            (DRIVER_KEY, "mysql"),
            (HOST_KEY, "127.0.0.1"),
            (PORT_KEY, "3306"),
            (USER_KEY, "seg"),
            (PASSWORD_KEY, "secret"),
            (DBNAME_KEY, "lexicon"),
            (MIN_CONNS_KEY, "1"),
            (PARTITIONS_KEY, "2"),
        ]);

        let err = DbParams::from_snapshot(&snapshot).unwrap_err();
        assert!(err.to_string().contains("db.maxconns"));
    }

    #[test]
    fn test_from_snapshot_non_numeric_sizing() {
        let snapshot = Snapshot::from_pairs([
            (DRIVER_KEY, "mysql"),
            (HOST_KEY, "127.0.0.1"),
            (PORT_KEY, "3306"),
            (USER_KEY, "seg"),
            (PASSWORD_KEY, "secret"),
            (DBNAME_KEY, "lexicon"),
            (MAX_CONNS_KEY, "lots"),
            (MIN_CONNS_KEY, "1"),
            (PARTITIONS_KEY, "2"),
        ]);

        match DbParams::from_snapshot(&snapshot) {
            Err(ConfigError::PoolConfig(msg)) => {
                assert!(msg.contains("db.maxconns"));
                assert!(msg.contains("lots"));
            }
            other => panic!("Expected pool configuration error, got {other:?}"),
        }
    }

    #[test]
    fn test_driver_table() {
        assert_eq!(Driver::from_id("mysql").unwrap(), Driver::MySql);
        assert_eq!(Driver::from_id("mariadb").unwrap(), Driver::MariaDb);
        assert_eq!(Driver::MySql.scheme(), "mysql");
        assert_eq!(Driver::MariaDb.scheme(), "mariadb");

        match Driver::from_id("postgres") {
            Err(ConfigError::PoolConfig(msg)) => assert!(msg.contains("postgres")),
            other => panic!("Expected pool configuration error, got {other:?}"),
        }
    }

    #[test]
    fn test_mariadb_scheme_in_jdbc_url() {
        let snapshot = Snapshot::from_pairs([
            (DRIVER_KEY, "mariadb"),
            (HOST_KEY, "db.internal"),
            (PORT_KEY, "3307"),
            (USER_KEY, "seg"),
            (PASSWORD_KEY, "secret"),
            (DBNAME_KEY, "lexicon"),
            (MAX_CONNS_KEY, "2"),
            (MIN_CONNS_KEY, "1"),
            (PARTITIONS_KEY, "1"),
        ]);
        let params = DbParams::from_snapshot(&snapshot).unwrap();

        assert_eq!(params.jdbc_url(), "jdbc:mariadb://db.internal:3307/lexicon");
    }

    #[test]
    fn test_credentials_carried_verbatim() {
        // URL metacharacters in credentials must survive untouched; the pool
        // builder consumes them structurally, not through a connection URL.
        let snapshot = Snapshot::from_pairs([
            (DRIVER_KEY, "mysql"),
            (HOST_KEY, "127.0.0.1"),
            (PORT_KEY, "3306"),
            (USER_KEY, "seg@home"),
            (PASSWORD_KEY, "p@ss/wo:rd"),
            (DBNAME_KEY, "lexicon"),
            (MAX_CONNS_KEY, "4"),
            (MIN_CONNS_KEY, "1"),
            (PARTITIONS_KEY, "2"),
        ]);
        let params = DbParams::from_snapshot(&snapshot).unwrap();

        assert_eq!(params.user(), "seg@home");
        assert_eq!(params.password(), "p@ss/wo:rd");
        assert_eq!(params.host(), "127.0.0.1");
        assert_eq!(params.dbname(), "lexicon");
        assert_eq!(params.port_number().unwrap(), 3306);
    }

    #[test]
    fn test_non_numeric_port_rejected_at_pool_build() {
        let snapshot = Snapshot::from_pairs([
            (DRIVER_KEY, "mysql"),
            (HOST_KEY, "127.0.0.1"),
            (PORT_KEY, "default"),
            (USER_KEY, "seg"),
            (PASSWORD_KEY, "secret"),
            (DBNAME_KEY, "lexicon"),
            (MAX_CONNS_KEY, "4"),
            (MIN_CONNS_KEY, "1"),
            (PARTITIONS_KEY, "2"),
        ]);
        let params = DbParams::from_snapshot(&snapshot).unwrap();

        match params.port_number() {
            Err(ConfigError::PoolConfig(msg)) => {
                assert!(msg.contains("db.port"));
                assert!(msg.contains("default"));
            }
            other => panic!("Expected pool configuration error, got {other:?}"),
        }
    }

    #[test]
    fn test_debug_redacts_password() {
        let params = DbParams::from_snapshot(&valid_snapshot()).unwrap();
        let rendered = format!("{params:?}");

        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("secret"));
    }
}
