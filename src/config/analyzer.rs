//! The analyzer-wide configuration context.
//!
//! [`AnalyzerConfig`] composes the database snapshot, the connection pool
//! built from it, and the dictionary snapshot into one context object. The
//! three loads always run in that order, because the pool depends on the
//! database snapshot being in place first.
//!
//! The context is designed to be passed explicitly to consumers
//! ([`AnalyzerConfig::load_from`]); [`AnalyzerConfig::global`] additionally
//! offers one lazily initialized process-wide instance for callers that
//! cannot thread it through.
//!
//! Reloads are copy-and-swap: a complete fresh state is built off to the
//! side and swapped in behind a single write lock, so concurrent readers
//! observe either the whole previous generation or the whole new one, never
//! a mix of the two.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use lazy_static::lazy_static;
use parking_lot::{Mutex, RwLock};
use tracing::{error, info};

use super::db::{self, DbParams};
use super::dictionary::{
    self, EXT_DICT_KEY, EXT_STOPWORDS_KEY, MAIN_DICTIONARY, QUANTIFIER_DICTIONARY, USE_SMART_KEY,
};
use super::pool::{self, ConnectionPool};
use super::snapshot::Snapshot;

/// Environment variable naming the configuration directory used by the
/// global instance. Falls back to the current directory when unset.
pub const CONFIG_DIR_ENV: &str = "SEGLEX_CONFIG_DIR";

lazy_static! {
    static ref GLOBAL: AnalyzerConfig = AnalyzerConfig::load_from(default_config_dir());
}

fn default_config_dir() -> PathBuf {
    env::var_os(CONFIG_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// One loaded configuration generation. Replaced wholesale on reload. The
/// database snapshot is consumed by pool construction and not retained;
/// only the handle survives.
struct ConfigState {
    pool: ConnectionPool,
    dict: Snapshot,
}

/// Process-wide analyzer configuration.
///
/// Construction never fails: missing or malformed resources degrade to
/// empty snapshots and a bad pool configuration degrades to a disabled pool
/// handle, each logged. A process can therefore start with no configuration
/// at all; only the first database use will fail.
pub struct AnalyzerConfig {
    base_dir: PathBuf,
    state: RwLock<Arc<ConfigState>>,
    reload_lock: Mutex<()>,
    use_smart: AtomicBool,
}

impl AnalyzerConfig {
    /// The process-wide instance, loaded once on first access from the
    /// directory named by [`CONFIG_DIR_ENV`]. Safe under concurrent first
    /// access; the load sequence runs exactly once.
    pub fn global() -> &'static AnalyzerConfig {
        &GLOBAL
    }

    /// Load a configuration context from `base_dir`.
    ///
    /// Stages run in a fixed order: database snapshot, connection pool,
    /// dictionary snapshot.
    pub fn load_from(base_dir: impl Into<PathBuf>) -> AnalyzerConfig {
        let base_dir = base_dir.into();
        let state = load_state(&base_dir);
        let use_smart = initial_use_smart(&state.dict);

        AnalyzerConfig {
            base_dir,
            state: RwLock::new(Arc::new(state)),
            reload_lock: Mutex::new(()),
            use_smart: AtomicBool::new(use_smart),
        }
    }

    /// Extension dictionary paths from the current dictionary snapshot.
    /// Re-derived on every call.
    pub fn ext_dictionaries(&self) -> Vec<String> {
        dictionary::resolve_paths(&self.current().dict, EXT_DICT_KEY)
    }

    /// Extension stopword dictionary paths from the current dictionary
    /// snapshot. Re-derived on every call.
    pub fn ext_stopword_dictionaries(&self) -> Vec<String> {
        dictionary::resolve_paths(&self.current().dict, EXT_STOPWORDS_KEY)
    }

    /// Canonical identifier of the main dictionary. Independent of any
    /// configuration content.
    pub fn main_dictionary(&self) -> &'static str {
        MAIN_DICTIONARY
    }

    /// Canonical identifier of the quantifier dictionary. Independent of any
    /// configuration content.
    pub fn quantifier_dictionary(&self) -> &'static str {
        QUANTIFIER_DICTIONARY
    }

    /// Whether the engine should use the smart (coarse-grained) segmentation
    /// strategy instead of the fine-grained one.
    ///
    /// The initial value comes from the `use_smart` key of the dictionary
    /// resource and defaults to `false` when absent. Runtime state: it is
    /// not part of the snapshot bundle and survives [`reload`](Self::reload).
    pub fn use_smart(&self) -> bool {
        self.use_smart.load(Ordering::Relaxed)
    }

    /// Set the smart segmentation flag. Not persisted.
    pub fn set_use_smart(&self, use_smart: bool) {
        self.use_smart.store(use_smart, Ordering::Relaxed);
    }

    /// Handle to the connection pool of the current generation. Cheap clone.
    ///
    /// If pool construction failed at load time this is a disabled handle;
    /// it errors on first use, never here.
    pub fn pool(&self) -> ConnectionPool {
        self.current().pool.clone()
    }

    /// Re-run the three-stage load and swap the whole state in one step.
    ///
    /// At most one reload executes at a time. The smart segmentation flag is
    /// left untouched.
    pub fn reload(&self) {
        let _guard = self.reload_lock.lock();
        let state = load_state(&self.base_dir);
        *self.state.write() = Arc::new(state);
        info!(base_dir = %self.base_dir.display(), "analyzer configuration reloaded");
    }

    /// Directory the configuration resources are resolved against.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn current(&self) -> Arc<ConfigState> {
        Arc::clone(&self.state.read())
    }
}

fn load_state(base_dir: &Path) -> ConfigState {
    let db = load_db_snapshot(base_dir);
    let pool = build_pool_from(&db);
    let dict = Snapshot::load(&base_dir.join(dictionary::DICT_RESOURCE));

    ConfigState { pool, dict }
}

fn load_db_snapshot(base_dir: &Path) -> Snapshot {
    let db = Snapshot::load(&base_dir.join(db::DB_RESOURCE));

    // One diagnostic line per loaded key, credentials redacted.
    for (key, value) in db.iter() {
        let value = if key == db::PASSWORD_KEY {
            "<redacted>"
        } else {
            value
        };
        info!(key, value, "database configuration entry");
    }

    db
}

fn build_pool_from(db: &Snapshot) -> ConnectionPool {
    let params = match DbParams::from_snapshot(db) {
        Ok(params) => params,
        Err(e) => {
            error!(error = %e, "invalid database pool configuration, pool disabled");
            return ConnectionPool::disabled();
        }
    };

    match pool::build_pool(&params) {
        Ok(pool) => pool,
        Err(e) => {
            error!(error = %e, "failed to build connection pool, pool disabled");
            ConnectionPool::disabled()
        }
    }
}

fn initial_use_smart(dict: &Snapshot) -> bool {
    dict.get(USE_SMART_KEY)
        .map(|value| value.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}
