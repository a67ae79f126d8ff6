//! Dictionary path resolution and canonical dictionary identifiers.
//!
//! Extension dictionaries are layered on top of the fixed main dictionary by
//! the segmentation engine. Their locations come from the dictionary
//! configuration resource as a single `;`-separated value per key; this
//! module turns such a value into an ordered path list.

use super::snapshot::Snapshot;

/// Canonical identifier of the fixed main dictionary.
pub const MAIN_DICTIONARY: &str = "main";

/// Canonical identifier of the fixed quantifier dictionary.
pub const QUANTIFIER_DICTIONARY: &str = "quantifier";

/// Default name of the dictionary configuration resource.
pub const DICT_RESOURCE: &str = "seglex.toml";

/// Configuration key listing extension dictionary paths.
pub const EXT_DICT_KEY: &str = "ext_dict";

/// Configuration key listing extension stopword dictionary paths.
pub const EXT_STOPWORDS_KEY: &str = "ext_stopwords";

/// Configuration key for the initial value of the smart segmentation flag.
pub const USE_SMART_KEY: &str = "use_smart";

/// Separator between paths within a single configuration value.
const PATH_SEPARATOR: char = ';';

/// Resolve a `;`-separated configuration value into an ordered list of
/// trimmed, non-empty path strings.
///
/// Pure and order-preserving: the list is re-derived from the snapshot on
/// every call, never cached. Empty and whitespace-only segments are dropped;
/// duplicates are kept. A missing key yields an empty list.
pub fn resolve_paths(snapshot: &Snapshot, key: &str) -> Vec<String> {
    let Some(value) = snapshot.get(key) else {
        return Vec::new();
    };

    value
        .split(PATH_SEPARATOR)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_owned)
        .collect()
}
