//! Flat key-value snapshots of configuration resources.
//!
//! A [`Snapshot`] is an immutable point-in-time view of one TOML resource.
//! Nested tables are flattened into dotted keys (`db.host`), so every
//! resource presents a single flat namespace regardless of how the file is
//! structured. Values are carried as strings; numeric interpretation is the
//! caller's concern.
//!
//! Loading is tolerant by contract: a missing resource yields an empty
//! snapshot and a malformed resource is logged and likewise degrades to an
//! empty snapshot. Overall system construction must never abort because a
//! configuration file is absent or broken.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use toml::Value;
use tracing::{debug, error, warn};

use crate::error::{ConfigError, Result};

/// An immutable point-in-time key-value view of a configuration resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    entries: BTreeMap<String, String>,
}

impl Snapshot {
    /// A snapshot with no keys.
    pub fn empty() -> Snapshot {
        Snapshot::default()
    }

    /// Build a snapshot from explicit key-value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Snapshot
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Snapshot {
            entries: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Load a snapshot from a TOML resource on disk.
    ///
    /// A missing resource yields an empty snapshot; callers must treat every
    /// key as optional and apply their own defaults. Unreadable or malformed
    /// content is logged with full detail and degrades to an empty snapshot.
    pub fn load(path: &Path) -> Snapshot {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(
                    path = %path.display(),
                    "configuration resource not found, using empty snapshot"
                );
                return Snapshot::empty();
            }
            Err(e) => {
                error!(
                    path = %path.display(),
                    error = %e,
                    "failed to read configuration resource"
                );
                return Snapshot::empty();
            }
        };

        match parse_toml(&raw) {
            Ok(parsed) => {
                for key in &parsed.skipped {
                    warn!(
                        path = %path.display(),
                        key = %key,
                        "unsupported value type in configuration resource, entry skipped"
                    );
                }
                parsed.snapshot
            }
            Err(e) => {
                error!(
                    path = %path.display(),
                    error = %e,
                    "malformed configuration resource"
                );
                Snapshot::empty()
            }
        }
    }

    /// Look up the value for a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Number of entries in the snapshot.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the snapshot holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Outcome of parsing one resource: the flattened entries plus the keys of
/// any entries that carried a value type the flat namespace cannot hold.
#[derive(Debug)]
pub(crate) struct ParsedResource {
    pub(crate) snapshot: Snapshot,
    pub(crate) skipped: Vec<String>,
}

/// Parse TOML text into a flattened snapshot. Pure; diagnostics are the
/// caller's responsibility.
pub(crate) fn parse_toml(raw: &str) -> Result<ParsedResource> {
    let table: toml::Table = raw
        .parse()
        .map_err(|e: toml::de::Error| ConfigError::malformed(e.to_string()))?;

    let mut entries = BTreeMap::new();
    let mut skipped = Vec::new();
    flatten_into(&mut entries, &mut skipped, "", &table);

    Ok(ParsedResource {
        snapshot: Snapshot { entries },
        skipped,
    })
}

fn flatten_into(
    out: &mut BTreeMap<String, String>,
    skipped: &mut Vec<String>,
    prefix: &str,
    table: &toml::Table,
) {
    for (key, value) in table {
        let full = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };

        match value {
            Value::Table(inner) => flatten_into(out, skipped, &full, inner),
            Value::String(s) => {
                out.insert(full, s.clone());
            }
            Value::Integer(i) => {
                out.insert(full, i.to_string());
            }
            Value::Float(f) => {
                out.insert(full, f.to_string());
            }
            Value::Boolean(b) => {
                out.insert(full, b.to_string());
            }
            // Arrays and datetimes have no flat string form.
            _ => skipped.push(full),
        }
    }
}
