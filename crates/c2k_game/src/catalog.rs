//! Stock-asset catalogs.
//!
//! The tooling ships JSON lists of every model, material and effect present in
//! the base game. Diffing a map's referenced assets against these lists is
//! what separates "custom, must ship in the IWD" from "stock, already on every
//! player's disk".
//!
//! Catalog loading is deliberately forgiving: a missing file means an empty
//! catalog (everything is treated as custom), and a malformed file is logged
//! and likewise treated as empty. Resolution must never fail because a list
//! file is absent or stale.

use camino::Utf8Path;
use std::collections::HashSet;

/// An immutable set of known stock asset names (models or materials).
///
/// Loaded from a JSON array of objects carrying at least a `name` field:
///
/// ```json
/// [{ "name": "crate_01" }, { "name": "fence_wood" }]
/// ```
#[derive(Debug, Clone, Default)]
pub struct AssetCatalog {
    names: HashSet<String>,
}

impl AssetCatalog {
    /// Load a catalog from a JSON list file.
    ///
    /// A missing file yields an empty catalog; a malformed file is logged as a
    /// warning and also yields an empty catalog. Entries that are not objects
    /// or lack a `name` field are skipped.
    pub fn load(path: &Utf8Path) -> Self {
        let Some(entries) = read_json_list(path) else {
            return Self::default();
        };

        let names = entries
            .iter()
            .filter_map(|entry| entry.get("name"))
            .filter_map(|name| name.as_str())
            .map(str::to_string)
            .collect();

        Self { names }
    }

    /// Build a catalog directly from names. Mainly for tests.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// The stock-effects catalog, loaded from a JSON array of objects with a
/// `path` field (`fx/...` paths as the game references them).
///
/// Entries are normalized on load: backslashes become forward slashes, the
/// leading `fx/` segment is stripped, surrounding whitespace is trimmed and
/// the result is lowercased. Lookups take the caller's already-normalized
/// string.
#[derive(Debug, Clone, Default)]
pub struct FxCatalog {
    paths: HashSet<String>,
}

impl FxCatalog {
    /// Load the stock-FX list. Same missing/malformed policy as
    /// [`AssetCatalog::load`].
    pub fn load(path: &Utf8Path) -> Self {
        let Some(entries) = read_json_list(path) else {
            return Self::default();
        };

        let paths = entries
            .iter()
            .filter_map(|entry| entry.get("path"))
            .filter_map(|path| path.as_str())
            .map(normalize_fx_path)
            .filter(|p| !p.is_empty())
            .collect();

        Self { paths }
    }

    /// Build a catalog from already game-relative FX paths. Mainly for tests.
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            paths: paths
                .into_iter()
                .map(|p| normalize_fx_path(p.as_ref()))
                .collect(),
        }
    }

    pub fn contains(&self, normalized: &str) -> bool {
        self.paths.contains(normalized)
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Normalize a stock-FX catalog entry for comparison.
pub fn normalize_fx_path(raw: &str) -> String {
    let cleaned = raw.trim().replace('\\', "/");
    let cleaned = cleaned.strip_prefix("fx/").unwrap_or(&cleaned);
    cleaned.trim().to_lowercase()
}

/// Read a JSON file expected to hold an array. `None` when the file is
/// missing, unreadable or not a valid JSON array; the malformed cases warn.
fn read_json_list(path: &Utf8Path) -> Option<Vec<serde_json::Value>> {
    if !path.as_std_path().is_file() {
        tracing::debug!("Catalog file not found, treating as empty: {path}");
        return None;
    }

    let contents = match std::fs::read_to_string(path.as_std_path()) {
        Ok(contents) => contents,
        Err(err) => {
            tracing::warn!("Failed to read catalog {path}: {err}");
            return None;
        }
    };

    match serde_json::from_str::<serde_json::Value>(&contents) {
        Ok(serde_json::Value::Array(entries)) => Some(entries),
        Ok(_) => {
            tracing::warn!("Catalog {path} is not a JSON list, treating as empty");
            None
        }
        Err(err) => {
            tracing::warn!("Failed to parse catalog {path}: {err}");
            None
        }
    }
}
