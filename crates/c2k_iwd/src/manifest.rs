//! The package manifest: which files ship in the archive.

use camino::{Utf8Path, Utf8PathBuf};
use std::collections::BTreeSet;

/// The set of absolute source paths the packager has decided to include.
///
/// Membership is existence-checked at insertion time: a referenced file that
/// is not on disk is the expected "custom asset not shipped yet" case and is
/// skipped quietly. Paths are kept sorted for deterministic staging order.
/// Existence is re-validated at copy time; a file may still vanish between
/// scan and pack.
#[derive(Debug, Clone, Default)]
pub struct PackageManifest {
    files: BTreeSet<Utf8PathBuf>,
}

impl PackageManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file if it exists on disk. Returns whether it was added.
    pub fn add(&mut self, path: Utf8PathBuf) -> bool {
        if path.as_std_path().is_file() {
            self.files.insert(path)
        } else {
            tracing::debug!("Skipped missing file: {path}");
            false
        }
    }

    pub fn files(&self) -> impl Iterator<Item = &Utf8Path> {
        self.files.iter().map(Utf8PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
