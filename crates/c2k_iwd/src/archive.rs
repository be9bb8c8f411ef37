//! Staging and zip writing.
//!
//! An IWD is a plain zip whose entries are rooted at the game's asset-tree
//! namespace (`maps/mp/...`, `materials/...`, `images/...`). Source files come
//! from two different on-disk trees (`raw/` overrides and `main/`), so each
//! file's archive path is computed by re-rooting at whichever of those
//! components appears first in its absolute path, with the bare filename as a
//! last resort.
//!
//! Files are first copied into a scratch staging directory and the staging
//! tree is then zipped with per-file deflation. The scratch directory is a
//! [`tempfile::TempDir`], so it is removed on success and failure alike.

use crate::error::{Error, Result};
use crate::manifest::PackageManifest;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs::File;
use std::io::Write;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Stage the manifest's files and write the archive at `out_path`.
///
/// Returns the number of files packed. Fails with
/// [`NothingToPack`](Error::NothingToPack) before touching the destination if
/// the manifest is empty or every file vanished since analysis; fails with an
/// I/O or zip error if the destination cannot be written.
pub fn write_archive(manifest: &PackageManifest, out_path: &Utf8Path) -> Result<usize> {
    if manifest.is_empty() {
        return Err(Error::NothingToPack);
    }

    let scratch = tempfile::tempdir()?;
    let staging_root = scratch.path().join("main");
    std::fs::create_dir_all(&staging_root)?;

    let mut copied = 0usize;
    for src in manifest.files() {
        // Re-validated: a file may disappear between scan and pack.
        if !src.as_std_path().is_file() {
            tracing::warn!("Skipped missing file: {src}");
            continue;
        }

        let relative = archive_relative_path(src);
        let dest = staging_root.join(relative.as_std_path());
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(src.as_std_path(), &dest)?;
        copied += 1;
        tracing::debug!("Staged {relative}");
    }

    if copied == 0 {
        return Err(Error::NothingToPack);
    }

    let file = File::create(out_path.as_std_path())?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for entry in WalkDir::new(&staging_root).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::Io(e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let entry_name = entry
            .path()
            .strip_prefix(&staging_root)
            .expect("walked path is under the staging root")
            .to_string_lossy()
            .replace('\\', "/");

        zip.start_file(entry_name, options)?;
        let mut src = File::open(entry.path())?;
        std::io::copy(&mut src, &mut zip)?;
    }

    zip.finish()?.flush()?;
    tracing::info!("Packed {copied} files into {out_path}");
    Ok(copied)
}

/// Archive-relative path of a source file: everything after the first `raw`
/// or `main` path component, falling back to the bare filename when neither
/// appears.
fn archive_relative_path(path: &Utf8Path) -> Utf8PathBuf {
    let components: Vec<&str> = path.components().map(|c| c.as_str()).collect();

    for root in ["raw", "main"] {
        if let Some(idx) = components.iter().position(|c| *c == root) {
            if idx + 1 < components.len() {
                return components[idx + 1..].iter().copied().collect();
            }
        }
    }

    Utf8PathBuf::from(path.file_name().unwrap_or_default())
}
