//! Error types for level-source analysis.
//!
//! All fallible functions in this crate return [`Result<T>`], which uses
//! [`Error`] as the error type. Only two things are fatal here: the main map
//! file being absent, and hard filesystem I/O failures. Everything else
//! (missing prefabs, missing binary assets, malformed lines) degrades to
//! empty results.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while analysing a map's source.
#[derive(Error, Debug)]
pub enum Error {
    /// Filesystem I/O failed (reading map sources, models, materials).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The main level-source file for the requested map does not exist.
    /// This is the one fatal precondition of resolution.
    #[error("Main map not found: {0}")]
    MapNotFound(Utf8PathBuf),
}
