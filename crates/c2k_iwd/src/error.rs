//! Error types for package building.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while collecting or archiving package files.
#[derive(Error, Debug)]
pub enum Error {
    /// Filesystem I/O failed (staging copies, reading generated files,
    /// creating the archive).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The zip writer rejected the archive or an entry.
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Reading model/material dependencies failed mid-collection.
    #[error("Map source error: {0}")]
    MapSource(#[from] c2k_map_source::Error),

    /// The resolved file set was empty; there is nothing to pack.
    #[error("No custom or map files to pack")]
    NothingToPack,
}
