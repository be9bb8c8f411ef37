//! Custom-asset IWD packaging for CoD2 maps.
//!
//! Given the resolution of a map's custom assets (see
//! [`c2k_map_source::resolve_missing_assets`]), this crate collects every
//! file the map needs at runtime (models with their surface/parts files,
//! materials, textures, the generated per-map scripts and metadata, effects,
//! sounds) and packs them into a distributable `.iwd` (zip) archive rooted
//! at the game's asset-tree namespace.
//!
//! # Example
//!
//! ```no_run
//! use c2k_game::{AssetCatalog, FxCatalog, GameDir};
//! use c2k_map_source::resolve_missing_assets;
//! use camino::Utf8Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let game = GameDir::new("C:/Program Files/Call of Duty 2");
//! let models = AssetCatalog::load(Utf8Path::new("lists/xmodel_list.json"));
//! let materials = AssetCatalog::load(Utf8Path::new("lists/materials.json"));
//! let fx = FxCatalog::load(Utf8Path::new("lists/fx_files.json"));
//!
//! let resolution = resolve_missing_assets(&game, "mp_harbor", &models, &materials)?;
//! let count = c2k_iwd::build_package(
//!     &game,
//!     "mp_harbor",
//!     &resolution,
//!     &materials,
//!     &fx,
//!     Utf8Path::new("zz_custom_mp_harbor.iwd"),
//! )?;
//! println!("Packed {count} files");
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod collect;
pub mod error;
pub mod manifest;

pub use archive::write_archive;
pub use collect::collect_files;
pub use error::{Error, Result};
pub use manifest::PackageManifest;

use c2k_game::{AssetCatalog, FxCatalog, GameDir};
use c2k_map_source::Resolution;
use camino::Utf8Path;

/// Collect a map's package files and write the archive in one step.
///
/// Returns the number of files packed. See [`collect_files`] and
/// [`write_archive`] for the two halves.
pub fn build_package(
    game: &GameDir,
    map_name: &str,
    resolution: &Resolution,
    material_catalog: &AssetCatalog,
    fx_catalog: &FxCatalog,
    out_path: &Utf8Path,
) -> Result<usize> {
    let manifest = collect_files(game, map_name, resolution, material_catalog, fx_catalog)?;
    write_archive(&manifest, out_path)
}
