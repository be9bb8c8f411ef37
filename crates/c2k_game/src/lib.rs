//! Core shared logic for CoD2 map tooling.
//!
//! This crate provides the two pieces of context every other crate in the
//! workspace needs:
//!
//! - [`GameDir`]: the filesystem layout of a Call of Duty 2 installation
//!   (where map sources, models, materials, textures and generated per-map
//!   files live).
//! - [`AssetCatalog`] / [`FxCatalog`]: the stock-asset name lists used to
//!   tell a built-in asset apart from a map maker's custom one.

mod catalog;
mod game_dir;

pub use catalog::{AssetCatalog, FxCatalog};
pub use game_dir::GameDir;
