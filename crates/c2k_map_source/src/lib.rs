//! Level-source parsing and custom-asset resolution for CoD2 maps.
//!
//! A map's `.map` source references models, materials, textures and effects
//! by name. This crate statically analyses the source (and its prefab
//! inclusions) and diffs the referenced names against the stock catalogs to
//! find what a map maker must ship alongside the map:
//!
//! - [`entities`]: the brace-delimited key/value entity parser
//! - [`scavenge`]: printable-string extraction from binary asset files
//! - [`xmodel`]: model-file dependency reading
//! - [`material`]: material-file texture reading
//! - [`resolver`]: the recursive map walk and stock-catalog diff
//!
//! Everything downstream of the main map file is best-effort: a referenced
//! asset missing from disk is the expected "custom asset not shipped yet"
//! case, never an error.

pub mod entities;
pub mod error;
pub mod material;
pub mod resolver;
pub mod scavenge;
pub mod xmodel;

pub use entities::{parse_entities, parse_entities_text, Entity};
pub use error::{Error, Result};
pub use material::material_textures;
pub use resolver::{resolve_missing_assets, Resolution};
pub use scavenge::printable_strings;
pub use xmodel::{xmodel_dependencies, XModelDependencies};
