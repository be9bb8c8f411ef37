//! XModel dependency reading.
//!
//! A model file under `main/xmodel/` references its surface and material
//! files by name. The names are recovered by scavenging the binary for
//! identifier-like strings and partitioning on the `mtl_` naming convention.
//! The parts-file name is never stored in the model at all; stock tooling
//! derives it as the model name with a `0` suffix.

use crate::error::Result;
use crate::scavenge::printable_strings;
use c2k_game::GameDir;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Identifier shape of surface/material names embedded in a model file.
static IDENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z0-9_]+$").unwrap());

/// Files a model depends on, by name.
///
/// `surfaces` and `materials` preserve first-seen order with duplicates
/// removed. `parts` is derived, not discovered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XModelDependencies {
    /// Surface file names under `main/xmodelsurfs/`.
    pub surfaces: Vec<String>,
    /// Material names (files under `materials/`), `mtl_` prefixed.
    pub materials: Vec<String>,
    /// Parts file name under `main/xmodelparts/` (`<model name>0`).
    pub parts: String,
}

/// Read the dependencies of one model.
///
/// A model file absent from disk is the normal partially-installed case and
/// yields empty surface/material sets (the derived parts name is still
/// returned). Only hard I/O failures on an existing file are errors.
pub fn xmodel_dependencies(game: &GameDir, model_name: &str) -> Result<XModelDependencies> {
    let parts = format!("{model_name}0");
    let path = game.xmodel_path(model_name);

    if !path.as_std_path().is_file() {
        return Ok(XModelDependencies {
            parts,
            ..Default::default()
        });
    }

    let data = std::fs::read(path.as_std_path())?;

    let mut surfaces = Vec::new();
    let mut materials = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for candidate in printable_strings(&data) {
        if !is_dependency_name(&candidate) {
            continue;
        }
        if !seen.insert(candidate.clone()) {
            continue;
        }
        if candidate.starts_with("mtl_") {
            materials.push(candidate);
        } else {
            surfaces.push(candidate);
        }
    }

    Ok(XModelDependencies {
        surfaces,
        materials,
        parts,
    })
}

/// Filter out incidental short/structural tokens the scavenger picks up.
///
/// Real dependency names are at least 6 chars of `[a-z0-9_]` and carry an
/// underscore or a digit.
fn is_dependency_name(candidate: &str) -> bool {
    candidate.len() >= 6
        && IDENT_RE.is_match(candidate)
        && (candidate.contains('_') || candidate.chars().any(|c| c.is_ascii_digit()))
}
