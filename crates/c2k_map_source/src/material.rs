//! Material texture reading.
//!
//! Material files are scavenged for texture references. The survivors of the
//! charset filter still contain shader parameter names (`colorMap`,
//! `alphaTest`, ...) that sit next to the texture paths in the binary, so a
//! fixed denylist and a handful of prefix rules strip them before the
//! filename stem is taken as the texture base name.
//!
//! The denylist comparison is case-sensitive (`colorMap` is excluded,
//! `ColorMap` would not be). Pinned by tests; don't loosen it casually.

use crate::error::Result;
use crate::scavenge::printable_strings;
use c2k_game::GameDir;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Character set of plausible texture references. `~`, `&` and `-` appear in
/// specular-map naming.
static TEXTURE_CHARSET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_~/.&-]+$").unwrap());

/// Shader parameter names that survive the charset filter but are not
/// textures. Compared case-sensitively.
const SHADER_KEYWORDS: [&str; 22] = [
    "colorMap",
    "normalMap",
    "specularMap",
    "detailMap",
    "detailScale",
    "wallpaper",
    "phong_replace_detail",
    "specularColorMap",
    "alphaMap",
    "alphaTest",
    "phong_alphatest_spec",
    "specularFactor",
    "glossScale",
    "bumpMap",
    "heightMap",
    "lightMap",
    "diffuseMap",
    "emissiveMap",
    "qer_editorimage",
    "qer_trans",
    "surfaceparm",
    "nomipmaps",
];

const EXCLUDED_PREFIXES: [&str; 4] = ["phong_", "mtl_", "qer_", "surfaceparm"];

/// Whether a scavenged string has the charset of a texture reference.
/// Shared with the loadscreen heuristic in the packager.
pub fn matches_texture_charset(candidate: &str) -> bool {
    TEXTURE_CHARSET_RE.is_match(candidate)
}

/// Filename stem of a texture reference: strip any directory-like prefix and
/// the extension at the last `.` (unless the dot is the first character).
pub fn texture_base_name(reference: &str) -> &str {
    let name = reference.rsplit('/').next().unwrap_or(reference);
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    }
}

/// Extract the texture base names a material references.
///
/// The material file is looked up in the override tree (`raw/materials/`)
/// then the base tree (`main/materials/`); absent in both yields an empty
/// set. The result carries no extension; callers append the game's texture
/// file extension.
pub fn material_textures(game: &GameDir, material_name: &str) -> Result<HashSet<String>> {
    let Some(path) = game.find_material(material_name) else {
        tracing::debug!("No material file found for {material_name}");
        return Ok(HashSet::new());
    };

    tracing::debug!("Parsing material: {path}");
    let data = std::fs::read(path.as_std_path())?;

    let mut textures = HashSet::new();
    for candidate in printable_strings(&data) {
        if candidate.len() <= 3
            || !matches_texture_charset(&candidate)
            || SHADER_KEYWORDS.contains(&candidate.as_str())
            || EXCLUDED_PREFIXES.iter().any(|p| candidate.starts_with(p))
        {
            continue;
        }
        let base = texture_base_name(&candidate);
        if !base.is_empty() {
            textures.insert(base.to_string());
        }
    }

    Ok(textures)
}
