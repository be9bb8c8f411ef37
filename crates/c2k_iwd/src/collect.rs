//! Package file collection.
//!
//! Turns a map's [`Resolution`] into the concrete set of files the archive
//! must contain. Beyond the resolver's output, the generated per-map files
//! are re-scanned here for dependencies the level source never mentions:
//! `loadfx(...)` calls in the FX script, the loadscreen material named by the
//! briefing CSV, shader lists inside custom `.efx` files, sound alias rows
//! and script includes.
//!
//! Every step is best-effort: a referenced file missing from disk is skipped,
//! never fatal.

use crate::error::Result;
use crate::manifest::PackageManifest;
use c2k_game::{AssetCatalog, FxCatalog, GameDir};
use c2k_map_source::material::{matches_texture_charset, texture_base_name};
use c2k_map_source::{material_textures, printable_strings, xmodel_dependencies, Resolution};
use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use std::sync::LazyLock;
use walkdir::WalkDir;

/// `loadfx("fx/...")` calls in a map's FX script. The argument may or may
/// not carry its `.efx` extension.
static LOADFX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)loadfx\s*\(\s*"([^"]+)"\s*\)"#).unwrap());

/// The `levelBriefing,<loadscreen material>` line of the briefing CSV.
static LOADSCREEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)levelBriefing\s*,\s*(load(?:ing)?screen_[^\s,]+)").unwrap());

/// `shaders[ name, name, ... ]` blocks inside an effect file.
static SHADERS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"shaders\[([^\]]*)\]").unwrap());

/// `maps\mp\<path>::<function>;` call lines in the main script.
static GSC_CALL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"maps\\mp\\([^:]+)::[^;]+;").unwrap());

/// Collect every file the package for `map_name` must contain.
///
/// `material_catalog` filters stock shaders out of the `.efx` second-order
/// pass; `fx_catalog` filters stock effects out of the FX script re-scan.
pub fn collect_files(
    game: &GameDir,
    map_name: &str,
    resolution: &Resolution,
    material_catalog: &AssetCatalog,
    fx_catalog: &FxCatalog,
) -> Result<PackageManifest> {
    let mut manifest = PackageManifest::new();

    collect_models(game, resolution, &mut manifest)?;
    collect_materials(game, resolution, &mut manifest);
    collect_textures(game, resolution, &mut manifest);
    collect_core_files(game, map_name, &mut manifest);
    collect_loadscreen(game, map_name, &mut manifest);
    collect_fx(game, map_name, fx_catalog, &mut manifest);
    collect_fx_shaders(game, material_catalog, &mut manifest)?;
    collect_sounds(game, map_name, &mut manifest);
    collect_scripts(game, map_name, &mut manifest);

    tracing::info!("Collected {} files to pack for {map_name}", manifest.len());
    Ok(manifest)
}

/// Each custom model ships with its surface files and its parts file.
fn collect_models(
    game: &GameDir,
    resolution: &Resolution,
    manifest: &mut PackageManifest,
) -> Result<()> {
    for model in &resolution.missing_models {
        manifest.add(game.xmodel_path(model));
        let deps = xmodel_dependencies(game, model)?;
        for surf in &deps.surfaces {
            manifest.add(game.xmodel_surf_path(surf));
        }
        manifest.add(game.xmodel_parts_path(&deps.parts));
    }
    Ok(())
}

fn collect_materials(game: &GameDir, resolution: &Resolution, manifest: &mut PackageManifest) {
    for material in &resolution.missing_materials {
        if let Some(path) = game.find_material(material) {
            manifest.add(path);
        }
    }
}

/// Textures live flat under `main/images/` in the common case, but map makers
/// organize them into subfolders too, so fall back to a recursive search by
/// filename.
fn collect_textures(game: &GameDir, resolution: &Resolution, manifest: &mut PackageManifest) {
    for texture in &resolution.missing_textures {
        let direct = game.image_path(texture);
        if direct.as_std_path().is_file() {
            manifest.add(direct);
            continue;
        }
        if let Some(found) = find_by_file_name(&game.images_dir(), texture) {
            manifest.add(found);
        }
    }
}

/// The fixed per-map file list: scripts, briefing CSV, compiled geometry,
/// arena metadata, sound aliases, sun parameters. Present-if-generated.
fn collect_core_files(game: &GameDir, map_name: &str, manifest: &mut PackageManifest) {
    manifest.add(game.main_script_path(map_name));
    manifest.add(game.fx_script_path(map_name));
    manifest.add(game.briefing_csv_path(map_name));
    manifest.add(game.compiled_bsp_path(map_name));
    manifest.add(game.arena_path(map_name));
    manifest.add(game.soundalias_csv_path(map_name));
    manifest.add(game.sun_path(map_name));
}

/// The briefing CSV names a loadscreen material; the material names its
/// texture. Neither is referenced by the level source, so both are pulled in
/// here. The texture pick is heuristic: prefer a candidate following the
/// loadscreen naming convention, otherwise take the last candidate that is
/// neither the material itself nor a generic shader-map keyword.
fn collect_loadscreen(game: &GameDir, map_name: &str, manifest: &mut PackageManifest) {
    let csv_path = game.briefing_csv_path(map_name);
    let Some(content) = read_lossy(&csv_path) else {
        return;
    };
    let Some(caps) = LOADSCREEN_RE.captures(&content) else {
        return;
    };
    let material_name = caps[1].trim();
    tracing::debug!("Found loadscreen material reference: {material_name}");

    let Some(material_path) = game.find_material(material_name) else {
        tracing::debug!("Loadscreen material file not found: {material_name}");
        return;
    };
    manifest.add(material_path.clone());

    let Ok(data) = std::fs::read(material_path.as_std_path()) else {
        return;
    };
    let candidates: Vec<String> = printable_strings(&data)
        .into_iter()
        .filter(|s| matches_texture_charset(s))
        .collect();

    let preferred = candidates.iter().map(|s| texture_base_name(s)).find(|base| {
        (base.starts_with("loadingscreen_") || base.starts_with("loadscreen_"))
            && *base != material_name
    });
    let fallback = || {
        candidates.iter().rev().map(|s| texture_base_name(s)).find(|base| {
            *base != material_name && *base != "colorMap" && *base != "normalMap"
        })
    };

    if let Some(base) = preferred.or_else(fallback) {
        if !manifest.add(game.image_path(&format!("{base}.iwi"))) {
            tracing::debug!("Loadscreen texture missing: {base}.iwi");
        }
    } else {
        tracing::debug!("No valid texture name found in material {material_name}");
    }
}

/// Re-scan the FX script for `loadfx(...)` calls. The script may reference
/// effects never mentioned in the level-source entities, so the resolver's
/// hidden-FX pass is not enough.
fn collect_fx(game: &GameDir, map_name: &str, fx_catalog: &FxCatalog, manifest: &mut PackageManifest) {
    let Some(content) = read_lossy(&game.fx_script_path(map_name)) else {
        tracing::debug!("No FX script found for {map_name}");
        return;
    };

    let mut added = 0usize;
    for caps in LOADFX_RE.captures_iter(&content) {
        let clean = caps[1].trim().replace('\\', "/");
        let clean = clean.strip_prefix("fx/").unwrap_or(&clean).trim();
        if clean.is_empty() {
            continue;
        }

        let norm_lower = clean.to_lowercase();
        let (game_path, without_ext) = if norm_lower.ends_with(".efx") {
            (format!("fx/{clean}"), &clean[..clean.len() - 4])
        } else {
            (format!("fx/{clean}.efx"), clean)
        };

        if fx_catalog.contains(&norm_lower) || fx_catalog.contains(without_ext) {
            tracing::debug!("Stock FX skipped: {game_path}");
            continue;
        }

        if manifest.add(game.fx_file_path(&game_path)) {
            added += 1;
        }
    }
    tracing::debug!("Custom FX files added: {added}");
}

/// Second-order dependencies: custom effect files reference materials through
/// `shaders[...]` blocks, and those materials reference textures. None of
/// this is visible from the level source.
fn collect_fx_shaders(
    game: &GameDir,
    material_catalog: &AssetCatalog,
    manifest: &mut PackageManifest,
) -> Result<()> {
    let efx_files: Vec<Utf8PathBuf> = manifest
        .files()
        .filter(|p| {
            p.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("efx"))
        })
        .map(Utf8Path::to_path_buf)
        .collect();

    for efx_path in efx_files {
        let data = match std::fs::read(efx_path.as_std_path()) {
            Ok(data) => data,
            Err(err) => {
                tracing::warn!("Failed to read effect file {efx_path}: {err}");
                continue;
            }
        };
        let text = printable_strings(&data).join("\n");

        for caps in SHADERS_RE.captures_iter(&text) {
            for shader in caps[1].split([',', '\n', '\r']) {
                let shader = shader.trim();
                if shader.is_empty() || material_catalog.contains(shader) {
                    continue;
                }
                let Some(material_path) = game.find_material(shader) else {
                    continue;
                };
                manifest.add(material_path);
                for base in material_textures(game, shader)? {
                    manifest.add(game.image_path(&format!("{base}.iwi")));
                }
            }
        }
    }
    Ok(())
}

/// Sound alias rows reference audio files in their third column.
fn collect_sounds(game: &GameDir, map_name: &str, manifest: &mut PackageManifest) {
    let Some(content) = read_lossy(&game.soundalias_csv_path(map_name)) else {
        return;
    };

    for line in content.lines() {
        if line.starts_with('#') || line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let Some(sound_path) = fields.get(2).copied().filter(|f| !f.is_empty()) else {
            continue;
        };
        let lower = sound_path.to_lowercase();
        if !lower.ends_with(".wav") && !lower.ends_with(".mp3") {
            continue;
        }
        manifest.add(game.sound_path(sound_path));
    }
}

/// The main script calls into other per-map scripts; each distinct call path
/// maps to a `.gsc` file that must ship too.
fn collect_scripts(game: &GameDir, map_name: &str, manifest: &mut PackageManifest) {
    let Some(content) = read_lossy(&game.main_script_path(map_name)) else {
        return;
    };

    for caps in GSC_CALL_RE.captures_iter(&content) {
        let script = format!("{}.gsc", caps[1].trim().replace('\\', "/"));
        manifest.add(game.maps_mp_dir().join(script));
    }
}

/// Lossy UTF-8 read of a generated text file; `None` when absent or
/// unreadable.
fn read_lossy(path: &Utf8Path) -> Option<String> {
    if !path.as_std_path().is_file() {
        return None;
    }
    std::fs::read(path.as_std_path())
        .ok()
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
}

/// First file under `root` whose filename matches `file_name` exactly.
fn find_by_file_name(root: &Utf8Path, file_name: &str) -> Option<Utf8PathBuf> {
    for entry in WalkDir::new(root.as_std_path())
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if entry.file_type().is_file() && entry.file_name().to_string_lossy() == file_name {
            return Utf8PathBuf::from_path_buf(entry.into_path()).ok();
        }
    }
    None
}
