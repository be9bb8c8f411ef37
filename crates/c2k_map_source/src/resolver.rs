//! Map asset resolution.
//!
//! Walks a map's level-source file and every prefab it includes, collects the
//! model/material names the geometry and entities reference, and diffs them
//! against the stock catalogs. For each custom material the referenced
//! textures are read out of the material file.
//!
//! # Traversal
//!
//! 1. Fail if the main map file is absent, the only fatal precondition.
//! 2. Per file (explicit worklist, not call-stack recursion):
//!    - two regex passes over the raw text pick up materials referenced by
//!      brush/curve/patch syntax, which the entity parser deliberately skips
//!    - the entity pass collects `misc_model` references, effect paths
//!      smuggled into entity fields, and `misc_prefab` inclusions
//! 3. Prefab inclusions are resolved against `map_source/prefabs/`; a visited
//!    set keyed by canonicalized path makes cycles terminate, and a prefab
//!    missing from disk is silently skipped.
//! 4. `missing = used − catalog` per asset class, sorted for determinism.

use crate::entities::{parse_entities_text, read_latin1};
use crate::error::{Error, Result};
use crate::material::material_textures;
use c2k_game::{AssetCatalog, GameDir};
use camino::Utf8PathBuf;
use itertools::Itertools;
use regex::Regex;
use std::collections::{BTreeSet, HashSet};
use std::sync::LazyLock;

/// Material name trailing a brush plane line (`... ) ) ) <name>`).
static BRUSH_MAT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\)\s*\)\s*\)\s*([a-z0-9_/]+)").unwrap());

/// Material name opening a curve/mesh/patch block.
static PATCH_MAT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:curve|mesh|patchDef2)\s*\{\s*([a-z0-9_/]+)").unwrap());

/// Entity keys level designers smuggle effect references into.
const HIDDEN_FX_KEYS: [&str; 6] = [
    "script_noteworthy",
    "fx",
    "effect",
    "corona",
    "script_fx",
    "targetname",
];

/// Outcome of resolving one map.
///
/// `missing_*` is always a subset of the corresponding `used_*`; list fields
/// are sorted and deduplicated.
#[derive(Debug, Clone, Default, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    /// Every model name referenced, stock or not.
    pub used_models: BTreeSet<String>,
    /// Every material name referenced, stock or not.
    pub used_materials: BTreeSet<String>,
    /// Referenced models absent from the stock catalog.
    pub missing_models: Vec<String>,
    /// Referenced materials absent from the stock catalog.
    pub missing_materials: Vec<String>,
    /// Texture files (`.iwi`) referenced by the missing materials.
    pub missing_textures: Vec<String>,
    /// Normalized `fx/....efx` paths found in arbitrary entity fields.
    pub hidden_fx_paths: Vec<String>,
    /// Referenced models that were stock-catalog hits (diagnostics).
    pub stock_models: usize,
    /// Referenced materials that were stock-catalog hits (diagnostics).
    pub stock_materials: usize,
    /// Prefab file names, in discovery order, each at most once.
    pub prefabs_processed: Vec<String>,
}

/// Resolve the custom assets a map depends on.
///
/// Pure function of the filesystem snapshot, the catalogs and the map name;
/// no state survives between calls. Fails only if the main level-source file
/// does not exist; everything downstream is best-effort.
pub fn resolve_missing_assets(
    game: &GameDir,
    map_name: &str,
    model_catalog: &AssetCatalog,
    material_catalog: &AssetCatalog,
) -> Result<Resolution> {
    let main_map = game.map_source_path(map_name);
    if !main_map.as_std_path().is_file() {
        return Err(Error::MapNotFound(main_map));
    }

    let prefab_dir = game.prefab_dir();

    let mut used_models: BTreeSet<String> = BTreeSet::new();
    let mut used_materials: BTreeSet<String> = BTreeSet::new();
    let mut hidden_fx: BTreeSet<String> = BTreeSet::new();
    let mut prefabs_processed: Vec<String> = Vec::new();

    // Cycle guard keyed by canonicalized absolute path, seeded with the main
    // map so a prefab referencing an ancestor is skipped too.
    let mut visited: HashSet<Utf8PathBuf> = HashSet::new();
    visited.insert(canonical_key(&main_map));

    let mut worklist: Vec<Utf8PathBuf> = vec![main_map];

    while let Some(path) = worklist.pop() {
        tracing::debug!("Scanning {path}");
        let text = read_latin1(&path)?;

        // Brush/patch materials live outside entity blocks; the entity parser
        // never sees them, so the raw text is scanned separately.
        for caps in BRUSH_MAT_RE.captures_iter(&text) {
            used_materials.insert(caps[1].to_string());
        }
        for caps in PATCH_MAT_RE.captures_iter(&text) {
            used_materials.insert(caps[1].to_string());
        }

        for entity in parse_entities_text(&text) {
            let classname = entity.classname();

            if classname == "misc_model" {
                if let Some(model) = entity.get("model") {
                    if let Some(name) = model.strip_prefix("xmodel/") {
                        let name = name.trim();
                        if !name.is_empty() {
                            used_models.insert(name.to_string());
                        }
                    }
                }
            }

            for key in HIDDEN_FX_KEYS {
                if let Some(value) = entity.get(key) {
                    let value = value.trim();
                    if value.to_lowercase().contains("fx/") {
                        hidden_fx.insert(normalize_hidden_fx(value));
                    }
                }
            }

            if classname == "misc_prefab" {
                let Some(model) = entity.get("model") else {
                    continue;
                };
                if model.is_empty() || !model.ends_with(".map") {
                    continue;
                }
                let relative = model.strip_prefix("prefabs/").unwrap_or(model);
                let prefab_path = prefab_dir.join(relative);
                if !prefab_path.as_std_path().is_file() {
                    // Deleted prefabs are routinely left referenced.
                    continue;
                }
                if visited.insert(canonical_key(&prefab_path)) {
                    if let Some(file_name) = prefab_path.file_name() {
                        prefabs_processed.push(file_name.to_string());
                    }
                    worklist.push(prefab_path);
                }
            }
        }
    }

    let missing_models: Vec<String> = used_models
        .iter()
        .filter(|name| !model_catalog.contains(name))
        .cloned()
        .collect();
    let missing_materials: Vec<String> = used_materials
        .iter()
        .filter(|name| !material_catalog.contains(name))
        .cloned()
        .collect();

    let stock_models = used_models.len() - missing_models.len();
    let stock_materials = used_materials.len() - missing_materials.len();

    tracing::info!(
        "Resolved {map_name}: {} custom models ({stock_models} stock), {} custom materials \
         ({stock_materials} stock), {} prefabs",
        missing_models.len(),
        missing_materials.len(),
        prefabs_processed.len()
    );

    let mut texture_bases: HashSet<String> = HashSet::new();
    for material in &missing_materials {
        texture_bases.extend(material_textures(game, material)?);
    }
    let missing_textures: Vec<String> = texture_bases
        .into_iter()
        .sorted()
        .map(|base| format!("{base}.iwi"))
        .collect();

    Ok(Resolution {
        used_models,
        used_materials,
        missing_models,
        missing_materials,
        missing_textures,
        hidden_fx_paths: hidden_fx.into_iter().collect(),
        stock_models,
        stock_materials,
        prefabs_processed,
    })
}

/// Normalize an effect reference found in an entity field: forward slashes,
/// trimmed, `.efx` appended when absent (case-insensitive check).
fn normalize_hidden_fx(value: &str) -> String {
    let mut path = value.replace('\\', "/").trim().to_string();
    if !path.to_lowercase().ends_with(".efx") {
        path.push_str(".efx");
    }
    path
}

/// Visited-set key for a map file. Falls back to the raw path when
/// canonicalization fails (the file existed a moment ago).
fn canonical_key(path: &Utf8PathBuf) -> Utf8PathBuf {
    path.canonicalize_utf8().unwrap_or_else(|_| path.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use std::fs;
    use tempfile::tempdir;

    struct Fixture {
        _tmp: tempfile::TempDir,
        game: GameDir,
    }

    impl Fixture {
        fn new() -> Self {
            let tmp = tempdir().unwrap();
            fs::create_dir_all(tmp.path().join("map_source/prefabs")).unwrap();
            let game =
                GameDir::new(Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).unwrap());
            Self { _tmp: tmp, game }
        }

        fn write_map(&self, name: &str, text: &str) {
            fs::write(
                self.game.map_source_dir().join(name).as_std_path(),
                text,
            )
            .unwrap();
        }

        fn write_prefab(&self, name: &str, text: &str) {
            fs::write(self.game.prefab_dir().join(name).as_std_path(), text).unwrap();
        }
    }

    #[test]
    fn missing_main_map_is_fatal() {
        let fx = Fixture::new();
        let result = resolve_missing_assets(
            &fx.game,
            "mp_nope",
            &AssetCatalog::default(),
            &AssetCatalog::default(),
        );
        assert!(matches!(result, Err(Error::MapNotFound(_))));
    }

    #[test]
    fn model_with_missing_prefab_resolves() {
        let fx = Fixture::new();
        fx.write_map(
            "mp_test.map",
            r#"
{
"classname" "misc_model"
"model" "xmodel/crate_01"
}
{
"classname" "misc_prefab"
"model" "prefabs/gone/forever.map"
}
"#,
        );

        let resolution = resolve_missing_assets(
            &fx.game,
            "mp_test",
            &AssetCatalog::default(),
            &AssetCatalog::default(),
        )
        .unwrap();

        assert_eq!(resolution.used_models.len(), 1);
        assert!(resolution.used_models.contains("crate_01"));
        assert_eq!(resolution.missing_models, vec!["crate_01"]);
        assert!(resolution.prefabs_processed.is_empty());
        assert_eq!(resolution.stock_models, 0);
    }

    #[test]
    fn prefab_cycle_terminates_each_file_once() {
        let fx = Fixture::new();
        fx.write_map(
            "mp_test.map",
            "{\n\"classname\" \"misc_prefab\"\n\"model\" \"prefabs/a.map\"\n}\n",
        );
        fx.write_prefab(
            "a.map",
            "{\n\"classname\" \"misc_prefab\"\n\"model\" \"b.map\"\n}\n\
             {\n\"classname\" \"misc_model\"\n\"model\" \"xmodel/lamp_post2\"\n}\n",
        );
        fx.write_prefab(
            "b.map",
            "{\n\"classname\" \"misc_prefab\"\n\"model\" \"a.map\"\n}\n",
        );

        let resolution = resolve_missing_assets(
            &fx.game,
            "mp_test",
            &AssetCatalog::default(),
            &AssetCatalog::default(),
        )
        .unwrap();

        assert_eq!(resolution.prefabs_processed, vec!["a.map", "b.map"]);
        assert!(resolution.used_models.contains("lamp_post2"));
    }

    #[test]
    fn missing_is_subset_of_used() {
        let fx = Fixture::new();
        fx.write_map(
            "mp_test.map",
            r#"
{
"classname" "misc_model"
"model" "xmodel/crate_01"
}
{
"classname" "misc_model"
"model" "xmodel/fence_wood"
}
"#,
        );

        // Empty catalog: everything used is missing.
        let empty = AssetCatalog::default();
        let resolution =
            resolve_missing_assets(&fx.game, "mp_test", &empty, &empty).unwrap();
        let used: Vec<_> = resolution.used_models.iter().cloned().collect();
        assert_eq!(resolution.missing_models, used);

        // Superset catalog: nothing is missing, everything counts as stock.
        let superset = AssetCatalog::from_names(["crate_01", "fence_wood", "extra"]);
        let resolution =
            resolve_missing_assets(&fx.game, "mp_test", &superset, &empty).unwrap();
        assert!(resolution.missing_models.is_empty());
        assert_eq!(resolution.stock_models, 2);
    }

    #[test]
    fn brush_and_patch_materials_are_collected() {
        let fx = Fixture::new();
        fx.write_map(
            "mp_test.map",
            "{\n\
             ( 0 0 1 ) ( 0 0 0 ) ( 0 1 0 ) ) ) ) crate_side 64 64 0\n\
             patchDef2\n{\ncobble/street_wet\n( 3 3 0 0 0 )\n}\n\
             }\n",
        );

        let resolution = resolve_missing_assets(
            &fx.game,
            "mp_test",
            &AssetCatalog::default(),
            &AssetCatalog::from_names(["cobble/street_wet"]),
        )
        .unwrap();

        assert!(resolution.used_materials.contains("crate_side"));
        assert!(resolution.used_materials.contains("cobble/street_wet"));
        assert_eq!(resolution.missing_materials, vec!["crate_side"]);
        assert_eq!(resolution.stock_materials, 1);
    }

    #[test]
    fn hidden_fx_paths_are_normalized_and_sorted() {
        let fx = Fixture::new();
        fx.write_map(
            "mp_test.map",
            r#"
{
"classname" "script_model"
"script_fx" "fx/smoke\barrel_smoke"
}
{
"classname" "trigger_multiple"
"targetname" "FX/fire/small.EFX"
}
{
"classname" "info_null"
"targetname" "nothing_to_see"
}
"#,
        );

        let resolution = resolve_missing_assets(
            &fx.game,
            "mp_test",
            &AssetCatalog::default(),
            &AssetCatalog::default(),
        )
        .unwrap();

        assert_eq!(
            resolution.hidden_fx_paths,
            vec!["FX/fire/small.EFX", "fx/smoke/barrel_smoke.efx"]
        );
    }

    #[test]
    fn textures_come_from_missing_materials() {
        let fx = Fixture::new();
        fx.write_map(
            "mp_test.map",
            "{\n) ) ) crate_side\n) ) ) stock_wall\n}\n",
        );

        let materials = fx.game.root().join("raw/materials");
        fs::create_dir_all(materials.as_std_path()).unwrap();
        fs::write(
            materials.join("crate_side").as_std_path(),
            b"colorMap\0textures/crate_side_c.tga\0",
        )
        .unwrap();
        fs::write(
            materials.join("stock_wall").as_std_path(),
            b"colorMap\0textures/stock_wall_c.tga\0",
        )
        .unwrap();

        let resolution = resolve_missing_assets(
            &fx.game,
            "mp_test",
            &AssetCatalog::default(),
            &AssetCatalog::from_names(["stock_wall"]),
        )
        .unwrap();

        // Only the custom material's textures are pulled in.
        assert_eq!(resolution.missing_textures, vec!["crate_side_c.iwi"]);
    }
}
