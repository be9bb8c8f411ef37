//! End-to-end packaging test over a synthetic game install.

use c2k_game::{AssetCatalog, FxCatalog, GameDir};
use c2k_iwd::{build_package, Error};
use c2k_map_source::resolve_missing_assets;
use camino::Utf8PathBuf;
use std::fs;
use std::fs::File;
use tempfile::tempdir;

fn write(root: &std::path::Path, relative: &str, contents: &[u8]) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

#[test]
fn packs_resolved_map_into_rerooted_archive() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    let game = GameDir::new(Utf8PathBuf::from_path_buf(root.to_path_buf()).unwrap());

    // Level source: one custom brush material, one custom model, one prefab.
    write(
        root,
        "map_source/mp_test.map",
        b"{\n\
          \"classname\" \"worldspawn\"\n\
          }\n\
          {\n\
          ( 0 0 1 ) ( 0 0 0 ) ( 0 1 0 ) ) ) ) crate_wood_mat 64 64\n\
          }\n\
          {\n\
          \"classname\" \"misc_model\"\n\
          \"model\" \"xmodel/crate_01\"\n\
          }\n\
          {\n\
          \"classname\" \"misc_prefab\"\n\
          \"model\" \"prefabs/dock.map\"\n\
          }\n",
    );
    // The prefab references a model whose file was never installed; it still
    // counts as used/missing but packs nothing.
    write(
        root,
        "map_source/prefabs/dock.map",
        b"{\n\"classname\" \"misc_model\"\n\"model\" \"xmodel/lamp_post2\"\n}\n",
    );

    // Custom model with one surface; materials inside the model are packaging
    // no-ops (only surfs and parts ship with a model).
    write(root, "main/xmodel/crate_01", b"crate_body1\0mtl_crate_wood\0");
    write(root, "main/xmodelsurfs/crate_body1", b"surf");
    write(root, "main/xmodelparts/crate_010", b"parts");

    // Custom brush material in the override tree, plus its texture.
    write(root, "raw/materials/crate_wood_mat", b"colorMap\0crate_wood_c.tga\0");
    write(root, "main/images/crate_wood_c.iwi", b"iwi");

    // Generated per-map files.
    write(
        root,
        "main/maps/mp/mp_test.gsc",
        b"main()\n{\n    maps\\mp\\mp_test_fx::main();\n    maps\\mp\\_load::main();\n}\n",
    );
    write(
        root,
        "main/maps/mp/mp_test_fx.gsc",
        b"main()\n{\n    level._effect[\"sparks\"] = loadfx(\"fx/custom/sparks\");\n    level._effect[\"rain\"] = loadfx(\"fx\\stock\\rain.efx\");\n}\n",
    );
    write(root, "main/maps/mp/mp_test.csv", b"levelBriefing,loadscreen_mp_test\n");
    write(root, "main/maps/mp/mp_test.d3dbsp", b"bsp");
    write(root, "main/mp/mp_test.arena", b"map mp_test");
    write(
        root,
        "main/soundaliases/mp_test.csv",
        b"# alias,sequence,file\nwind,,ambient/wind.wav,0.6\n",
    );
    write(root, "main/sun/mp_test.sun", b"sun");

    // Loadscreen material named by the briefing CSV, with its texture.
    write(
        root,
        "main/materials/loadscreen_mp_test",
        b"colorMap\0loadscreen_mp_test_img.tga\0",
    );
    write(root, "main/images/loadscreen_mp_test_img.iwi", b"iwi");

    // Custom effect referencing a second-order material + texture; the stock
    // effect exists on disk but is filtered by the FX catalog.
    write(root, "main/fx/custom/sparks.efx", b"shaders[ fx_spark ]");
    write(root, "main/fx/stock/rain.efx", b"efx");
    write(root, "raw/materials/fx_spark", b"colorMap\0spark_glow_c.tga\0");
    write(root, "main/images/spark_glow_c.iwi", b"iwi");

    // Sound referenced by the alias CSV.
    write(root, "main/sound/ambient/wind.wav", b"RIFF");

    let model_catalog = AssetCatalog::default();
    let material_catalog = AssetCatalog::default();
    let fx_catalog = FxCatalog::from_paths(["fx/stock/rain.efx"]);

    let resolution =
        resolve_missing_assets(&game, "mp_test", &model_catalog, &material_catalog).unwrap();
    assert_eq!(resolution.missing_models, vec!["crate_01", "lamp_post2"]);
    assert_eq!(resolution.missing_materials, vec!["crate_wood_mat"]);
    assert_eq!(resolution.missing_textures, vec!["crate_wood_c.iwi"]);
    assert_eq!(resolution.prefabs_processed, vec!["dock.map"]);

    let out = Utf8PathBuf::from_path_buf(root.join("zz_custom_mp_test.iwd")).unwrap();
    let count = build_package(
        &game,
        "mp_test",
        &resolution,
        &material_catalog,
        &fx_catalog,
        &out,
    )
    .unwrap();
    assert_eq!(count, 18);

    let mut archive = zip::ZipArchive::new(File::open(out.as_std_path()).unwrap()).unwrap();
    let mut names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    names.sort();

    assert_eq!(
        names,
        vec![
            "fx/custom/sparks.efx",
            "images/crate_wood_c.iwi",
            "images/loadscreen_mp_test_img.iwi",
            "images/spark_glow_c.iwi",
            "maps/mp/mp_test.csv",
            "maps/mp/mp_test.d3dbsp",
            "maps/mp/mp_test.gsc",
            "maps/mp/mp_test_fx.gsc",
            "materials/crate_wood_mat",
            "materials/fx_spark",
            "materials/loadscreen_mp_test",
            "mp/mp_test.arena",
            "sound/ambient/wind.wav",
            "soundaliases/mp_test.csv",
            "sun/mp_test.sun",
            "xmodel/crate_01",
            "xmodelparts/crate_010",
            "xmodelsurfs/crate_body1",
        ]
    );

    // The stock effect never made it in.
    assert!(!names.iter().any(|n| n.contains("rain")));
}

#[test]
fn packaging_nothing_fails_without_creating_archive() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    let game = GameDir::new(Utf8PathBuf::from_path_buf(root.to_path_buf()).unwrap());

    // A map with no custom assets and no generated files.
    write(root, "map_source/mp_bare.map", b"{\n\"classname\" \"worldspawn\"\n}\n");

    let catalog = AssetCatalog::default();
    let resolution = resolve_missing_assets(&game, "mp_bare", &catalog, &catalog).unwrap();

    let out = Utf8PathBuf::from_path_buf(root.join("zz_custom_mp_bare.iwd")).unwrap();
    let result = build_package(
        &game,
        "mp_bare",
        &resolution,
        &catalog,
        &FxCatalog::default(),
        &out,
    );

    assert!(matches!(result, Err(Error::NothingToPack)));
    assert!(!out.as_std_path().exists());
}
