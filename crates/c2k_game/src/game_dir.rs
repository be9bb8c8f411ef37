//! CoD2 installation layout.
//!
//! All asset lookups in the workspace go through [`GameDir`] so the directory
//! conventions live in exactly one place. The layout mirrors a retail install:
//!
//! ```text
//! <root>/
//!   map_source/              designer-authored .map files
//!   map_source/prefabs/      reusable .map fragments
//!   raw/materials/           override tree (wins over main/)
//!   main/xmodel/             model files
//!   main/xmodelsurfs/        model surface files
//!   main/xmodelparts/        model parts files
//!   main/materials/          material files
//!   main/images/             .iwi textures
//!   main/fx/                 .efx effect files
//!   main/maps/mp/            per-map scripts, briefing CSV, compiled bsp
//!   main/mp/                 .arena metadata
//!   main/soundaliases/       sound alias CSVs
//!   main/sound/              audio files
//!   main/sun/                sun/lighting parameter files
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::io;

/// Filesystem layout of a Call of Duty 2 installation.
///
/// Cheap to clone; holds only the root path. Methods never touch the disk
/// unless documented otherwise.
#[derive(Debug, Clone)]
pub struct GameDir {
    root: Utf8PathBuf,
}

impl GameDir {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// `map_source/`: where designer-authored `.map` files live.
    pub fn map_source_dir(&self) -> Utf8PathBuf {
        self.root.join("map_source")
    }

    /// `map_source/prefabs/`: prefab inclusions are resolved against this.
    pub fn prefab_dir(&self) -> Utf8PathBuf {
        self.map_source_dir().join("prefabs")
    }

    /// Full path of a map's level-source file.
    pub fn map_source_path(&self, map_name: &str) -> Utf8PathBuf {
        self.map_source_dir().join(format!("{map_name}.map"))
    }

    /// Model file (no extension) under `main/xmodel/`.
    pub fn xmodel_path(&self, model_name: &str) -> Utf8PathBuf {
        self.root.join("main").join("xmodel").join(model_name)
    }

    /// Model surface file under `main/xmodelsurfs/`.
    pub fn xmodel_surf_path(&self, surf_name: &str) -> Utf8PathBuf {
        self.root.join("main").join("xmodelsurfs").join(surf_name)
    }

    /// Model parts file under `main/xmodelparts/`.
    pub fn xmodel_parts_path(&self, parts_name: &str) -> Utf8PathBuf {
        self.root.join("main").join("xmodelparts").join(parts_name)
    }

    /// Candidate locations for a material file, override tree first.
    pub fn material_paths(&self, material_name: &str) -> [Utf8PathBuf; 2] {
        [
            self.root.join("raw").join("materials").join(material_name),
            self.root.join("main").join("materials").join(material_name),
        ]
    }

    /// First existing material file for `material_name`, `raw/` winning over
    /// `main/`. Touches the disk.
    pub fn find_material(&self, material_name: &str) -> Option<Utf8PathBuf> {
        self.material_paths(material_name)
            .into_iter()
            .find(|p| p.is_file())
    }

    /// `main/images/`: the texture tree.
    pub fn images_dir(&self) -> Utf8PathBuf {
        self.root.join("main").join("images")
    }

    /// A texture file (filename includes its extension) in the texture tree.
    pub fn image_path(&self, file_name: &str) -> Utf8PathBuf {
        self.images_dir().join(file_name)
    }

    /// Resolve a game-relative effect path (`fx/...`) to its disk location.
    pub fn fx_file_path(&self, game_path: &str) -> Utf8PathBuf {
        self.root.join("main").join(game_path)
    }

    /// `main/maps/mp/`: generated per-map scripts and metadata.
    pub fn maps_mp_dir(&self) -> Utf8PathBuf {
        self.root.join("main").join("maps").join("mp")
    }

    /// The map's main GSC script.
    pub fn main_script_path(&self, map_name: &str) -> Utf8PathBuf {
        self.maps_mp_dir().join(format!("{map_name}.gsc"))
    }

    /// The map's FX GSC script.
    pub fn fx_script_path(&self, map_name: &str) -> Utf8PathBuf {
        self.maps_mp_dir().join(format!("{map_name}_fx.gsc"))
    }

    /// The map's level-briefing CSV.
    pub fn briefing_csv_path(&self, map_name: &str) -> Utf8PathBuf {
        self.maps_mp_dir().join(format!("{map_name}.csv"))
    }

    /// The map's compiled geometry.
    pub fn compiled_bsp_path(&self, map_name: &str) -> Utf8PathBuf {
        self.maps_mp_dir().join(format!("{map_name}.d3dbsp"))
    }

    /// The map's arena metadata file.
    pub fn arena_path(&self, map_name: &str) -> Utf8PathBuf {
        self.root.join("main").join("mp").join(format!("{map_name}.arena"))
    }

    /// The map's sound alias CSV.
    pub fn soundalias_csv_path(&self, map_name: &str) -> Utf8PathBuf {
        self.root
            .join("main")
            .join("soundaliases")
            .join(format!("{map_name}.csv"))
    }

    /// The map's sun/lighting parameter file.
    pub fn sun_path(&self, map_name: &str) -> Utf8PathBuf {
        self.root.join("main").join("sun").join(format!("{map_name}.sun"))
    }

    /// An audio file referenced by a sound alias row (path relative to
    /// `main/sound/`).
    pub fn sound_path(&self, relative: &str) -> Utf8PathBuf {
        self.root.join("main").join("sound").join(relative)
    }

    /// List multiplayer map names found in `map_source/`.
    ///
    /// Only `mp_*` and `dupe_*` stems count; everything else in the folder is
    /// single-player or scratch content. A missing `map_source/` directory
    /// yields an empty list. Returned sorted.
    pub fn list_maps(&self) -> io::Result<Vec<String>> {
        let dir = self.map_source_dir();
        if !dir.as_std_path().is_dir() {
            return Ok(Vec::new());
        }

        let mut maps = Vec::new();
        for entry in fs::read_dir(dir.as_std_path())? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("map") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if stem.starts_with("mp_") || stem.starts_with("dupe_") {
                maps.push(stem.to_string());
            }
        }

        maps.sort();
        Ok(maps)
    }

    /// Create the output directories generated per-map files are written into
    /// (`maps/mp`, `sun`, `mp` under the root). Idempotent.
    pub fn ensure_output_dirs(&self) -> io::Result<()> {
        for dir in [
            self.root.join("maps").join("mp"),
            self.root.join("sun"),
            self.root.join("mp"),
        ] {
            fs::create_dir_all(dir.as_std_path())?;
        }
        Ok(())
    }
}
