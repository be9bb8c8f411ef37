//! Entity key/value parser for level-source files.
//!
//! A `.map` file interleaves flat entity blocks with brush/patch geometry:
//!
//! ```text
//! {
//! "classname" "misc_model"
//! "model" "xmodel/crate_01"
//! }
//! ```
//!
//! Only the key/value lines matter to asset resolution, so this parser scans
//! line by line and skips everything that doesn't look like a quoted pair,
//! which is how the (much larger) geometry payload is ignored without a real
//! grammar. Nesting is not part of the format: a `{` line opens an entity,
//! a `}` line closes it.

use crate::error::Result;
use camino::Utf8Path;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// `"key" "value"`; value may be empty. Anchored at the line start,
/// tolerating leading whitespace.
static KEYVALUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\s*"([^"]+)"\s*"([^"]*)""#).unwrap());

/// One flat key→value record from a level-source file.
///
/// Duplicate keys within a block are last-write-wins, matching how the game
/// itself reads these blocks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entity {
    fields: HashMap<String, String>,
}

impl Entity {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// The entity's `classname`, lowercased. Empty string when absent.
    pub fn classname(&self) -> String {
        self.get("classname").unwrap_or_default().to_lowercase()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.fields.insert(key.to_string(), value.to_string());
    }
}

/// Read a file with byte-preserving Latin-1 decoding.
///
/// Map editors write arbitrary bytes into these files, so UTF-8 decoding
/// would fail on real-world content. Every byte maps to the char with the
/// same code point, which round-trips losslessly for the ASCII ranges the
/// regexes care about.
pub fn read_latin1(path: &Utf8Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path.as_std_path())?;
    Ok(bytes.iter().map(|&b| b as char).collect())
}

/// Parse the entities of a level-source file.
///
/// A missing file yields an empty list, not an error; prefab references to
/// deleted files are common in hand-authored maps.
pub fn parse_entities(path: &Utf8Path) -> Result<Vec<Entity>> {
    if !path.as_std_path().is_file() {
        return Ok(Vec::new());
    }
    let text = read_latin1(path)?;
    Ok(parse_entities_text(&text))
}

/// Parse entities out of level-source text.
///
/// Rules, in order, per line (after trimming):
/// - `{` opens a new entity
/// - `}` closes and emits the current entity, if one is open
/// - `//` comment lines are skipped
/// - `"key" "value"` sets a key on the current entity (last-write-wins)
/// - anything else (geometry payload, malformed lines) is silently skipped
pub fn parse_entities_text(text: &str) -> Vec<Entity> {
    let mut entities = Vec::new();
    let mut current: Option<Entity> = None;

    for line in text.lines() {
        let stripped = line.trim();
        if stripped == "{" {
            current = Some(Entity::default());
        } else if stripped == "}" {
            if let Some(entity) = current.take() {
                entities.push(entity);
            }
        } else if let Some(entity) = current.as_mut() {
            if stripped.starts_with("//") {
                continue;
            }
            if let Some(caps) = KEYVALUE_RE.captures(line) {
                entity.set(&caps[1], &caps[2]);
            }
        }
    }

    entities
}
