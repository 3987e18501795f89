//! Shape libraries: named style templates loaded from TOML tables.
//!
//! ```toml
//! [rectangle]
//! whiteSpace = "wrap"
//! html = 1
//!
//! [rounded_rectangle]
//! inherit = "rectangle"
//! rounded = 1
//! ```
//!
//! `inherit` copies another entry and overlays this one on top (this entry wins). Chains resolve
//! depth-first. The reserved key `baseStyle` holds the bare base-style token.

use super::{StyleDict, StyleValue};
use crate::error::{Error, Result};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::path::Path;
use std::sync::OnceLock;

const INHERIT_KEY: &str = "inherit";
const BASE_STYLE_KEY: &str = "baseStyle";

type RawTable = IndexMap<String, StyleValue>;
type RawLibrary = IndexMap<String, RawTable>;

#[derive(Debug, Clone, PartialEq)]
pub struct ShapeLibrary {
    name: String,
    objects: IndexMap<String, StyleDict>,
}

impl ShapeLibrary {
    pub fn from_toml_str(name: impl Into<String>, text: &str) -> Result<Self> {
        let raw: RawLibrary = toml::from_str(text).map_err(|e| Error::LibraryFormat {
            message: e.to_string(),
        })?;
        Self::from_raw(name.into(), &raw)
    }

    /// Loads a library file; the library is named after the file stem.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_toml_str(name, &text)
    }

    fn from_raw(name: String, raw: &RawLibrary) -> Result<Self> {
        let mut memo: FxHashMap<String, StyleDict> = FxHashMap::default();
        let mut objects = IndexMap::with_capacity(raw.len());
        for key in raw.keys() {
            let dict = resolve_entry(key, raw, &mut memo, &mut Vec::new())?;
            objects.insert(key.clone(), dict);
        }
        tracing::debug!(library = %name, objects = objects.len(), "loaded shape library");
        Ok(Self { name, objects })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, object: &str) -> Option<&StyleDict> {
        self.objects.get(object)
    }

    /// Like [`ShapeLibrary::get`], but a miss is an [`Error::UnknownLibraryObject`].
    pub fn object(&self, object: &str) -> Result<&StyleDict> {
        self.get(object).ok_or_else(|| Error::UnknownLibraryObject {
            library: self.name.clone(),
            name: object.to_string(),
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.objects.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

fn resolve_entry(
    key: &str,
    raw: &RawLibrary,
    memo: &mut FxHashMap<String, StyleDict>,
    visiting: &mut Vec<String>,
) -> Result<StyleDict> {
    if let Some(done) = memo.get(key) {
        return Ok(done.clone());
    }
    let Some(entry) = raw.get(key) else {
        return Err(Error::LibraryFormat {
            message: format!("unknown inherited entry `{key}`"),
        });
    };
    if visiting.iter().any(|k| k == key) {
        return Err(Error::LibraryFormat {
            message: format!("inheritance cycle through `{key}`"),
        });
    }
    visiting.push(key.to_string());

    let mut dict = match entry.get(INHERIT_KEY) {
        None => StyleDict::new(),
        Some(StyleValue::Str(parent)) => resolve_entry(parent, raw, memo, visiting)?,
        Some(other) => {
            return Err(Error::LibraryFormat {
                message: format!("`{key}.inherit` must be a string, got `{other}`"),
            });
        }
    };
    for (k, v) in entry {
        match k.as_str() {
            INHERIT_KEY => {}
            BASE_STYLE_KEY => dict.set_base_style(Some(v.to_style_string())),
            _ => dict.insert(k.clone(), v.clone()),
        }
    }

    visiting.pop();
    memo.insert(key.to_string(), dict.clone());
    Ok(dict)
}

/// Whether the named line end honours `startFill` / `endFill`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct LineEndSpec {
    #[serde(default)]
    pub fillable: bool,
}

/// Style fragments behind the edge `waypoints`, `connection` and `pattern` tokens, plus the
/// line-end table.
#[derive(Debug, Clone)]
pub struct EdgeStyleCatalog {
    pub waypoints: ShapeLibrary,
    pub connection: ShapeLibrary,
    pub pattern: ShapeLibrary,
    pub line_ends: IndexMap<String, LineEndSpec>,
}

#[derive(Deserialize)]
struct RawEdgeCatalog {
    waypoints: RawLibrary,
    connection: RawLibrary,
    pattern: RawLibrary,
    line_ends: IndexMap<String, LineEndSpec>,
}

impl EdgeStyleCatalog {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let raw: RawEdgeCatalog = toml::from_str(text).map_err(|e| Error::LibraryFormat {
            message: e.to_string(),
        })?;
        Ok(Self {
            waypoints: ShapeLibrary::from_raw("waypoints".to_string(), &raw.waypoints)?,
            connection: ShapeLibrary::from_raw("connection".to_string(), &raw.connection)?,
            pattern: ShapeLibrary::from_raw("pattern".to_string(), &raw.pattern)?,
            line_ends: raw.line_ends,
        })
    }

    pub fn is_fillable(&self, line_end: &str) -> bool {
        self.line_ends.get(line_end).is_some_and(|end| end.fillable)
    }
}

const GENERAL_TOML: &str = include_str!("../../catalogs/general.toml");
const FLOWCHART_TOML: &str = include_str!("../../catalogs/flowchart.toml");
const INFOGRAPHICS_TOML: &str = include_str!("../../catalogs/infographics.toml");
const LINE_STYLES_TOML: &str = include_str!("../../catalogs/line_styles.toml");
const EDGE_STYLES_TOML: &str = include_str!("../../catalogs/edge_styles.toml");

fn builtin_library(
    cell: &'static OnceLock<ShapeLibrary>,
    name: &str,
    text: &str,
) -> &'static ShapeLibrary {
    cell.get_or_init(|| {
        ShapeLibrary::from_toml_str(name, text).expect("built-in shape library is valid")
    })
}

/// General shapes: rectangles, ellipses, text, containers, lists, …
pub fn general() -> &'static ShapeLibrary {
    static LIB: OnceLock<ShapeLibrary> = OnceLock::new();
    builtin_library(&LIB, "general", GENERAL_TOML)
}

pub fn flowchart() -> &'static ShapeLibrary {
    static LIB: OnceLock<ShapeLibrary> = OnceLock::new();
    builtin_library(&LIB, "flowchart", FLOWCHART_TOML)
}

pub fn infographics() -> &'static ShapeLibrary {
    static LIB: OnceLock<ShapeLibrary> = OnceLock::new();
    builtin_library(&LIB, "infographics", INFOGRAPHICS_TOML)
}

/// `dashed` / `dashPattern` presets used by shape line patterns.
pub fn line_styles() -> &'static ShapeLibrary {
    static LIB: OnceLock<ShapeLibrary> = OnceLock::new();
    builtin_library(&LIB, "line_styles", LINE_STYLES_TOML)
}

pub fn edge_styles() -> &'static EdgeStyleCatalog {
    static CATALOG: OnceLock<EdgeStyleCatalog> = OnceLock::new();
    CATALOG.get_or_init(|| {
        EdgeStyleCatalog::from_toml_str(EDGE_STYLES_TOML).expect("built-in edge catalog is valid")
    })
}

/// Looks up a built-in shape library by name.
pub fn builtin(name: &str) -> Option<&'static ShapeLibrary> {
    match name {
        "general" => Some(general()),
        "flowchart" => Some(flowchart()),
        "infographics" => Some(infographics()),
        "line_styles" => Some(line_styles()),
        _ => None,
    }
}
