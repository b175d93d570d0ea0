//! Resource addressing: one work unit to one URL and one local path
//!
//! A [`WorkUnit`] identifies a single fetchable resource (one map tile or
//! one 256-codepoint glyph range of a font stack). The [`Addresser`] maps a
//! unit deterministically onto the request URL and the on-disk path; no two
//! distinct units ever share a path, which is what makes presence-only
//! resumability sound.
//!
//! Local layout:
//! - tiles: `{out_dir}/{zoom}/{x}/{y}.{ext}`
//! - fonts: `{out_dir}/{Display Font Name}/{start}-{end}.pbf`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default API host.
pub const DEFAULT_BASE_URL: &str = "https://api.maptiler.com";

/// Addressing errors
#[derive(Debug, thiserror::Error)]
pub enum AddressError {
    /// Unrecognized map type alias
    #[error("invalid map type: {input}. Valid map types are: {valid}")]
    UnknownMapType { input: String, valid: String },
}

/// Supported map tile layers.
///
/// The file extension per layer is a closed mapping: adding a layer means
/// adding one `slug`/`extension` entry, never branching logic elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MapType {
    /// Satellite imagery (JPEG)
    Satellite,
    /// Contour lines (vector PBF)
    Contours,
    /// Terrain elevation encoded as RGB (WebP)
    TerrainRgb,
    /// General-purpose vector tiles (PBF)
    Vector,
}

impl MapType {
    /// Server-side layer identifier used in tile URLs.
    pub fn slug(self) -> &'static str {
        match self {
            MapType::Satellite => "satellite-v2",
            MapType::Contours => "contours-v2",
            MapType::TerrainRgb => "terrain-rgb-v2",
            MapType::Vector => "v3",
        }
    }

    /// File extension for tiles of this layer.
    pub fn extension(self) -> &'static str {
        match self {
            MapType::Satellite => "jpg",
            MapType::Contours => "pbf",
            MapType::TerrainRgb => "webp",
            MapType::Vector => "pbf",
        }
    }

    /// Accepted command-line aliases per layer.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            MapType::Satellite => &["satellite", "satellite-v2", "satellitev2", "sat"],
            MapType::Contours => &["contours", "contours-v2", "contoursv2", "cnt"],
            MapType::TerrainRgb => &[
                "terrain",
                "terrainrgb",
                "terrain-rgb",
                "terrain-rgb-v2",
                "terrainrgbv2",
                "trgb",
            ],
            MapType::Vector => &["v3", "v3tiles", "v3-tiles"],
        }
    }

    /// All supported layers.
    pub fn all() -> &'static [MapType] {
        &[
            MapType::Satellite,
            MapType::Contours,
            MapType::TerrainRgb,
            MapType::Vector,
        ]
    }
}

impl fmt::Display for MapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for MapType {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.to_lowercase();
        for &map_type in MapType::all() {
            if map_type.aliases().contains(&needle.as_str()) {
                return Ok(map_type);
            }
        }
        let valid = MapType::all()
            .iter()
            .map(|t| format!("{} ({})", t.slug(), t.aliases().join(", ")))
            .collect::<Vec<_>>()
            .join("; ");
        Err(AddressError::UnknownMapType {
            input: s.to_string(),
            valid,
        })
    }
}

/// One fetchable resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkUnit {
    /// One map tile.
    Tile {
        map_type: MapType,
        zoom: u8,
        x: u32,
        y: u32,
    },
    /// One 256-codepoint glyph range of a font stack. `font` is the
    /// slugged stack name (e.g. `noto-sans-bold`), `end == start + 255`.
    GlyphRange { font: String, start: u32, end: u32 },
}

impl fmt::Display for WorkUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkUnit::Tile { zoom, x, y, .. } => write!(f, "{zoom}/{x}/{y}"),
            WorkUnit::GlyphRange { start, end, .. } => write!(f, "range {start}-{end}"),
        }
    }
}

/// URL plus local path for a single unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceAddress {
    pub url: String,
    pub path: PathBuf,
}

/// Slug a display font name for use in URLs: `Noto Sans Bold` ->
/// `noto-sans-bold`.
pub fn slug_font_name(display: &str) -> String {
    display.to_lowercase().replace(' ', "-")
}

/// Restore the display form of a slugged font name: `noto-sans-bold` ->
/// `Noto Sans Bold`. Inverse of [`slug_font_name`] up to capitalization.
pub fn restore_font_name(slug: &str) -> String {
    slug.split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Builds request URLs and local file paths for work units.
#[derive(Debug, Clone)]
pub struct Addresser {
    base_url: String,
    api_key: String,
}

impl Addresser {
    /// Create an addresser for the default API host.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
        }
    }

    /// Override the API host (used by tests to point at a mock server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// The `(url, local_path)` pair for `unit`, rooted at `out_dir`.
    pub fn address(&self, unit: &WorkUnit, out_dir: &Path) -> ResourceAddress {
        match unit {
            WorkUnit::Tile {
                map_type,
                zoom,
                x,
                y,
            } => {
                let ext = map_type.extension();
                ResourceAddress {
                    url: format!(
                        "{}/tiles/{}/{}/{}/{}.{}?key={}",
                        self.base_url,
                        map_type.slug(),
                        zoom,
                        x,
                        y,
                        ext,
                        self.api_key
                    ),
                    path: out_dir
                        .join(zoom.to_string())
                        .join(x.to_string())
                        .join(format!("{y}.{ext}")),
                }
            }
            WorkUnit::GlyphRange { font, start, end } => ResourceAddress {
                url: format!(
                    "{}/fonts/{}/{}-{}.pbf?key={}",
                    self.base_url, font, start, end, self.api_key
                ),
                path: out_dir
                    .join(restore_font_name(font))
                    .join(format!("{start}-{end}.pbf")),
            },
        }
    }
}
