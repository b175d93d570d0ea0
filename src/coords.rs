//! Web-Mercator slippy-tile coordinate math
//!
//! Pure functions mapping geographic coordinates onto the `2^z x 2^z` tile
//! grid, enumerating tile rectangles for a bounding box, and producing the
//! fixed glyph-range partition of the codepoint space.
//!
//! Zoom level `z` addresses a grid of `2^z` tiles per side: zoom 0 is a
//! single world tile `(0, 0)`, zoom 1 has four tiles, and so on.

use std::f64::consts::PI;

/// Longitude is clamped symmetrically just inside the antimeridian so the
/// normalized value stays strictly below 1.0.
const LNG_CLAMP: f64 = 179.999_999_99;

/// Latitude clamp presets.
///
/// Two clamp ranges exist historically: the standard Web-Mercator safe range
/// and an asymmetric legacy range used by the original tile tool. The legacy
/// range admits latitudes whose Mercator projection falls outside the grid,
/// which is what makes [`CoordsError::OutOfBounds`] reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LatitudeClamp {
    /// Standard Web-Mercator range, +/-85.0511 degrees.
    #[default]
    WebMercator,
    /// Legacy asymmetric range, [-89.99999999, 80.99999999] degrees.
    Legacy,
}

impl LatitudeClamp {
    /// The `(min, max)` latitude admitted by this preset.
    pub fn range(self) -> (f64, f64) {
        match self {
            LatitudeClamp::WebMercator => (-85.0511, 85.0511),
            LatitudeClamp::Legacy => (-89.999_999_99, 80.999_999_99),
        }
    }

    fn apply(self, lat: f64) -> f64 {
        let (min, max) = self.range();
        lat.clamp(min, max)
    }
}

/// One tile position within a zoom level's grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    /// Column, west to east.
    pub x: u32,
    /// Row, north to south.
    pub y: u32,
}

/// Geographic bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

/// Coordinate errors
#[derive(Debug, thiserror::Error)]
pub enum CoordsError {
    /// The projected tile rectangle leaves the `[0, 2^z)` grid on some axis.
    #[error(
        "tile rectangle ({min_x}, {min_y})-({max_x}, {max_y}) is outside the \
         {side}x{side} grid at zoom {zoom}"
    )]
    OutOfBounds {
        zoom: u8,
        min_x: i64,
        min_y: i64,
        max_x: i64,
        max_y: i64,
        side: i64,
    },
}

/// Project a longitude/latitude pair onto the tile grid at `zoom`.
///
/// Inputs are clamped (longitude to just inside the antimeridian, latitude
/// per the chosen preset) rather than wrapped or rejected. Zoom 0 always
/// maps to `(0, 0)`.
pub fn lnglat_to_tile(lng: f64, lat: f64, zoom: u8, clamp: LatitudeClamp) -> (i64, i64) {
    if zoom == 0 {
        return (0, 0);
    }
    let n = 2f64.powi(zoom as i32);
    let lng = lng.clamp(-LNG_CLAMP, LNG_CLAMP);
    let lat = clamp.apply(lat).to_radians();
    let lon_norm = lng / 360.0 + 0.5;
    let lat_norm = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0;
    ((n * lon_norm) as i64, (n * lat_norm) as i64)
}

/// Enumerate the full `2^z x 2^z` grid in deterministic order (x outer,
/// y inner).
pub fn full_grid(zoom: u8) -> Vec<TileCoord> {
    let side = 1u32 << zoom;
    let mut coords = Vec::with_capacity((side as usize) * (side as usize));
    for x in 0..side {
        for y in 0..side {
            coords.push(TileCoord { x, y });
        }
    }
    coords
}

/// Enumerate the inclusive tile rectangle covering `bounds` at `zoom`.
///
/// Both corners are projected with [`lnglat_to_tile`]; the rectangle spans
/// the per-axis min/max of the two results. If the rectangle exceeds the
/// grid on either axis the whole call fails with
/// [`CoordsError::OutOfBounds`] and yields no tiles at all, never a clamped
/// partial set.
pub fn tile_coords_in_bounds(
    bounds: &BoundingBox,
    zoom: u8,
    clamp: LatitudeClamp,
) -> Result<Vec<TileCoord>, CoordsError> {
    let side = 1i64 << zoom;
    let (x1, y1) = lnglat_to_tile(bounds.min_lon, bounds.min_lat, zoom, clamp);
    let (x2, y2) = lnglat_to_tile(bounds.max_lon, bounds.max_lat, zoom, clamp);
    let (min_x, max_x) = (x1.min(x2), x1.max(x2));
    let (min_y, max_y) = (y1.min(y2), y1.max(y2));

    if min_x < 0 || min_y < 0 || max_x >= side || max_y >= side {
        return Err(CoordsError::OutOfBounds {
            zoom,
            min_x,
            min_y,
            max_x,
            max_y,
            side,
        });
    }

    let mut coords =
        Vec::with_capacity(((max_x - min_x + 1) * (max_y - min_y + 1)) as usize);
    for x in min_x..=max_x {
        for y in min_y..=max_y {
            coords.push(TileCoord {
                x: x as u32,
                y: y as u32,
            });
        }
    }
    Ok(coords)
}

/// Number of codepoints per glyph file.
pub const GLYPHS_PER_RANGE: u32 = 256;

/// Last codepoint covered by the glyph range partition.
pub const GLYPH_CODEPOINT_MAX: u32 = 65_535;

/// The fixed partition of the codepoint space into 256-glyph ranges:
/// `(0, 255), (256, 511), ..., (65280, 65535)`.
pub fn glyph_ranges() -> Vec<(u32, u32)> {
    (0..=GLYPH_CODEPOINT_MAX)
        .step_by(GLYPHS_PER_RANGE as usize)
        .map(|start| (start, start + GLYPHS_PER_RANGE - 1))
        .collect()
}
