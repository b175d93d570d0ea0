//! Addressing scenarios: deterministic URL/path mapping

use map_tile_downloader::address::{restore_font_name, slug_font_name, Addresser, MapType, WorkUnit};
use std::path::{Path, PathBuf};

#[test]
fn zoom_zero_world_tile_address() {
    let addresser = Addresser::new("k");
    let unit = WorkUnit::Tile {
        map_type: MapType::Satellite,
        zoom: 0,
        x: 0,
        y: 0,
    };
    let addr = addresser.address(&unit, Path::new("out"));
    assert_eq!(addr.path, PathBuf::from("out/0/0/0.jpg"));
    assert_eq!(
        addr.url,
        "https://api.maptiler.com/tiles/satellite-v2/0/0/0.jpg?key=k"
    );
}

#[test]
fn noto_sans_bold_second_range() {
    let addresser = Addresser::new("QOCNp1pWErFc8sgXrGwI");
    let slug = slug_font_name("Noto Sans Bold");
    assert_eq!(slug, "noto-sans-bold");

    let unit = WorkUnit::GlyphRange {
        font: slug,
        start: 256,
        end: 511,
    };
    let addr = addresser.address(&unit, Path::new("fonts"));
    assert!(addr.url.contains("/fonts/noto-sans-bold/256-511.pbf"));
    assert_eq!(addr.path, PathBuf::from("fonts/Noto Sans Bold/256-511.pbf"));
}

#[test]
fn terrain_tiles_use_webp_extension() {
    let addresser = Addresser::new("k");
    let unit = WorkUnit::Tile {
        map_type: MapType::TerrainRgb,
        zoom: 9,
        x: 255,
        y: 170,
    };
    let addr = addresser.address(&unit, Path::new("t"));
    assert_eq!(addr.path, PathBuf::from("t/9/255/170.webp"));
    assert!(addr.url.contains("/tiles/terrain-rgb-v2/9/255/170.webp?"));
}

#[test]
fn custom_base_url_is_honored() {
    let addresser = Addresser::new("k").with_base_url("http://127.0.0.1:9000");
    let unit = WorkUnit::Tile {
        map_type: MapType::Vector,
        zoom: 1,
        x: 1,
        y: 0,
    };
    let addr = addresser.address(&unit, Path::new("out"));
    assert_eq!(addr.url, "http://127.0.0.1:9000/tiles/v3/1/1/0.pbf?key=k");
}

#[test]
fn multi_word_font_names_roundtrip() {
    for name in ["Noto Sans Regular", "Noto Sans Italic", "Open Sans Semibold"] {
        assert_eq!(restore_font_name(&slug_font_name(name)), name);
    }
}
