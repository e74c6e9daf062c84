use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

/// Longitude of the first column, in grid units.
const FIRST_COLUMN_X: i32 = -37;
/// Grid units between adjacent columns.
const COLUMN_STRIDE: i32 = 2;
/// Rows used by even-indexed columns.
const EVEN_ROWS: [i32; 5] = [-4, -2, 0, 2, 4];
/// Rows used by odd-indexed columns, offset by one unit so neighbours interlock.
const ODD_ROWS: [i32; 5] = [-3, -1, 1, 3, 5];
/// Slots per longitude column.
pub const ROWS_PER_COLUMN: usize = EVEN_ROWS.len();
/// Every tile spans two grid units on both axes.
const TILE_SPAN: f64 = 2.0;

/// A normalized image reference. Empty `src` means "nothing to show".
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageRef {
    pub src: String,
    pub alt: String,
}

impl ImageRef {
    pub fn new(src: impl Into<String>, alt: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            alt: alt.into(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.src.is_empty()
    }
}

impl From<&str> for ImageRef {
    fn from(src: &str) -> Self {
        Self::new(src, "")
    }
}

impl From<String> for ImageRef {
    fn from(src: String) -> Self {
        Self::new(src, "")
    }
}

/// A string field that tolerates any other value by treating it as absent.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
enum LenientString {
    Text(String),
    Other(IgnoredAny),
}

impl LenientString {
    fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Other(_) => String::new(),
        }
    }
}

/// A raw image pool entry as it appears in configuration, before normalization.
///
/// Accepts a bare path, a `{ src, alt }` table, or anything else; the last
/// normalizes to an empty reference instead of failing the whole load.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum ImageSource {
    Bare(String),
    Entry {
        #[serde(default)]
        src: Option<LenientString>,
        #[serde(default)]
        alt: Option<LenientString>,
    },
    Malformed(IgnoredAny),
}

impl From<ImageSource> for ImageRef {
    fn from(source: ImageSource) -> Self {
        match source {
            ImageSource::Bare(src) => ImageRef::new(src, ""),
            ImageSource::Entry { src, alt } => ImageRef::new(
                src.map(LenientString::into_string).unwrap_or_default(),
                alt.map(LenientString::into_string).unwrap_or_default(),
            ),
            ImageSource::Malformed(_) => ImageRef::empty(),
        }
    }
}

/// Deserialize an image pool, normalizing every entry.
pub fn deserialize_image_pool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<ImageRef>, D::Error> {
    let raw = Vec::<ImageSource>::deserialize(deserializer)?;
    Ok(raw.into_iter().map(ImageRef::from).collect())
}

/// One slot on the dome. Built once per pool/segment change and never mutated.
#[derive(Clone, Debug, PartialEq)]
pub struct Tile {
    pub grid_x: i32,
    pub grid_y: i32,
    pub size_x: f64,
    pub size_y: f64,
    pub image: ImageRef,
}

/// Total slot count for a given number of longitude columns.
pub fn slot_count(segments: usize) -> usize {
    segments * ROWS_PER_COLUMN
}

fn grid_coords(segments: usize) -> Vec<(i32, i32)> {
    (0..segments)
        .flat_map(|c| {
            let x = FIRST_COLUMN_X + c as i32 * COLUMN_STRIDE;
            let rows = if c % 2 == 0 { EVEN_ROWS } else { ODD_ROWS };
            rows.into_iter().map(move |y| (x, y))
        })
        .collect()
}

/// Lay the image pool out over `segments * 5` dome slots.
///
/// Images are reused cyclically so a small pool still covers the dome, then a
/// single left-to-right pass swaps out any tile repeating its predecessor's
/// `src` with the nearest later tile that differs.
pub fn build_tiles(pool: &[ImageRef], segments: usize) -> Vec<Tile> {
    let coords = grid_coords(segments);
    let total = coords.len();

    let mut images: Vec<ImageRef> = if pool.is_empty() {
        vec![ImageRef::empty(); total]
    } else {
        if pool.len() > total {
            log::warn!(
                "Provided image count ({}) exceeds available tiles ({total}). Some images will not be shown.",
                pool.len()
            );
        }
        (0..total).map(|i| pool[i % pool.len()].clone()).collect()
    };

    if !pool.is_empty() {
        separate_neighbours(&mut images);
    }

    coords
        .into_iter()
        .zip(images)
        .map(|((grid_x, grid_y), image)| Tile {
            grid_x,
            grid_y,
            size_x: TILE_SPAN,
            size_y: TILE_SPAN,
            image,
        })
        .collect()
}

fn separate_neighbours(images: &mut [ImageRef]) {
    for i in 1..images.len() {
        if images[i].src != images[i - 1].src {
            continue;
        }
        if let Some(offset) = images[i + 1..].iter().position(|img| img.src != images[i].src) {
            images.swap(i, i + 1 + offset);
        }
    }
}

/// The stock pool shown when nothing else is configured.
pub fn default_images() -> Vec<ImageRef> {
    let numbers = (1..=24).chain([23, 23]).chain(25..=30);
    numbers
        .map(|n| ImageRef::new(format!("/Image/n{n}.png"), format!("Image {n}")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn pool(srcs: &[&str]) -> Vec<ImageRef> {
        srcs.iter().map(|s| ImageRef::from(*s)).collect()
    }

    fn assert_no_adjacent_repeats(tiles: &[Tile]) {
        for pair in tiles.windows(2) {
            assert_ne!(pair[0].image.src, pair[1].image.src, "adjacent repeat at {:?}", pair[1]);
        }
    }

    #[test]
    fn test_tile_count_matches_slots() {
        for segments in [1, 2, 4, 7, 35] {
            for n in [0, 1, 3, 10, 200] {
                let images: Vec<ImageRef> = (0..n).map(|i| ImageRef::from(format!("img{i}"))).collect();
                assert_eq!(build_tiles(&images, segments).len(), segments * 5);
            }
        }
    }

    #[test]
    fn test_zero_segments_is_empty() {
        assert!(build_tiles(&pool(&["a"]), 0).is_empty());
    }

    #[test]
    fn test_empty_pool_gives_empty_tiles() {
        let tiles = build_tiles(&[], 3);
        assert_eq!(tiles.len(), 15);
        assert!(tiles.iter().all(|t| t.image.is_empty()));
    }

    #[test]
    fn test_grid_coordinates_interlock() {
        let tiles = build_tiles(&pool(&["a", "b"]), 3);
        let first_col: Vec<i32> = tiles[..5].iter().map(|t| t.grid_y).collect();
        let second_col: Vec<i32> = tiles[5..10].iter().map(|t| t.grid_y).collect();
        assert_eq!(first_col, vec![-4, -2, 0, 2, 4]);
        assert_eq!(second_col, vec![-3, -1, 1, 3, 5]);
        assert!(tiles[..5].iter().all(|t| t.grid_x == -37));
        assert!(tiles[5..10].iter().all(|t| t.grid_x == -35));
        assert!(tiles[10..].iter().all(|t| t.grid_x == -33));
        assert!(tiles.iter().all(|t| t.size_x == 2.0 && t.size_y == 2.0));
    }

    #[test]
    fn test_three_images_four_segments() {
        let tiles = build_tiles(&pool(&["a", "b", "c"]), 4);
        assert_eq!(tiles.len(), 20);
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for t in &tiles {
            *counts.entry(t.image.src.as_str()).or_default() += 1;
        }
        assert_eq!(counts.len(), 3);
        assert!(counts.values().all(|&c| c >= 6), "counts: {counts:?}");
        assert_no_adjacent_repeats(&tiles);
    }

    #[test]
    fn test_duplicates_in_pool_are_separated() {
        let tiles = build_tiles(&pool(&["a", "a", "b", "c", "c", "c", "d"]), 6);
        assert_no_adjacent_repeats(&tiles);
    }

    #[test]
    fn test_stock_pool_has_no_adjacent_repeats() {
        let tiles = build_tiles(&default_images(), 35);
        assert_eq!(tiles.len(), 175);
        assert_no_adjacent_repeats(&tiles);
    }

    #[test]
    fn test_single_image_repeats_unavoidably() {
        let tiles = build_tiles(&pool(&["only"]), 2);
        assert!(tiles.iter().all(|t| t.image.src == "only"));
    }

    #[test]
    fn test_overflow_truncates() {
        let images: Vec<ImageRef> = (0..12).map(|i| ImageRef::from(format!("img{i}"))).collect();
        let tiles = build_tiles(&images, 2);
        assert_eq!(tiles.len(), 10);
        let srcs: Vec<&str> = tiles.iter().map(|t| t.image.src.as_str()).collect();
        assert!(!srcs.contains(&"img10"));
        assert!(!srcs.contains(&"img11"));
        assert_eq!(srcs[0], "img0");
        assert_eq!(srcs[9], "img9");
    }

    #[test]
    fn test_build_is_deterministic() {
        let images = pool(&["a", "b", "b", "c"]);
        assert_eq!(build_tiles(&images, 5), build_tiles(&images, 5));
    }

    #[derive(Deserialize)]
    struct Pool {
        #[serde(deserialize_with = "deserialize_image_pool")]
        images: Vec<ImageRef>,
    }

    #[test]
    fn test_image_entries_normalize() {
        let parsed: Pool = toml::from_str(
            r#"
            images = [
                "bare.png",
                { src = "full.png", alt = "Full" },
                { alt = "no source" },
                { src = 42, alt = "numeric src" },
                7,
            ]
            "#,
        )
        .expect("parse pool");
        assert_eq!(
            parsed.images,
            vec![
                ImageRef::new("bare.png", ""),
                ImageRef::new("full.png", "Full"),
                ImageRef::new("", "no source"),
                ImageRef::new("", "numeric src"),
                ImageRef::empty(),
            ]
        );
    }

    #[test]
    fn test_default_images_include_stock_duplicates() {
        let images = default_images();
        assert_eq!(images.len(), 32);
        assert_eq!(images.iter().filter(|i| i.src == "/Image/n23.png").count(), 3);
        assert_eq!(images[0], ImageRef::new("/Image/n1.png", "Image 1"));
    }
}
