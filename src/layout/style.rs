use serde::{Deserialize, Serialize};

/// Pass-through visual knobs. None of these affect rotation or layout math.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StyleConfig {
    /// Overlay tint as `#rrggbb` or `#rgb`.
    pub overlay_blur_color: String,
    /// Tile corner radius in logical pixels.
    pub image_border_radius: f32,
    pub grayscale: bool,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            overlay_blur_color: "#ffffff".to_string(),
            image_border_radius: 30.0,
            grayscale: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageFilter {
    None,
    Grayscale,
}

/// Everything the rendering layer needs besides the rotation itself.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutStyle {
    pub radius_px: f64,
    pub padding_px: f64,
    /// sRGB channels scaled to `[0, 1]`.
    pub overlay_color: [f32; 3],
    pub tile_radius_px: f32,
    pub image_filter: ImageFilter,
}

const WHITE: [f32; 3] = [1.0, 1.0, 1.0];

/// Parse `#rrggbb` / `#rgb` into unit RGB. Anything else falls back to white.
pub fn parse_color(s: &str) -> [f32; 3] {
    match parse_hex(s.trim()) {
        Some(rgb) => rgb.map(|c| c as f32 / 255.0),
        None => {
            log::warn!("Invalid overlay color {s:?}, using white");
            WHITE
        }
    }
}

fn parse_hex(s: &str) -> Option<[u8; 3]> {
    let hex = s.strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        6 => {
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            Some([channel(0)?, channel(2)?, channel(4)?])
        }
        3 => {
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
            Some([channel(0)?, channel(1)?, channel(2)?])
        }
        _ => None,
    }
}

impl StyleConfig {
    pub fn image_filter(&self) -> ImageFilter {
        if self.grayscale {
            ImageFilter::Grayscale
        } else {
            ImageFilter::None
        }
    }
}
