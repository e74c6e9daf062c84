use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::auto_rotate::DEFAULT_AUTO_ROTATE_SPEED;
use super::tiles::{default_images, deserialize_image_pool, ImageRef};
use crate::layout::radius::RadiusConfig;
use crate::layout::style::StyleConfig;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GalleryConfig {
    /// Longitude columns; the dome has `segments * 5` tiles.
    pub segments: usize,
    /// Directory that relative and root-anchored image paths resolve against.
    #[serde(default)]
    pub image_root: Option<PathBuf>,
    #[serde(deserialize_with = "deserialize_image_pool")]
    pub images: Vec<ImageRef>,
    pub layout: RadiusConfig,
    pub motion: MotionConfig,
    pub style: StyleConfig,
    #[serde(default)]
    pub debug: DebugConfig,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MotionConfig {
    /// Tilt clamp bound, degrees.
    pub max_vertical_rotation_deg: f64,
    /// Pixels of drag per degree of rotation.
    pub drag_sensitivity: f64,
    /// Inertia shape in `[0, 1]`: higher glides longer.
    pub drag_dampening: f64,
    /// Idle spin, degrees per tick.
    #[serde(default = "default_auto_rotate_speed")]
    pub auto_rotate_speed: f64,
}

/// Lowest accepted drag sensitivity, matching the settings slider.
pub const MIN_DRAG_SENSITIVITY: f64 = 1.0;

fn default_auto_rotate_speed() -> f64 {
    DEFAULT_AUTO_ROTATE_SPEED
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DebugConfig {
    /// Log drag starts, releases and inertia hand-offs.
    pub log_gestures: bool,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            max_vertical_rotation_deg: 5.0,
            drag_sensitivity: 20.0,
            drag_dampening: 1.0,
            auto_rotate_speed: DEFAULT_AUTO_ROTATE_SPEED,
        }
    }
}

impl MotionConfig {
    /// Repair values a hand-edited file can carry. Non-finite fields take
    /// their defaults, the tilt bound is made non-negative, dampening is held
    /// in `[0, 1]` and sensitivity at `MIN_DRAG_SENSITIVITY` or above.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let finite_or = |value: f64, fallback: f64, name: &str| {
            if value.is_finite() {
                value
            } else {
                log::warn!("motion.{name} = {value} is not a finite number. Using {fallback}.");
                fallback
            }
        };

        let mut drag_sensitivity = finite_or(self.drag_sensitivity, defaults.drag_sensitivity, "drag_sensitivity");
        if drag_sensitivity < MIN_DRAG_SENSITIVITY {
            log::warn!("motion.drag_sensitivity = {drag_sensitivity} is too small. Using {MIN_DRAG_SENSITIVITY}.");
            drag_sensitivity = MIN_DRAG_SENSITIVITY;
        }

        Self {
            max_vertical_rotation_deg: finite_or(
                self.max_vertical_rotation_deg,
                defaults.max_vertical_rotation_deg,
                "max_vertical_rotation_deg",
            )
            .abs(),
            drag_sensitivity,
            drag_dampening: finite_or(self.drag_dampening, defaults.drag_dampening, "drag_dampening").clamp(0.0, 1.0),
            auto_rotate_speed: finite_or(self.auto_rotate_speed, defaults.auto_rotate_speed, "auto_rotate_speed"),
        }
    }
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            segments: 35,
            image_root: None,
            images: default_images(),
            layout: RadiusConfig::default(),
            motion: MotionConfig::default(),
            style: StyleConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

fn config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "domefit")
        .map(|dirs| dirs.config_dir().join("gallery.toml"))
}

impl GalleryConfig {
    pub fn load() -> Self {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Read the config at `path`, writing defaults there if it does not exist yet.
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Self>(&contents) {
                Ok(config) => config.sanitized(),
                Err(e) => {
                    log::warn!("Failed to parse config: {e}. Using defaults.");
                    Self::default()
                }
            },
            Err(_) => {
                let config = Self::default();
                config.save_to(path);
                config
            }
        }
    }

    pub fn save(&self) {
        let Some(path) = config_path() else {
            log::warn!("Could not determine config directory");
            return;
        };
        self.save_to(&path);
    }

    pub fn save_to(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                log::warn!("Failed to create config directory: {e}");
                return;
            }
        }

        match toml::to_string_pretty(self) {
            Ok(contents) => {
                if let Err(e) = std::fs::write(path, contents) {
                    log::warn!("Failed to write config: {e}");
                }
            }
            Err(e) => {
                log::warn!("Failed to serialize config: {e}");
            }
        }
    }

    /// The same config with out-of-range motion values repaired.
    pub fn sanitized(mut self) -> Self {
        self.motion = self.motion.sanitized();
        self
    }

    /// Filesystem location of an image `src`, if it names one.
    pub fn resolve_image_path(&self, src: &str) -> Option<PathBuf> {
        if src.is_empty() {
            return None;
        }
        match &self.image_root {
            Some(root) => Some(root.join(src.trim_start_matches('/'))),
            None => Some(PathBuf::from(src)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::radius::FitBasis;

    #[test]
    fn test_default_config() {
        let config = GalleryConfig::default();
        assert_eq!(config.segments, 35);
        assert_eq!(config.images.len(), 32);
        assert_eq!(config.motion.drag_sensitivity, 20.0);
        assert_eq!(config.motion.max_vertical_rotation_deg, 5.0);
        assert_eq!(config.layout.min_radius, 600.0);
        assert!(config.layout.max_radius.is_infinite());
        assert_eq!(config.style.overlay_blur_color, "#ffffff");
    }

    #[test]
    fn test_config_toml_roundtrip() {
        let config = GalleryConfig::default();
        let serialized = toml::to_string_pretty(&config).expect("serialize");
        let deserialized: GalleryConfig = toml::from_str(&serialized).expect("deserialize");
        assert_eq!(deserialized, config);
    }

    #[test]
    fn test_partial_file_uses_field_defaults() {
        let parsed: GalleryConfig = toml::from_str(
            r##"
            segments = 4
            images = ["a.png", { src = "b.png", alt = "B" }]

            [layout]
            fit = 0.6
            fit_basis = "height"
            min_radius = 300.0
            max_radius = inf
            pad_factor = 0.1

            [motion]
            max_vertical_rotation_deg = 10.0
            drag_sensitivity = 15.0
            drag_dampening = 0.4

            [style]
            overlay_blur_color = "#101010"
            image_border_radius = 8.0
            grayscale = true
            "##,
        )
        .expect("parse");
        assert_eq!(parsed.images[1], ImageRef::new("b.png", "B"));
        assert_eq!(parsed.layout.fit_basis, FitBasis::Height);
        assert_eq!(parsed.motion.auto_rotate_speed, DEFAULT_AUTO_ROTATE_SPEED);
        assert!(!parsed.debug.log_gestures);
        assert_eq!(parsed.image_root, None);
    }

    #[test]
    fn test_load_from_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("gallery.toml");
        let config = GalleryConfig::load_from(&path);
        assert_eq!(config, GalleryConfig::default());
        assert!(path.exists());
        assert_eq!(GalleryConfig::load_from(&path), config);
    }

    #[test]
    fn test_load_from_garbage_falls_back() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("gallery.toml");
        std::fs::write(&path, "segments = \"many\"").expect("write");
        assert_eq!(GalleryConfig::load_from(&path), GalleryConfig::default());
    }

    #[test]
    fn test_save_then_load_preserves_edits() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("gallery.toml");
        let mut config = GalleryConfig::default();
        config.segments = 12;
        config.motion.drag_dampening = 0.25;
        config.style.grayscale = true;
        config.save_to(&path);
        assert_eq!(GalleryConfig::load_from(&path), config);
    }

    #[test]
    fn test_resolve_image_path() {
        let mut config = GalleryConfig::default();
        assert_eq!(config.resolve_image_path(""), None);
        assert_eq!(config.resolve_image_path("x/a.png"), Some(PathBuf::from("x/a.png")));
        config.image_root = Some(PathBuf::from("/srv/site"));
        assert_eq!(
            config.resolve_image_path("/Image/n1.png"),
            Some(PathBuf::from("/srv/site/Image/n1.png"))
        );
    }

    #[test]
    fn test_load_from_repairs_motion_values() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("gallery.toml");
        let mut text = toml::to_string_pretty(&GalleryConfig::default()).expect("serialize");
        text = text
            .replace("drag_sensitivity = 20.0", "drag_sensitivity = 0.0")
            .replace("max_vertical_rotation_deg = 5.0", "max_vertical_rotation_deg = nan")
            .replace("drag_dampening = 1.0", "drag_dampening = 3.0");
        std::fs::write(&path, text).expect("write");

        let motion = GalleryConfig::load_from(&path).motion;
        assert_eq!(motion.drag_sensitivity, MIN_DRAG_SENSITIVITY);
        assert_eq!(motion.max_vertical_rotation_deg, 5.0);
        assert_eq!(motion.drag_dampening, 1.0);
    }

    #[test]
    fn test_sanitized_keeps_valid_values() {
        let motion = MotionConfig {
            max_vertical_rotation_deg: -12.0,
            drag_sensitivity: -4.0,
            drag_dampening: 0.3,
            auto_rotate_speed: -0.2,
        }
        .sanitized();
        assert_eq!(motion.max_vertical_rotation_deg, 12.0);
        assert_eq!(motion.drag_sensitivity, MIN_DRAG_SENSITIVITY);
        assert_eq!(motion.drag_dampening, 0.3);
        assert_eq!(motion.auto_rotate_speed, -0.2);
        assert_eq!(MotionConfig::default().sanitized(), MotionConfig::default());
    }
}
