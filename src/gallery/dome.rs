use super::config::GalleryConfig;
use super::engine::RotationEngine;
use super::ports::{PointerSource, SizeSource};
use super::rotation::Rotation;
use super::tiles::{build_tiles, ImageRef, Tile};
use crate::layout::radius::{RadiusConfig, RadiusResolver};
use crate::layout::style::{LayoutStyle, StyleConfig};
use crate::render::scene::{project, SceneTransform};

/// What the host needs to draw one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameOutput {
    pub transform: SceneTransform,
    pub style: LayoutStyle,
    /// The layout changed during this frame.
    pub layout_changed: bool,
    /// The rotation changed during this frame.
    pub rotation_changed: bool,
}

/// One dome gallery instance: its tiles, its layout resolver and its rotation engine.
/// Nothing is shared between instances.
pub struct Gallery {
    tiles: Vec<Tile>,
    pool: Vec<ImageRef>,
    segments: usize,
    layout: RadiusConfig,
    style: StyleConfig,
    resolver: RadiusResolver,
    engine: RotationEngine,
    last_size: Option<(f64, f64)>,
}

impl Gallery {
    pub fn new(config: &GalleryConfig) -> Self {
        let mut engine = RotationEngine::new(&config.motion);
        engine.set_log_gestures(config.debug.log_gestures);
        Self {
            tiles: build_tiles(&config.images, config.segments),
            pool: config.images.clone(),
            segments: config.segments,
            layout: config.layout,
            style: config.style.clone(),
            resolver: RadiusResolver::new(config.layout, config.style.clone()),
            engine,
            last_size: None,
        }
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn segments(&self) -> usize {
        self.segments
    }

    pub fn rotation(&self) -> Rotation {
        self.engine.rotation()
    }

    pub fn engine(&self) -> &RotationEngine {
        &self.engine
    }

    pub fn style(&self) -> LayoutStyle {
        self.resolver.current()
    }

    pub fn transform(&self) -> SceneTransform {
        project(self.engine.rotation(), self.resolver.current().radius_px)
    }

    /// Run one host frame: observe the container, drain pointer input, then
    /// run `ticks` scheduler ticks.
    pub fn frame(&mut self, size: &impl SizeSource, pointer: &mut impl PointerSource, ticks: u32) -> FrameOutput {
        let mut layout_changed = false;
        if let Some((w, h)) = size.size() {
            self.last_size = Some((w, h));
            layout_changed = self.resolver.observe(w, h).is_some();
        }

        let mut rotation_changed = false;
        while let Some(event) = pointer.poll_event() {
            rotation_changed |= self.engine.handle_pointer(event);
        }
        for _ in 0..ticks {
            rotation_changed |= self.engine.tick();
        }

        FrameOutput {
            transform: self.transform(),
            style: self.resolver.current(),
            layout_changed,
            rotation_changed,
        }
    }

    /// Apply an edited configuration. Tiles are rebuilt only when the pool or
    /// segment count changed; motion and layout changes take effect live.
    /// Returns whether the tiles were rebuilt.
    pub fn reconfigure(&mut self, config: &GalleryConfig) -> bool {
        self.engine.set_motion(&config.motion);
        self.engine.set_log_gestures(config.debug.log_gestures);

        if config.layout != self.layout || config.style != self.style {
            self.layout = config.layout;
            self.style = config.style.clone();
            self.resolver.reconfigure(config.layout, config.style.clone());
            if let Some((w, h)) = self.last_size {
                self.resolver.observe(w, h);
            }
        }

        if config.images == self.pool && config.segments == self.segments {
            return false;
        }
        self.pool = config.images.clone();
        self.segments = config.segments;
        self.tiles = build_tiles(&self.pool, self.segments);
        log::debug!("rebuilt {} tiles from {} images", self.tiles.len(), self.pool.len());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gallery::gesture::{PointerEvent, ReleaseKinematics};
    use crate::gallery::ports::PointerQueue;
    use glam::DVec2;

    fn config() -> GalleryConfig {
        let mut config = GalleryConfig {
            images: vec![ImageRef::from("a"), ImageRef::from("b"), ImageRef::from("c")],
            segments: 4,
            ..GalleryConfig::default()
        };
        config.motion.auto_rotate_speed = 0.0;
        config
    }

    #[test]
    fn test_new_builds_tiles() {
        let gallery = Gallery::new(&config());
        assert_eq!(gallery.tiles().len(), 20);
        assert_eq!(gallery.transform().translate_z, -600.0);
    }

    #[test]
    fn test_frame_observes_size_and_drag() {
        let mut gallery = Gallery::new(&config());
        let mut pointer = PointerQueue::new();
        pointer.push(PointerEvent::Start { position: DVec2::ZERO });
        pointer.push(PointerEvent::Move { position: DVec2::new(100.0, 0.0) });

        let out = gallery.frame(&(2000.0, 1000.0), &mut pointer, 1);
        assert!(out.layout_changed);
        assert!(out.rotation_changed);
        assert_eq!(out.style.radius_px, 1000.0);
        assert_eq!(out.transform, SceneTransform { translate_z: -1000.0, tilt_deg: 0.0, spin_deg: 5.0 });
        assert!(pointer.is_empty());
    }

    #[test]
    fn test_missing_size_keeps_previous_layout() {
        let mut gallery = Gallery::new(&config());
        let mut pointer = PointerQueue::new();
        gallery.frame(&(2000.0, 1000.0), &mut pointer, 0);
        let out = gallery.frame(&None::<(f64, f64)>, &mut pointer, 0);
        assert!(!out.layout_changed);
        assert_eq!(out.style.radius_px, 1000.0);
    }

    #[test]
    fn test_inertia_runs_across_frames() {
        let mut gallery = Gallery::new(&config());
        let mut pointer = PointerQueue::new();
        pointer.push(PointerEvent::Start { position: DVec2::ZERO });
        pointer.push(PointerEvent::End {
            position: DVec2::ZERO,
            release: ReleaseKinematics {
                velocity: Some(DVec2::new(1.0, 0.0)),
                direction: Some(DVec2::new(1.0, 0.0)),
                movement: None,
            },
        });
        gallery.frame(&(800.0, 600.0), &mut pointer, 0);
        assert!(gallery.engine().is_inertia_active());
        let out = gallery.frame(&None::<(f64, f64)>, &mut pointer, 3);
        assert!(out.rotation_changed);
        assert!(out.transform.spin_deg > 0.0);
    }

    #[test]
    fn test_reconfigure_rebuilds_only_on_pool_change() {
        let mut gallery = Gallery::new(&config());
        let mut edited = config();
        edited.motion.drag_sensitivity = 40.0;
        assert!(!gallery.reconfigure(&edited));

        edited.segments = 6;
        assert!(gallery.reconfigure(&edited));
        assert_eq!(gallery.tiles().len(), 30);
    }

    #[test]
    fn test_reconfigure_republishes_layout() {
        let mut gallery = Gallery::new(&config());
        let mut pointer = PointerQueue::new();
        gallery.frame(&(2000.0, 1000.0), &mut pointer, 0);
        let mut edited = config();
        edited.layout.max_radius = 700.0;
        edited.style.grayscale = true;
        gallery.reconfigure(&edited);
        assert_eq!(gallery.style().radius_px, 700.0);
        assert_eq!(gallery.style().image_filter, crate::layout::style::ImageFilter::Grayscale);
    }
}
