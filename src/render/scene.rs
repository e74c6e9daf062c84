//! Pure projection math for the dome: where the sphere sits, how each tile
//! is placed on it, and the camera looking at it. Nothing here touches the GPU.
//!
//! World space is Y-up, right-handed, in logical pixels. The `z = 0` plane is
//! the screen plane: the camera is placed so one unit there is one pixel.

use glam::{Mat4, Vec3};

use crate::gallery::rotation::Rotation;
use crate::gallery::tiles::Tile;

/// Gap between a tile's slot edge and its image, per side, in pixels.
pub const TILE_INSET_PX: f64 = 10.0;
/// Camera distance from the screen plane, in radii.
const PERSPECTIVE_RADII: f64 = 2.0;

/// The sphere's transform for one frame: push it back by its radius, then
/// tilt about the horizontal axis and spin about the vertical one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneTransform {
    pub translate_z: f64,
    pub tilt_deg: f64,
    pub spin_deg: f64,
}

pub fn project(rotation: Rotation, radius_px: f64) -> SceneTransform {
    SceneTransform {
        translate_z: -radius_px,
        tilt_deg: rotation.tilt,
        spin_deg: rotation.spin,
    }
}

impl SceneTransform {
    /// Positive tilt raises the front of the dome; positive spin carries it to the right.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_translation(Vec3::new(0.0, 0.0, self.translate_z as f32))
            * Mat4::from_rotation_x(-(self.tilt_deg as f32).to_radians())
            * Mat4::from_rotation_y((self.spin_deg as f32).to_radians())
    }

    /// The equivalent CSS transform, for hosts that render with a style engine.
    pub fn css(&self) -> String {
        format!(
            "translateZ({}px) rotateX({}deg) rotateY({}deg)",
            self.translate_z, self.tilt_deg, self.spin_deg
        )
    }
}

/// Angular size of one grid unit, in degrees.
pub fn grid_unit_deg(segments: usize) -> f64 {
    180.0 / segments.max(1) as f64
}

/// Where a tile sits on the sphere and how large its image is.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TilePlacement {
    pub yaw_deg: f64,
    pub pitch_deg: f64,
    pub width_px: f64,
    pub height_px: f64,
}

pub fn place_tile(tile: &Tile, segments: usize, radius_px: f64) -> TilePlacement {
    let unit = grid_unit_deg(segments);
    let slot = std::f64::consts::PI * radius_px / segments.max(1) as f64;
    TilePlacement {
        yaw_deg: unit * (tile.grid_x as f64 + (tile.size_x - 1.0) / 2.0),
        pitch_deg: unit * (tile.grid_y as f64 - (tile.size_y - 1.0) / 2.0),
        width_px: (slot * tile.size_x - 2.0 * TILE_INSET_PX).max(0.0),
        height_px: (slot * tile.size_y - 2.0 * TILE_INSET_PX).max(0.0),
    }
}

impl TilePlacement {
    /// Maps the unit quad (`[-0.5, 0.5]²` facing +Z) onto the sphere, in sphere-local space.
    pub fn model_matrix(&self, radius_px: f64) -> Mat4 {
        Mat4::from_rotation_y((self.yaw_deg as f32).to_radians())
            * Mat4::from_rotation_x(-(self.pitch_deg as f32).to_radians())
            * Mat4::from_translation(Vec3::new(0.0, 0.0, radius_px as f32))
            * Mat4::from_scale(Vec3::new(self.width_px as f32, self.height_px as f32, 1.0))
    }
}

/// Perspective camera looking at the screen plane from `2 * radius` away.
pub fn view_projection(width_px: f64, height_px: f64, radius_px: f64) -> Mat4 {
    let w = width_px.max(1.0);
    let h = height_px.max(1.0);
    let distance = (radius_px.max(1.0) * PERSPECTIVE_RADII) as f32;
    let fov_y = 2.0 * ((h as f32 / 2.0) / distance).atan();
    let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, distance), Vec3::ZERO, Vec3::Y);
    let far = distance + 3.0 * radius_px.max(1.0) as f32;
    let proj = Mat4::perspective_rh(fov_y, (w / h) as f32, 1.0, far);
    proj * view
}

/// Project a world position to screen pixels (origin top-left). `None` when behind the camera.
pub fn project_to_screen(world_pos: Vec3, view_proj: &Mat4, width: f32, height: f32) -> Option<(f32, f32)> {
    let clip = *view_proj * world_pos.extend(1.0);
    if clip.w <= 0.0 {
        return None;
    }
    let screen_x = (clip.x / clip.w + 1.0) * 0.5 * width;
    let screen_y = (1.0 - clip.y / clip.w) * 0.5 * height;
    Some((screen_x, screen_y))
}
