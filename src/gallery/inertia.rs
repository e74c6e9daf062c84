use super::rotation::RotationState;

/// Bound on raw gesture-space velocity, per axis.
const MAX_RAW_VELOCITY: f64 = 1.4;
/// Gesture-space velocity to per-frame angular units.
const VELOCITY_SCALE: f64 = 80.0;
/// Angular units per degree applied each frame.
const STEP_DIVISOR: f64 = 200.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InertiaStep {
    Continue,
    Finished,
}

/// A friction-decaying continuation of a released drag.
///
/// Bounded both by a velocity threshold and by a hard frame budget, so every
/// run ends within `max_frames` ticks whatever the starting velocity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InertiaRun {
    pub velocity_spin: f64,
    pub velocity_tilt: f64,
    pub frame_count: u32,
    pub friction_factor: f64,
    pub stop_threshold: f64,
    pub max_frames: u32,
}

impl InertiaRun {
    /// `vx` drives spin, `vy` drives tilt; `dampening` is clamped to `[0, 1]`.
    pub fn new(vx: f64, vy: f64, dampening: f64) -> Self {
        let d = if dampening.is_nan() { 0.0 } else { dampening.clamp(0.0, 1.0) };
        let scale = |v: f64| {
            if v.is_nan() {
                0.0
            } else {
                v.clamp(-MAX_RAW_VELOCITY, MAX_RAW_VELOCITY) * VELOCITY_SCALE
            }
        };
        Self {
            velocity_spin: scale(vx),
            velocity_tilt: scale(vy),
            frame_count: 0,
            friction_factor: 0.94 + 0.055 * d,
            stop_threshold: 0.015 - 0.01 * d,
            max_frames: (90.0 + 270.0 * d).round() as u32,
        }
    }

    /// Advance one frame, writing the decayed rotation into `state`.
    pub fn step(&mut self, state: &mut RotationState) -> InertiaStep {
        self.velocity_spin *= self.friction_factor;
        self.velocity_tilt *= self.friction_factor;

        if self.velocity_spin.abs() < self.stop_threshold && self.velocity_tilt.abs() < self.stop_threshold {
            return InertiaStep::Finished;
        }
        self.frame_count += 1;
        if self.frame_count > self.max_frames {
            return InertiaStep::Finished;
        }

        let current = state.current();
        state.apply(
            current.tilt - self.velocity_tilt / STEP_DIVISOR,
            current.spin + self.velocity_spin / STEP_DIVISOR,
        );
        InertiaStep::Continue
    }
}
