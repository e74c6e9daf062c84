use std::collections::VecDeque;

use glam::DVec2;

use super::rotation::{Rotation, RotationState};

/// Squared pointer travel (px²) beyond which a press counts as a drag rather than a tap.
pub const DRAG_THRESHOLD_SQ: f64 = 16.0;
/// Below this per-axis magnitude the reported release velocity is considered degenerate.
const DEGENERATE_VELOCITY: f64 = 0.001;
/// Movement-fallback scale: degrees of travel to gesture-space velocity.
const MOVEMENT_VELOCITY_SCALE: f64 = 0.02;
/// Movement-fallback velocity bound, per axis.
const MOVEMENT_VELOCITY_LIMIT: f64 = 1.2;

/// Kinematics reported alongside a pointer release. Every part is optional;
/// a host that knows nothing about velocity simply leaves them empty.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ReleaseKinematics {
    /// Per-axis speed magnitude (px/ms).
    pub velocity: Option<DVec2>,
    /// Per-axis direction sign (-1, 0 or 1).
    pub direction: Option<DVec2>,
    /// Cumulative pointer travel since the press (px).
    pub movement: Option<DVec2>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Start { position: DVec2 },
    Move { position: DVec2 },
    End { position: DVec2, release: ReleaseKinematics },
}

/// State captured for the lifetime of one drag.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureSession {
    pub start_rotation: Rotation,
    pub start_pointer: DVec2,
    pub moved: bool,
}

/// Maps pointer travel to rotation.
#[derive(Clone, Copy, Debug)]
pub struct GestureController {
    /// Pixels of pointer travel per degree of rotation.
    pub drag_sensitivity: f64,
}

impl GestureController {
    pub fn new(drag_sensitivity: f64) -> Self {
        Self { drag_sensitivity }
    }

    pub fn begin(&self, rotation: Rotation, pointer: DVec2) -> GestureSession {
        GestureSession {
            start_rotation: rotation,
            start_pointer: pointer,
            moved: false,
        }
    }

    /// Apply the rotation implied by the pointer's offset from the press point.
    /// Returns whether the rotation changed.
    pub fn drag(&self, session: &mut GestureSession, pointer: DVec2, state: &mut RotationState) -> bool {
        let delta = pointer - session.start_pointer;
        if !session.moved && delta.length_squared() > DRAG_THRESHOLD_SQ {
            session.moved = true;
        }
        let tilt = session.start_rotation.tilt - delta.y / self.drag_sensitivity;
        let spin = session.start_rotation.spin + delta.x / self.drag_sensitivity;
        state.apply(tilt, spin)
    }

    /// Gesture-space release velocity: x drives spin, y drives tilt.
    pub fn release_velocity(&self, release: &ReleaseKinematics) -> DVec2 {
        let mut v = match (release.velocity, release.direction) {
            (Some(magnitude), Some(direction)) => magnitude * direction,
            _ => DVec2::ZERO,
        };
        if v.x.abs() < DEGENERATE_VELOCITY && v.y.abs() < DEGENERATE_VELOCITY {
            if let Some(movement) = release.movement {
                v = (movement / self.drag_sensitivity * MOVEMENT_VELOCITY_SCALE)
                    .clamp(DVec2::splat(-MOVEMENT_VELOCITY_LIMIT), DVec2::splat(MOVEMENT_VELOCITY_LIMIT));
            }
        }
        v
    }
}

/// How long a sample stays relevant for the release velocity estimate.
const VELOCITY_WINDOW_MS: f64 = 100.0;
/// Samples kept per drag.
const VELOCITY_HISTORY_SIZE: usize = 8;

#[derive(Clone, Copy, Debug)]
struct PointerSample {
    time_ms: f64,
    position: DVec2,
}

/// Host-side helper that turns a stream of raw pointer positions into
/// [`ReleaseKinematics`]: recent speed in px/ms split into magnitude and
/// direction, plus the total travel since the press.
#[derive(Clone, Debug, Default)]
pub struct VelocityTracker {
    origin: Option<DVec2>,
    history: VecDeque<PointerSample>,
}

impl VelocityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, time_ms: f64, position: DVec2) {
        self.origin = Some(position);
        self.history.clear();
        self.history.push_back(PointerSample { time_ms, position });
    }

    pub fn record(&mut self, time_ms: f64, position: DVec2) {
        if self.origin.is_none() {
            return;
        }
        self.history.push_back(PointerSample { time_ms, position });
        while self.history.len() > VELOCITY_HISTORY_SIZE {
            self.history.pop_front();
        }
    }

    /// Finish the drag and report its kinematics. Resets the tracker.
    pub fn release(&mut self, time_ms: f64, position: DVec2) -> ReleaseKinematics {
        let Some(origin) = self.origin.take() else {
            return ReleaseKinematics::default();
        };
        self.history.push_back(PointerSample { time_ms, position });

        let recent = self
            .history
            .iter()
            .find(|s| time_ms - s.time_ms <= VELOCITY_WINDOW_MS)
            .copied();
        let (velocity, direction) = match recent {
            Some(first) if time_ms - first.time_ms > 0.0 => {
                let per_ms = (position - first.position) / (time_ms - first.time_ms);
                (per_ms.abs(), per_ms.signum_or_zero())
            }
            _ => (DVec2::ZERO, DVec2::ZERO),
        };
        self.history.clear();

        ReleaseKinematics {
            velocity: Some(velocity),
            direction: Some(direction),
            movement: Some(position - origin),
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.origin.is_some()
    }
}

trait SignumOrZero {
    fn signum_or_zero(self) -> Self;
}

impl SignumOrZero for DVec2 {
    fn signum_or_zero(self) -> Self {
        let s = |v: f64| if v == 0.0 { 0.0 } else { v.signum() };
        DVec2::new(s(self.x), s(self.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> GestureController {
        GestureController::new(20.0)
    }

    #[test]
    fn test_drag_maps_horizontal_travel_to_spin() {
        let ctl = controller();
        let mut state = RotationState::new(5.0);
        let mut session = ctl.begin(state.current(), DVec2::new(200.0, 100.0));
        assert!(ctl.drag(&mut session, DVec2::new(300.0, 100.0), &mut state));
        assert_eq!(state.current(), Rotation::new(0.0, 5.0));
    }

    #[test]
    fn test_drag_down_tilts_negative_and_clamps() {
        let ctl = controller();
        let mut state = RotationState::new(5.0);
        let mut session = ctl.begin(state.current(), DVec2::ZERO);
        ctl.drag(&mut session, DVec2::new(0.0, 40.0), &mut state);
        assert_eq!(state.current().tilt, -2.0);
        ctl.drag(&mut session, DVec2::new(0.0, 1000.0), &mut state);
        assert_eq!(state.current().tilt, -5.0);
    }

    #[test]
    fn test_drag_is_relative_to_start_rotation() {
        let ctl = controller();
        let mut state = RotationState::new(5.0);
        state.apply(1.0, 170.0);
        let mut session = ctl.begin(state.current(), DVec2::ZERO);
        ctl.drag(&mut session, DVec2::new(400.0, 0.0), &mut state);
        assert_eq!(state.current(), Rotation::new(1.0, -170.0));
    }

    #[test]
    fn test_unchanged_drag_reports_no_change() {
        let ctl = controller();
        let mut state = RotationState::new(5.0);
        let mut session = ctl.begin(state.current(), DVec2::ZERO);
        assert!(ctl.drag(&mut session, DVec2::new(10.0, 0.0), &mut state));
        assert!(!ctl.drag(&mut session, DVec2::new(10.0, 0.0), &mut state));
    }

    #[test]
    fn test_moved_threshold() {
        let ctl = controller();
        let mut state = RotationState::new(5.0);

        let mut short = ctl.begin(state.current(), DVec2::ZERO);
        ctl.drag(&mut short, DVec2::new(3.0, 0.0), &mut state);
        assert!(!short.moved);

        let mut exact = ctl.begin(state.current(), DVec2::ZERO);
        ctl.drag(&mut exact, DVec2::new(4.0, 0.0), &mut state);
        assert!(!exact.moved);

        let mut long = ctl.begin(state.current(), DVec2::ZERO);
        ctl.drag(&mut long, DVec2::new(3.0, 4.0), &mut state);
        ctl.drag(&mut long, DVec2::new(0.0, 0.0), &mut state);
        assert!(long.moved, "moved stays latched once set");
    }

    #[test]
    fn test_release_velocity_prefers_reported_velocity() {
        let ctl = controller();
        let v = ctl.release_velocity(&ReleaseKinematics {
            velocity: Some(DVec2::new(0.8, 0.3)),
            direction: Some(DVec2::new(-1.0, 1.0)),
            movement: Some(DVec2::new(500.0, 500.0)),
        });
        assert_eq!(v, DVec2::new(-0.8, 0.3));
    }

    #[test]
    fn test_release_velocity_falls_back_to_movement() {
        let ctl = controller();
        let v = ctl.release_velocity(&ReleaseKinematics {
            velocity: Some(DVec2::ZERO),
            direction: Some(DVec2::ZERO),
            movement: Some(DVec2::new(100.0, -5000.0)),
        });
        assert!((v.x - 0.1).abs() < 1e-12);
        assert_eq!(v.y, -1.2);
    }

    #[test]
    fn test_release_velocity_without_any_kinematics_is_zero() {
        assert_eq!(controller().release_velocity(&ReleaseKinematics::default()), DVec2::ZERO);
    }

    #[test]
    fn test_tracker_reports_recent_speed() {
        let mut tracker = VelocityTracker::new();
        tracker.press(0.0, DVec2::new(0.0, 0.0));
        tracker.record(500.0, DVec2::new(10.0, 0.0));
        tracker.record(600.0, DVec2::new(60.0, 0.0));
        let k = tracker.release(650.0, DVec2::new(110.0, -25.0));
        // Window starts at the t=600 sample: (50, -25) over 50 ms.
        assert_eq!(k.velocity, Some(DVec2::new(1.0, 0.5)));
        assert_eq!(k.direction, Some(DVec2::new(1.0, -1.0)));
        assert_eq!(k.movement, Some(DVec2::new(110.0, -25.0)));
        assert!(!tracker.is_tracking());
    }

    #[test]
    fn test_tracker_still_pointer_has_zero_velocity() {
        let mut tracker = VelocityTracker::new();
        tracker.press(0.0, DVec2::new(5.0, 5.0));
        let k = tracker.release(1000.0, DVec2::new(30.0, 5.0));
        assert_eq!(k.velocity, Some(DVec2::ZERO));
        assert_eq!(k.movement, Some(DVec2::new(25.0, 0.0)));
    }

    #[test]
    fn test_tracker_release_without_press() {
        let mut tracker = VelocityTracker::new();
        tracker.record(10.0, DVec2::ONE);
        assert_eq!(tracker.release(20.0, DVec2::ONE), ReleaseKinematics::default());
    }
}
