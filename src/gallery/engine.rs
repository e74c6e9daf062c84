use super::auto_rotate::AutoRotator;
use super::config::MotionConfig;
use super::gesture::{GestureController, GestureSession, PointerEvent};
use super::inertia::{InertiaRun, InertiaStep};
use super::rotation::{Rotation, RotationState};

/// Release velocities at or below this (per axis) skip inertia entirely.
const INERTIA_START_THRESHOLD: f64 = 0.005;

/// Who owns the rotation this tick. Replacing the variant is how a driver
/// is cancelled; there is never more than one scheduled.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Driver {
    Idle,
    Dragging(GestureSession),
    Inertia(InertiaRun),
}

/// Single owner of the gallery's rotation and of every driver that writes it.
pub struct RotationEngine {
    state: RotationState,
    driver: Driver,
    gesture: GestureController,
    auto: AutoRotator,
    dampening: f64,
    log_gestures: bool,
}

impl RotationEngine {
    pub fn new(motion: &MotionConfig) -> Self {
        let motion = motion.sanitized();
        Self {
            state: RotationState::new(motion.max_vertical_rotation_deg),
            driver: Driver::Idle,
            gesture: GestureController::new(motion.drag_sensitivity),
            auto: AutoRotator::new(motion.auto_rotate_speed),
            dampening: motion.drag_dampening,
            log_gestures: false,
        }
    }

    pub fn set_log_gestures(&mut self, enabled: bool) {
        self.log_gestures = enabled;
    }

    /// Retune without disturbing the current driver.
    pub fn set_motion(&mut self, motion: &MotionConfig) {
        let motion = motion.sanitized();
        self.state.set_max_tilt(motion.max_vertical_rotation_deg);
        self.gesture.drag_sensitivity = motion.drag_sensitivity;
        self.auto.speed = motion.auto_rotate_speed;
        self.dampening = motion.drag_dampening;
    }

    pub fn rotation(&self) -> Rotation {
        self.state.current()
    }

    pub fn driver(&self) -> &Driver {
        &self.driver
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.driver, Driver::Dragging(_))
    }

    pub fn is_inertia_active(&self) -> bool {
        matches!(self.driver, Driver::Inertia(_))
    }

    /// Whether the current drag has travelled far enough to suppress click handling.
    pub fn drag_moved(&self) -> bool {
        match &self.driver {
            Driver::Dragging(session) => session.moved,
            _ => false,
        }
    }

    /// Feed one pointer event. Returns whether the rotation changed.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> bool {
        match event {
            PointerEvent::Start { position } => {
                if self.log_gestures {
                    log::info!("drag start at ({:.1}, {:.1})", position.x, position.y);
                }
                if self.is_inertia_active() {
                    log::debug!("inertia cancelled by drag");
                }
                self.driver = Driver::Dragging(self.gesture.begin(self.state.current(), position));
                false
            }
            PointerEvent::Move { position } => {
                let Driver::Dragging(session) = &mut self.driver else {
                    return false;
                };
                self.gesture.drag(session, position, &mut self.state)
            }
            PointerEvent::End { position, release } => {
                let Driver::Dragging(session) = &mut self.driver else {
                    return false;
                };
                let changed = self.gesture.drag(session, position, &mut self.state);

                let v = self.gesture.release_velocity(&release);
                if v.x.abs() > INERTIA_START_THRESHOLD || v.y.abs() > INERTIA_START_THRESHOLD {
                    let run = InertiaRun::new(v.x, v.y, self.dampening);
                    if self.log_gestures {
                        log::info!("drag release, inertia v=({:.3}, {:.3}) budget {} frames", v.x, v.y, run.max_frames);
                    }
                    self.driver = Driver::Inertia(run);
                } else {
                    if self.log_gestures {
                        log::info!("drag release without inertia");
                    }
                    self.driver = Driver::Idle;
                }
                changed
            }
        }
    }

    /// One scheduler tick: exactly one driver gets to write the rotation.
    /// Returns whether the rotation changed.
    pub fn tick(&mut self) -> bool {
        match &mut self.driver {
            Driver::Dragging(_) => false,
            Driver::Inertia(run) => match run.step(&mut self.state) {
                InertiaStep::Continue => true,
                InertiaStep::Finished => {
                    log::debug!("inertia finished after {} frames", run.frame_count);
                    self.driver = Driver::Idle;
                    self.auto.advance(&mut self.state)
                }
            },
            Driver::Idle => self.auto.advance(&mut self.state),
        }
    }
}
