use super::rotation::RotationState;

/// Default idle spin, degrees per tick.
pub const DEFAULT_AUTO_ROTATE_SPEED: f64 = 0.08;

/// Idle spin applied whenever no other driver owns the rotation.
/// Has no terminal state; the engine simply stops calling it while suspended.
#[derive(Clone, Copy, Debug)]
pub struct AutoRotator {
    pub speed: f64,
}

impl Default for AutoRotator {
    fn default() -> Self {
        Self {
            speed: DEFAULT_AUTO_ROTATE_SPEED,
        }
    }
}

impl AutoRotator {
    pub fn new(speed: f64) -> Self {
        Self { speed }
    }

    pub fn advance(&self, state: &mut RotationState) -> bool {
        let current = state.current();
        state.apply(current.tilt, current.spin + self.speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_wraps_spin() {
        let mut state = RotationState::new(5.0);
        state.apply(2.0, 179.95);
        assert!(AutoRotator::default().advance(&mut state));
        let r = state.current();
        assert_eq!(r.tilt, 2.0);
        assert!((r.spin - (-179.97)).abs() < 1e-9);
    }

    #[test]
    fn test_zero_speed_is_a_no_op() {
        let mut state = RotationState::new(5.0);
        assert!(!AutoRotator::new(0.0).advance(&mut state));
    }
}
