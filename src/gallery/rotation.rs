/// Clamp a tilt angle (degrees) into `[-max_tilt, max_tilt]`.
pub fn clamp_tilt(v: f64, max_tilt: f64) -> f64 {
    v.max(-max_tilt).min(max_tilt)
}

/// Wrap a spin angle (degrees) into the half-open interval `[-180, 180)`.
pub fn wrap_spin(v: f64) -> f64 {
    let a = v.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs.
    let a = if a >= 360.0 { 0.0 } else { a };
    if a >= 180.0 {
        a - 360.0
    } else {
        a
    }
}

/// Look angles of the dome, in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rotation {
    /// Rotation about the horizontal axis.
    pub tilt: f64,
    /// Rotation about the vertical axis.
    pub spin: f64,
}

impl Rotation {
    pub const ZERO: Rotation = Rotation { tilt: 0.0, spin: 0.0 };

    pub fn new(tilt: f64, spin: f64) -> Self {
        Self { tilt, spin }
    }
}

/// The gallery's current rotation. `apply` is the only way to change it, so
/// readers always see a clamped tilt and a wrapped spin.
#[derive(Clone, Debug)]
pub struct RotationState {
    current: Rotation,
    max_tilt: f64,
}

impl RotationState {
    /// A non-finite `max_tilt` is treated as zero.
    pub fn new(max_tilt: f64) -> Self {
        Self {
            current: Rotation::ZERO,
            max_tilt: if max_tilt.is_finite() { max_tilt.abs() } else { 0.0 },
        }
    }

    pub fn current(&self) -> Rotation {
        self.current
    }

    pub fn max_tilt(&self) -> f64 {
        self.max_tilt
    }

    /// Store a new rotation, returning whether the stored value changed.
    /// Non-finite input is rejected and the previous rotation kept.
    pub fn apply(&mut self, tilt: f64, spin: f64) -> bool {
        if !tilt.is_finite() || !spin.is_finite() {
            log::warn!("ignoring non-finite rotation ({tilt}, {spin})");
            return false;
        }
        let next = Rotation {
            tilt: clamp_tilt(tilt, self.max_tilt),
            spin: wrap_spin(spin),
        };
        if next == self.current {
            return false;
        }
        self.current = next;
        true
    }

    pub fn set_max_tilt(&mut self, max_tilt: f64) {
        if !max_tilt.is_finite() {
            return;
        }
        self.max_tilt = max_tilt.abs();
        let Rotation { tilt, spin } = self.current;
        self.apply(tilt, spin);
    }
}
