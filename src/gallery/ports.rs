use std::collections::VecDeque;

use super::gesture::PointerEvent;

/// Reports the container size in logical pixels, or `None` when nothing has
/// been observed since the last poll.
pub trait SizeSource {
    fn size(&self) -> Option<(f64, f64)>;
}

/// Supplies pointer drag events in arrival order.
pub trait PointerSource {
    fn poll_event(&mut self) -> Option<PointerEvent>;
}

/// A fixed size, for hosts that never resize and for tests.
impl SizeSource for (f64, f64) {
    fn size(&self) -> Option<(f64, f64)> {
        Some(*self)
    }
}

impl SizeSource for Option<(f64, f64)> {
    fn size(&self) -> Option<(f64, f64)> {
        *self
    }
}

/// FIFO of pointer events collected between frames.
#[derive(Debug, Default)]
pub struct PointerQueue {
    events: VecDeque<PointerEvent>,
}

impl PointerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: PointerEvent) {
        self.events.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl PointerSource for PointerQueue {
    fn poll_event(&mut self) -> Option<PointerEvent> {
        self.events.pop_front()
    }
}
