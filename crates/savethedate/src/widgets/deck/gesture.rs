/// Direction of a requested slide change; positive deltas mean "next".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

impl Direction {
    pub fn of(delta: f32) -> Self {
        if delta > 0.0 {
            Self::Next
        } else {
            Self::Previous
        }
    }
}

/// Normalises wheel and touch input into a vertical delta, held until the
/// next animation frame. Later requests in the same frame replace earlier
/// ones.
#[derive(Debug, Default)]
pub struct GestureTracker {
    touch_start_y: Option<f32>,
    pending: Option<f32>,
}

impl GestureTracker {
    pub fn wheel(&mut self, delta_y: f32) {
        self.pending = Some(delta_y);
    }

    pub fn touch_start(&mut self, y: f32) {
        self.touch_start_y = Some(y);
    }

    /// A finger moving up yields a positive delta, like scrolling down.
    pub fn touch_move(&mut self, y: f32) -> Option<f32> {
        let delta = self.touch_start_y? - y;
        self.pending = Some(delta);
        Some(delta)
    }

    pub fn take_pending(&mut self) -> Option<f32> {
        self.pending.take()
    }

    pub fn clear(&mut self) {
        self.touch_start_y = None;
        self.pending = None;
    }
}
