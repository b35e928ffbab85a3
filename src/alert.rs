//! Overload decision per zone.

use std::time::Duration;

/// True when the smoothed occupancy is strictly above the limit.
#[inline]
pub fn is_overloaded(mean: usize, object_limit: usize) -> bool {
    mean > object_limit
}

/// Whether a flashing alert is drawn at `elapsed` wall-clock time.
///
/// Visible during the second half of every two-second period. Presentation
/// only; the decision itself is [`is_overloaded`].
pub fn flash_visible(elapsed: Duration) -> bool {
    elapsed.as_secs_f64() % 2.0 > 1.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertEvaluator {
    pub object_limit: usize,
}

impl AlertEvaluator {
    pub fn new(object_limit: usize) -> Self {
        Self { object_limit }
    }

    pub fn evaluate(&self, mean: usize) -> bool {
        is_overloaded(mean, self.object_limit)
    }
}
