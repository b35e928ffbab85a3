//! Sliding-window occupancy statistics per zone.

use std::collections::VecDeque;

/// Fixed-capacity FIFO of recent per-frame counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyWindow {
    counts: VecDeque<usize>,
    capacity: usize,
}

impl OccupancyWindow {
    /// A window holding at most `capacity` samples (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            counts: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a count, evicting the oldest one when full.
    pub fn push(&mut self, count: usize) {
        if self.counts.len() == self.capacity {
            self.counts.pop_front();
        }
        self.counts.push_back(count);
    }

    /// Mean of the window, truncated toward zero; 0 when empty.
    pub fn mean(&self) -> usize {
        if self.counts.is_empty() {
            return 0;
        }
        self.counts.iter().sum::<usize>() / self.counts.len()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Samples, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.counts.iter().copied()
    }
}

/// One occupancy window per zone, indexed by 1-based zone id.
#[derive(Debug, Clone)]
pub struct OccupancyAggregator {
    windows: Vec<OccupancyWindow>,
}

impl OccupancyAggregator {
    pub fn new(zone_count: usize, last_frames: usize) -> Self {
        Self {
            windows: (0..zone_count).map(|_| OccupancyWindow::new(last_frames)).collect(),
        }
    }

    /// Push this frame's count for a zone and return the smoothed mean.
    ///
    /// Unknown zone ids are ignored and report 0.
    pub fn record(&mut self, zone_id: usize, count: usize) -> usize {
        match self.window_mut(zone_id) {
            Some(window) => {
                window.push(count);
                window.mean()
            }
            None => 0,
        }
    }

    /// Current smoothed mean for a zone.
    pub fn mean(&self, zone_id: usize) -> usize {
        self.window(zone_id).map_or(0, OccupancyWindow::mean)
    }

    pub fn window(&self, zone_id: usize) -> Option<&OccupancyWindow> {
        zone_id.checked_sub(1).and_then(|i| self.windows.get(i))
    }

    fn window_mut(&mut self, zone_id: usize) -> Option<&mut OccupancyWindow> {
        zone_id.checked_sub(1).and_then(|i| self.windows.get_mut(i))
    }
}
