//! Fixed-capacity rolling window over pose angle observations.

use std::collections::VecDeque;

use gazeguard_core::PoseAngles;

/// Rolling window that keeps the most recent `capacity` observations.
///
/// Shared by the pose smoothing pass and the calibrator's accumulation
/// phase. Pushing past capacity drops the oldest entry.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    entries: VecDeque<PoseAngles>,
    capacity: usize,
}

impl RollingWindow {
    /// Creates a window holding at most `capacity` observations.
    ///
    /// A capacity of zero is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Pushes an observation, evicting the oldest past capacity.
    pub fn push(&mut self, angles: PoseAngles) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(angles);
    }

    /// Component-wise mean of the window contents.
    ///
    /// Returns `None` while the window is empty.
    #[must_use]
    pub fn mean(&self) -> Option<PoseAngles> {
        let entries: Vec<PoseAngles> = self.entries.iter().copied().collect();
        PoseAngles::mean(&entries)
    }

    /// Number of observations currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the window holds no observations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` once the window reached capacity.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.entries.len() == self.capacity
    }

    /// Drops all observations.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
