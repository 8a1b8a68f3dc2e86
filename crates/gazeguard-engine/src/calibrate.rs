//! Session calibration.
//!
//! The first `reference_frames` pose observations of a session are
//! averaged into an immutable [`CalibrationBaseline`]. Calibration
//! happens exactly once; all later deviations are measured against the
//! frozen baseline.

use gazeguard_core::PoseAngles;
use serde::{Deserialize, Serialize};

/// Immutable neutral-pose baseline, degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationBaseline {
    angles: PoseAngles,
}

impl CalibrationBaseline {
    /// Returns the baseline angles.
    #[must_use]
    pub fn angles(&self) -> PoseAngles {
        self.angles
    }

    /// Deviation of an observation from the baseline.
    #[must_use]
    pub fn deviation(&self, observed: PoseAngles) -> PoseAngles {
        observed.sub(&self.angles)
    }
}

/// Accumulates reference frames into a one-shot baseline.
#[derive(Debug)]
pub struct Calibrator {
    reference_frames: usize,
    observations: Vec<PoseAngles>,
    completed: bool,
}

impl Calibrator {
    /// Creates a calibrator that averages `reference_frames` observations.
    ///
    /// A frame count of zero is raised to one.
    #[must_use]
    pub fn new(reference_frames: usize) -> Self {
        let reference_frames = reference_frames.max(1);
        Self {
            reference_frames,
            observations: Vec::with_capacity(reference_frames),
            completed: false,
        }
    }

    /// Feeds one pose observation.
    ///
    /// Returns the baseline exactly once, on the observation that
    /// completes the reference window. All later observations are
    /// ignored.
    pub fn observe(&mut self, angles: PoseAngles) -> Option<CalibrationBaseline> {
        if self.completed {
            return None;
        }

        self.observations.push(angles);
        if self.observations.len() < self.reference_frames {
            return None;
        }

        let mean = PoseAngles::mean(&self.observations)?;
        self.completed = true;
        self.observations.clear();
        Some(CalibrationBaseline { angles: mean })
    }

    /// Returns `true` once the baseline has been produced.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed
    }

    /// Observations accumulated so far.
    #[must_use]
    pub fn observed_frames(&self) -> usize {
        self.observations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_after_exact_frame_count() {
        let mut calibrator = Calibrator::new(3);
        assert!(calibrator.observe(PoseAngles::new(1.0, 2.0, 0.0)).is_none());
        assert!(calibrator.observe(PoseAngles::new(3.0, 4.0, 0.0)).is_none());

        let baseline = calibrator
            .observe(PoseAngles::new(5.0, 6.0, 0.0))
            .expect("third observation should complete calibration");

        let angles = baseline.angles();
        assert!((angles.pitch - 3.0).abs() < 1e-9, "pitch should be mean 3.0, got {}", angles.pitch);
        assert!((angles.yaw - 4.0).abs() < 1e-9, "yaw should be mean 4.0, got {}", angles.yaw);
    }

    #[test]
    fn test_calibrates_exactly_once() {
        let mut calibrator = Calibrator::new(2);
        calibrator.observe(PoseAngles::new(10.0, 0.0, 0.0));
        assert!(calibrator.observe(PoseAngles::new(20.0, 0.0, 0.0)).is_some());
        assert!(calibrator.is_complete());

        // Further observations must never produce a second baseline
        for _ in 0..10 {
            assert!(calibrator.observe(PoseAngles::new(99.0, 99.0, 99.0)).is_none());
        }
    }

    #[test]
    fn test_history_cleared_after_completion() {
        let mut calibrator = Calibrator::new(2);
        calibrator.observe(PoseAngles::default());
        calibrator.observe(PoseAngles::default());
        assert_eq!(calibrator.observed_frames(), 0);
    }

    #[test]
    fn test_deviation_subtracts_baseline() {
        let mut calibrator = Calibrator::new(1);
        let baseline = calibrator.observe(PoseAngles::new(2.0, -3.0, 1.0)).unwrap();

        let deviation = baseline.deviation(PoseAngles::new(10.0, 17.0, 1.0));
        assert!((deviation.pitch - 8.0).abs() < 1e-9);
        assert!((deviation.yaw - 20.0).abs() < 1e-9);
        assert!(deviation.roll.abs() < 1e-9);
    }

    #[test]
    fn test_zero_frames_raised_to_one() {
        let mut calibrator = Calibrator::new(0);
        assert!(calibrator.observe(PoseAngles::new(4.0, 0.0, 0.0)).is_some());
    }
}
