//! Head pose classification.
//!
//! The primary method extracts Euler angles from the head rotation
//! matrix, conditions them through per-axis Kalman filters and a rolling
//! smoothing window, and measures deviation from the calibration
//! baseline. When no matrix is available, or the engine runs in
//! turn-only mode, a landmark-ratio fallback classifies from raw 2D
//! geometry instead.

use gazeguard_core::{FaceLandmarks, FrameSample, LandmarkIndex, PoseAngles};

use crate::calibrate::CalibrationBaseline;
use crate::config::{DetectionMode, PoseConfig};
use crate::domain::{ChannelId, PoseDirection};
use crate::signal::{RollingWindow, ScalarKalman};

/// Which method produced a pose reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoseMethod {
    /// Euler angles from the rotation matrix
    Matrix,
    /// Landmark-ratio fallback
    Ratio,
}

/// Result of classifying one frame's head pose.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseReading {
    /// Smoothed deviation from the baseline, degrees (matrix method only)
    pub deviation: Option<PoseAngles>,
    /// Directions whose deviation left the neutral range
    pub directions: Vec<PoseDirection>,
    /// Channels whose alert thresholds were crossed
    pub channels: Vec<ChannelId>,
    /// Method that produced this reading
    pub method: PoseMethod,
}

impl PoseReading {
    /// Returns `true` if any direction left the neutral range.
    #[must_use]
    pub fn is_deviant(&self) -> bool {
        !self.directions.is_empty()
    }
}

/// Stateful head pose classifier for one session.
#[derive(Debug)]
pub struct PoseClassifier {
    config: PoseConfig,
    mode: DetectionMode,
    window: RollingWindow,
    pitch_filter: ScalarKalman,
    yaw_filter: ScalarKalman,
    roll_filter: ScalarKalman,
}

impl PoseClassifier {
    /// Creates a classifier with the given thresholds and smoothing window.
    #[must_use]
    pub fn new(config: PoseConfig, mode: DetectionMode, smoothing_frames: usize) -> Self {
        let q = config.filter_process_noise;
        let r = config.filter_measurement_noise;
        Self {
            config,
            mode,
            window: RollingWindow::new(smoothing_frames),
            pitch_filter: ScalarKalman::new(q, r),
            yaw_filter: ScalarKalman::new(q, r),
            roll_filter: ScalarKalman::new(q, r),
        }
    }

    /// Filtered raw angles for the frame, used during calibration.
    ///
    /// Turn-only mode and frames without a rotation matrix contribute a
    /// neutral observation so calibration completes on schedule.
    pub fn raw_angles(&mut self, sample: &FrameSample) -> PoseAngles {
        match sample.rotation {
            Some(rotation) if self.mode == DetectionMode::Full => {
                let angles = rotation.to_euler_degrees();
                PoseAngles {
                    pitch: self.pitch_filter.update(angles.pitch),
                    yaw: self.yaw_filter.update(angles.yaw),
                    roll: self.roll_filter.update(angles.roll),
                }
            }
            _ => PoseAngles::default(),
        }
    }

    /// Classifies one monitored frame against the baseline.
    ///
    /// Returns `None` when neither method has the input it needs
    /// (no rotation matrix and missing fallback landmarks); the pose
    /// channels are simply skipped for that frame.
    pub fn classify(
        &mut self,
        sample: &FrameSample,
        baseline: &CalibrationBaseline,
    ) -> Option<PoseReading> {
        if self.mode == DetectionMode::Full {
            if let Some(rotation) = sample.rotation {
                let angles = rotation.to_euler_degrees();
                let filtered = PoseAngles {
                    pitch: self.pitch_filter.update(angles.pitch),
                    yaw: self.yaw_filter.update(angles.yaw),
                    roll: self.roll_filter.update(angles.roll),
                };
                self.window.push(filtered);
                let smoothed = self.window.mean()?;
                return Some(self.classify_angles(baseline.deviation(smoothed)));
            }
        }
        self.classify_by_ratio(sample)
    }

    fn classify_angles(&self, deviation: PoseAngles) -> PoseReading {
        let neutral = self.config.neutral_range_deg;
        let mut directions = Vec::new();
        let mut channels = Vec::new();

        if deviation.pitch.abs() > neutral {
            directions.push(if deviation.pitch > 0.0 {
                PoseDirection::Down
            } else {
                PoseDirection::Up
            });
        }
        if deviation.yaw.abs() > neutral {
            directions.push(if deviation.yaw > 0.0 {
                PoseDirection::Right
            } else {
                PoseDirection::Left
            });
        }
        if deviation.roll.abs() > neutral {
            directions.push(PoseDirection::Tilted);
        }

        if deviation.pitch > self.config.down_threshold_deg {
            channels.push(ChannelId::HeadDown);
        } else if deviation.pitch < -self.config.up_threshold_deg {
            channels.push(ChannelId::HeadUp);
        }
        if deviation.yaw > self.config.lateral_threshold_deg {
            channels.push(ChannelId::HeadRight);
        } else if deviation.yaw < -self.config.lateral_threshold_deg {
            channels.push(ChannelId::HeadLeft);
        }

        PoseReading {
            deviation: Some(deviation),
            directions,
            channels,
            method: PoseMethod::Matrix,
        }
    }

    /// Landmark-ratio fallback.
    ///
    /// Vertical: nose position within the forehead-chin span. Lateral:
    /// nose offset from the shoulder (or outer-eye) midpoint as a
    /// fraction of that reference width. The camera image is assumed
    /// non-mirrored, so the nose moves toward the camera's left when the
    /// subject turns right.
    fn classify_by_ratio(&self, sample: &FrameSample) -> Option<PoseReading> {
        let face = sample.primary_face()?;
        let nose = face.landmark(LandmarkIndex::NoseTip)?;

        let mut directions = Vec::new();
        let mut channels = Vec::new();

        if self.mode == DetectionMode::Full {
            if let Some(ratio) = vertical_ratio(face) {
                if ratio > self.config.down_ratio_threshold {
                    directions.push(PoseDirection::Down);
                    channels.push(ChannelId::HeadDown);
                } else if ratio < self.config.up_ratio_threshold {
                    directions.push(PoseDirection::Up);
                    channels.push(ChannelId::HeadUp);
                }
            }
        }

        if let Some((mid_x, width)) = lateral_reference(sample, face) {
            let offset = f64::from(nose.x - mid_x) / f64::from(width);
            if offset < -self.config.lateral_ratio_threshold {
                directions.push(PoseDirection::Right);
                channels.push(ChannelId::HeadRight);
            } else if offset > self.config.lateral_ratio_threshold {
                directions.push(PoseDirection::Left);
                channels.push(ChannelId::HeadLeft);
            }
        }

        Some(PoseReading {
            deviation: None,
            directions,
            channels,
            method: PoseMethod::Ratio,
        })
    }
}

// -----------------------------------------------------------------------------
// Ratio geometry helpers
// -----------------------------------------------------------------------------

fn vertical_ratio(face: &FaceLandmarks) -> Option<f64> {
    let forehead = face.landmark(LandmarkIndex::Forehead)?;
    let chin = face.landmark(LandmarkIndex::Chin)?;
    let nose = face.landmark(LandmarkIndex::NoseTip)?;

    let span = f64::from(chin.y - forehead.y);
    if span.abs() < 1e-6 {
        return None;
    }
    Some(f64::from(nose.y - forehead.y) / span)
}

/// Midpoint x and width of the lateral reference: shoulders when both
/// are present, outer eye corners otherwise.
fn lateral_reference(sample: &FrameSample, face: &FaceLandmarks) -> Option<(f32, f32)> {
    if let Some(body) = &sample.body {
        if let (Some((mid_x, _)), Some(width)) = (body.shoulder_midpoint(), body.shoulder_width())
        {
            if width > 1e-6 {
                return Some((mid_x, width));
            }
        }
    }

    let left = face.landmark(LandmarkIndex::LeftEyeOuter)?;
    let right = face.landmark(LandmarkIndex::RightEyeOuter)?;
    let width = left.distance_to(right);
    if width <= 1e-6 {
        return None;
    }
    let (mid_x, _) = left.midpoint(right);
    Some((mid_x, width))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gazeguard_core::{BodyPose, Confidence, Landmark, RotationMatrix};

    fn mark(x: f32, y: f32) -> Landmark {
        Landmark::new(x, y, Confidence::MAX)
    }

    fn yaw_rotation(degrees: f64) -> RotationMatrix {
        let (s, c) = degrees.to_radians().sin_cos();
        RotationMatrix::from_rows([[c, 0.0, s], [0.0, 1.0, 0.0], [-s, 0.0, c]])
    }

    fn pitch_rotation(degrees: f64) -> RotationMatrix {
        let (s, c) = degrees.to_radians().sin_cos();
        RotationMatrix::from_rows([[1.0, 0.0, 0.0], [0.0, c, -s], [0.0, s, c]])
    }

    fn neutral_baseline() -> CalibrationBaseline {
        let mut calibrator = crate::calibrate::Calibrator::new(1);
        calibrator.observe(PoseAngles::default()).unwrap()
    }

    fn classifier() -> PoseClassifier {
        PoseClassifier::new(PoseConfig::default(), DetectionMode::Full, 1)
    }

    fn face_with_nose(nose_x: f32, nose_y: f32) -> FaceLandmarks {
        let mut face = FaceLandmarks::new();
        face.set_landmark(LandmarkIndex::Forehead, mark(0.5, 0.2));
        face.set_landmark(LandmarkIndex::Chin, mark(0.5, 0.8));
        face.set_landmark(LandmarkIndex::NoseTip, mark(nose_x, nose_y));
        face
    }

    #[test]
    fn test_neutral_rotation_no_channels() {
        let mut classifier = classifier();
        let baseline = neutral_baseline();
        let sample =
            FrameSample::new(vec![FaceLandmarks::new()]).with_rotation(RotationMatrix::identity());

        // Let the Kalman filters settle on the constant signal
        let mut reading = None;
        for _ in 0..50 {
            reading = classifier.classify(&sample, &baseline);
        }
        let reading = reading.unwrap();
        assert_eq!(reading.method, PoseMethod::Matrix);
        assert!(!reading.is_deviant(), "neutral pose should stay in range");
        assert!(reading.channels.is_empty());
    }

    #[test]
    fn test_strong_yaw_maps_to_right_channel() {
        let mut classifier = classifier();
        let baseline = neutral_baseline();
        let sample =
            FrameSample::new(vec![FaceLandmarks::new()]).with_rotation(yaw_rotation(30.0));

        let mut reading = None;
        for _ in 0..200 {
            reading = classifier.classify(&sample, &baseline);
        }
        let reading = reading.unwrap();
        assert!(
            reading.directions.contains(&PoseDirection::Right),
            "30 degree yaw should classify right, got {:?}",
            reading.directions
        );
        assert!(reading.channels.contains(&ChannelId::HeadRight));
    }

    #[test]
    fn test_strong_pitch_maps_to_down_channel() {
        let mut classifier = classifier();
        let baseline = neutral_baseline();
        let sample =
            FrameSample::new(vec![FaceLandmarks::new()]).with_rotation(pitch_rotation(25.0));

        let mut reading = None;
        for _ in 0..200 {
            reading = classifier.classify(&sample, &baseline);
        }
        let reading = reading.unwrap();
        assert!(reading.channels.contains(&ChannelId::HeadDown));
        assert!(reading.deviation.is_some());
    }

    #[test]
    fn test_ratio_fallback_without_matrix() {
        let mut classifier = classifier();
        let baseline = neutral_baseline();

        // Nose shifted well past 15% of shoulder width
        let sample = FrameSample::new(vec![face_with_nose(0.62, 0.5)])
            .with_body(BodyPose::new(mark(0.3, 0.9), mark(0.7, 0.9)));

        let reading = classifier.classify(&sample, &baseline).unwrap();
        assert_eq!(reading.method, PoseMethod::Ratio);
        assert!(reading.deviation.is_none(), "ratio method carries no angle deviation");
        assert!(
            reading.channels.contains(&ChannelId::HeadLeft),
            "nose toward camera right should classify left, got {:?}",
            reading.channels
        );
    }

    #[test]
    fn test_ratio_vertical_down() {
        let mut classifier = classifier();
        let baseline = neutral_baseline();

        // Nose at 70% of the forehead-chin span
        let sample = FrameSample::new(vec![face_with_nose(0.5, 0.62)])
            .with_body(BodyPose::new(mark(0.3, 0.9), mark(0.7, 0.9)));

        let reading = classifier.classify(&sample, &baseline).unwrap();
        assert!(reading.channels.contains(&ChannelId::HeadDown));
    }

    #[test]
    fn test_turn_only_mode_skips_vertical() {
        let mut classifier = PoseClassifier::new(PoseConfig::default(), DetectionMode::TurnOnly, 1);
        let baseline = neutral_baseline();

        // Matrix present but turn-only mode forces the ratio path
        let sample = FrameSample::new(vec![face_with_nose(0.5, 0.62)])
            .with_rotation(pitch_rotation(25.0))
            .with_body(BodyPose::new(mark(0.3, 0.9), mark(0.7, 0.9)));

        let reading = classifier.classify(&sample, &baseline).unwrap();
        assert_eq!(reading.method, PoseMethod::Ratio);
        assert!(
            !reading.channels.contains(&ChannelId::HeadDown),
            "turn-only mode must not emit vertical channels"
        );
    }

    #[test]
    fn test_missing_landmarks_skip_frame() {
        let mut classifier = classifier();
        let baseline = neutral_baseline();

        // No rotation, no nose landmark
        let sample = FrameSample::new(vec![FaceLandmarks::new()]);
        assert!(classifier.classify(&sample, &baseline).is_none());
    }
}
