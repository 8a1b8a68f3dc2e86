//! Gaze direction classification and dwell tracking.
//!
//! Gaze is the iris center's offset from the midpoint of the eye
//! corners, normalized by eye width and averaged over the eyes that are
//! fully visible. The dominant axis gives the direction; the offset
//! magnitude maps linearly to a percentage confidence.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use gazeguard_core::{FaceLandmarks, LandmarkIndex};

use crate::config::GazeConfig;
use crate::domain::GazeDirection;
use gazeguard_core::utils::scale_to_percent;

/// Result of classifying one frame's gaze.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GazeReading {
    /// Dominant gaze direction
    pub direction: GazeDirection,
    /// Confidence in [0, 100]
    pub confidence: f64,
    /// Whether the gaze counts as centered
    pub is_centered: bool,
    /// Seconds the current direction has been held
    pub focus_secs: f64,
}

impl GazeReading {
    /// Neutral reading used when iris landmarks are missing.
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            direction: GazeDirection::Center,
            confidence: 0.0,
            is_centered: true,
            focus_secs: 0.0,
        }
    }
}

/// Stateful gaze classifier for one session.
///
/// Tracks how long each direction has been held and keeps the maximum
/// dwell per direction across the session.
#[derive(Debug)]
pub struct GazeClassifier {
    config: GazeConfig,
    current_direction: GazeDirection,
    direction_since: Option<DateTime<Utc>>,
    max_focus: HashMap<GazeDirection, f64>,
}

impl GazeClassifier {
    /// Creates a classifier with the given tuning.
    #[must_use]
    pub fn new(config: GazeConfig) -> Self {
        Self {
            config,
            current_direction: GazeDirection::Center,
            direction_since: None,
            max_focus: HashMap::new(),
        }
    }

    /// Classifies one frame captured at `at`.
    ///
    /// Frames without a usable eye produce [`GazeReading::unknown`]
    /// without disturbing the dwell tracker.
    pub fn classify(&mut self, face: &FaceLandmarks, at: DateTime<Utc>) -> GazeReading {
        let Some((dx, dy)) = average_iris_offset(face) else {
            return GazeReading::unknown();
        };

        let (magnitude, direction) = if dx.abs() >= dy.abs() {
            (
                dx.abs(),
                if dx >= 0.0 {
                    GazeDirection::Right
                } else {
                    GazeDirection::Left
                },
            )
        } else {
            (
                dy.abs(),
                if dy >= 0.0 {
                    GazeDirection::Down
                } else {
                    GazeDirection::Up
                },
            )
        };

        let confidence = scale_to_percent(magnitude, self.config.full_scale_offset_ratio);
        let is_centered = confidence < self.config.centered_below;
        let effective = if is_centered {
            GazeDirection::Center
        } else {
            direction
        };

        let focus_secs = self.track_dwell(effective, at);

        GazeReading {
            direction: effective,
            confidence,
            is_centered,
            focus_secs,
        }
    }

    /// Returns `true` if a reading satisfies the gaze alert condition.
    ///
    /// Channel enablement and cooldown are decided by the threshold
    /// engine, not here.
    #[must_use]
    pub fn alert_condition(&self, reading: &GazeReading) -> bool {
        reading.confidence > self.config.alert_above && !reading.is_centered
    }

    /// Longest recorded dwell for a direction, in seconds.
    #[must_use]
    pub fn max_focus_secs(&self, direction: GazeDirection) -> f64 {
        self.max_focus.get(&direction).copied().unwrap_or(0.0)
    }

    /// On a direction change, banks the previous dwell into the
    /// per-direction maximum table; returns the dwell of the current
    /// direction.
    fn track_dwell(&mut self, direction: GazeDirection, at: DateTime<Utc>) -> f64 {
        if direction != self.current_direction {
            if let Some(since) = self.direction_since {
                let held = seconds_between(since, at);
                let entry = self.max_focus.entry(self.current_direction).or_insert(0.0);
                if held > *entry {
                    *entry = held;
                }
            }
            self.current_direction = direction;
            self.direction_since = Some(at);
            return 0.0;
        }

        match self.direction_since {
            Some(since) => seconds_between(since, at),
            None => {
                self.direction_since = Some(at);
                0.0
            }
        }
    }
}

fn seconds_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    let millis = later.signed_duration_since(earlier).num_milliseconds();
    (millis.max(0) as f64) / 1000.0
}

/// Iris offset from the eye-corner midpoint, normalized by eye width and
/// averaged over visible eyes. `None` when neither eye is complete.
fn average_iris_offset(face: &FaceLandmarks) -> Option<(f64, f64)> {
    let left = eye_offset(
        face,
        LandmarkIndex::LeftEyeOuter,
        LandmarkIndex::LeftEyeInner,
        LandmarkIndex::LeftIris,
    );
    let right = eye_offset(
        face,
        LandmarkIndex::RightEyeInner,
        LandmarkIndex::RightEyeOuter,
        LandmarkIndex::RightIris,
    );

    match (left, right) {
        (Some((lx, ly)), Some((rx, ry))) => Some(((lx + rx) / 2.0, (ly + ry) / 2.0)),
        (Some(offset), None) | (None, Some(offset)) => Some(offset),
        (None, None) => None,
    }
}

fn eye_offset(
    face: &FaceLandmarks,
    corner_a: LandmarkIndex,
    corner_b: LandmarkIndex,
    iris: LandmarkIndex,
) -> Option<(f64, f64)> {
    let a = face.landmark(corner_a)?;
    let b = face.landmark(corner_b)?;
    let iris = face.landmark(iris)?;

    let width = a.distance_to(b);
    if width <= 1e-6 {
        return None;
    }

    let (mid_x, mid_y) = a.midpoint(b);
    Some((
        f64::from(iris.x - mid_x) / f64::from(width),
        f64::from(iris.y - mid_y) / f64::from(width),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use gazeguard_core::{Confidence, Landmark};

    fn mark(x: f32, y: f32) -> Landmark {
        Landmark::new(x, y, Confidence::MAX)
    }

    /// Both eyes present, iris shifted by `shift` eye-widths from center.
    fn face_with_iris_shift(shift_x: f32, shift_y: f32) -> FaceLandmarks {
        let mut face = FaceLandmarks::new();
        // Left eye spans x in [0.30, 0.40], right eye [0.60, 0.70]
        face.set_landmark(LandmarkIndex::LeftEyeOuter, mark(0.30, 0.40));
        face.set_landmark(LandmarkIndex::LeftEyeInner, mark(0.40, 0.40));
        face.set_landmark(LandmarkIndex::RightEyeInner, mark(0.60, 0.40));
        face.set_landmark(LandmarkIndex::RightEyeOuter, mark(0.70, 0.40));
        let eye_width = 0.10;
        face.set_landmark(
            LandmarkIndex::LeftIris,
            mark(0.35 + shift_x * eye_width, 0.40 + shift_y * eye_width),
        );
        face.set_landmark(
            LandmarkIndex::RightIris,
            mark(0.65 + shift_x * eye_width, 0.40 + shift_y * eye_width),
        );
        face
    }

    #[test]
    fn test_centered_iris_is_centered() {
        let mut classifier = GazeClassifier::new(GazeConfig::default());
        let reading = classifier.classify(&face_with_iris_shift(0.0, 0.0), Utc::now());

        assert_eq!(reading.direction, GazeDirection::Center);
        assert!(reading.is_centered);
        assert!(reading.confidence < 1.0);
    }

    #[test]
    fn test_strong_left_shift() {
        let mut classifier = GazeClassifier::new(GazeConfig::default());
        // 0.3 eye-widths toward -x at full scale 0.35 -> ~86% confidence
        let reading = classifier.classify(&face_with_iris_shift(-0.30, 0.0), Utc::now());

        assert_eq!(reading.direction, GazeDirection::Left);
        assert!(!reading.is_centered);
        assert!(
            reading.confidence > 80.0,
            "confidence should be near 86, got {}",
            reading.confidence
        );
        assert!(classifier.alert_condition(&reading));
    }

    #[test]
    fn test_vertical_dominant_axis() {
        let mut classifier = GazeClassifier::new(GazeConfig::default());
        let reading = classifier.classify(&face_with_iris_shift(0.05, -0.30), Utc::now());
        assert_eq!(reading.direction, GazeDirection::Up, "larger |dy| should win");
    }

    #[test]
    fn test_confidence_saturates_at_100() {
        let mut classifier = GazeClassifier::new(GazeConfig::default());
        let reading = classifier.classify(&face_with_iris_shift(0.9, 0.0), Utc::now());
        assert!((reading.confidence - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_iris_gives_unknown() {
        let mut classifier = GazeClassifier::new(GazeConfig::default());
        let mut face = face_with_iris_shift(0.0, 0.0);
        // Strip both irises
        face = {
            let mut stripped = FaceLandmarks::new();
            for index in [
                LandmarkIndex::LeftEyeOuter,
                LandmarkIndex::LeftEyeInner,
                LandmarkIndex::RightEyeInner,
                LandmarkIndex::RightEyeOuter,
            ] {
                if let Some(l) = face.landmark(index) {
                    stripped.set_landmark(index, *l);
                }
            }
            stripped
        };

        let reading = classifier.classify(&face, Utc::now());
        assert_eq!(reading, GazeReading::unknown());
        assert!(!classifier.alert_condition(&reading));
    }

    #[test]
    fn test_dwell_accumulates_and_banks_on_change() {
        let mut classifier = GazeClassifier::new(GazeConfig::default());
        let t0 = Utc::now();

        let left = face_with_iris_shift(-0.30, 0.0);
        classifier.classify(&left, t0);
        let reading = classifier.classify(&left, t0 + Duration::seconds(4));
        assert!(
            (reading.focus_secs - 4.0).abs() < 1e-9,
            "dwell should be 4s, got {}",
            reading.focus_secs
        );

        // Direction change banks the held duration
        let reading = classifier.classify(&face_with_iris_shift(0.30, 0.0), t0 + Duration::seconds(5));
        assert_eq!(reading.direction, GazeDirection::Right);
        assert!((reading.focus_secs - 0.0).abs() < 1e-9);
        assert!(
            (classifier.max_focus_secs(GazeDirection::Left) - 5.0).abs() < 1e-9,
            "left dwell of 5s should be recorded"
        );
    }
}
