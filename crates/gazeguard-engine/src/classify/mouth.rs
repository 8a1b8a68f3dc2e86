//! Mouth-open classification.
//!
//! The mouth metric is the vertical lip separation in normalized image
//! units. Alert cadence and the repeated-opening escalation are owned by
//! the threshold engine through the mouth channel's cooldown and
//! `max_alerts` settings.

use gazeguard_core::{FaceLandmarks, LandmarkIndex};

use crate::config::MouthConfig;

/// Result of classifying one frame's mouth state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouthReading {
    /// Vertical lip separation, normalized image units
    pub separation: f64,
    /// Whether the separation exceeds the open threshold
    pub is_open: bool,
}

/// Stateless mouth classifier.
#[derive(Debug)]
pub struct MouthClassifier {
    config: MouthConfig,
}

impl MouthClassifier {
    /// Creates a classifier with the given tuning.
    #[must_use]
    pub fn new(config: MouthConfig) -> Self {
        Self { config }
    }

    /// Classifies one frame.
    ///
    /// Returns `None` when either lip landmark is missing; the mouth
    /// channel is skipped for that frame.
    #[must_use]
    pub fn classify(&self, face: &FaceLandmarks) -> Option<MouthReading> {
        let upper = face.landmark(LandmarkIndex::UpperLip)?;
        let lower = face.landmark(LandmarkIndex::LowerLip)?;

        let separation = f64::from(lower.y - upper.y).abs();
        Some(MouthReading {
            separation,
            is_open: separation > self.config.open_threshold,
        })
    }
}
