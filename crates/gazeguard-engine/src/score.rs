//! Attention score integration.
//!
//! A bounded scalar in [0, 100] updated once per frame from elapsed
//! wall time and the frame's classification outcome.

use crate::config::ScoreConfig;

/// Bounded attention score for one session.
#[derive(Debug, Clone)]
pub struct AttentionScoreModel {
    config: ScoreConfig,
    score: f64,
}

impl AttentionScoreModel {
    /// Creates a model starting at the configured initial score.
    #[must_use]
    pub fn new(config: ScoreConfig) -> Self {
        let score = config.initial_score.clamp(0.0, 100.0);
        Self { config, score }
    }

    /// Updates the score for one frame and returns the new value.
    ///
    /// No face outranks deviance: a frame without a face decays by the
    /// no-face factor regardless of other flags. The score is clamped to
    /// [0, 100] after every update.
    pub fn update(&mut self, face_detected: bool, is_deviant: bool, elapsed_secs: f64) -> f64 {
        let elapsed = elapsed_secs.max(0.0);

        let delta = if !face_detected {
            -self.config.no_face_decrement * elapsed
        } else if is_deviant {
            -self.config.attention_decrement * elapsed
        } else {
            self.config.attention_increment * elapsed
        };

        self.score = (self.score + delta).clamp(0.0, 100.0);
        self.score
    }

    /// Current score in [0, 100].
    #[must_use]
    pub fn score(&self) -> f64 {
        self.score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> AttentionScoreModel {
        AttentionScoreModel::new(ScoreConfig::default())
    }

    #[test]
    fn test_starts_at_initial_score() {
        assert!((model().score() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_attentive_frames_recover_score() {
        let mut model = model();
        model.update(true, true, 4.0);
        let lowered = model.score();
        assert!(lowered < 100.0);

        model.update(true, false, 1.0);
        assert!(model.score() > lowered, "attentive time should recover score");
    }

    #[test]
    fn test_no_face_outranks_deviance() {
        let mut a = model();
        let mut b = model();
        a.update(false, true, 1.0);
        b.update(true, true, 1.0);
        assert!(
            a.score() < b.score(),
            "no-face decay ({}) should outpace deviant decay ({})",
            a.score(),
            b.score()
        );
    }

    #[test]
    fn test_sustained_absence_drives_to_zero() {
        let mut model = model();
        for _ in 0..20 {
            model.update(false, false, 1.0);
        }
        assert!((model.score() - 0.0).abs() < f64::EPSILON, "score must clamp at 0");
    }

    #[test]
    fn test_sustained_attention_drives_to_hundred() {
        let mut model = AttentionScoreModel::new(ScoreConfig {
            initial_score: 10.0,
            ..ScoreConfig::default()
        });
        for _ in 0..100 {
            model.update(true, false, 1.0);
        }
        assert!((model.score() - 100.0).abs() < f64::EPSILON, "score must clamp at 100");
    }

    #[test]
    fn test_negative_elapsed_is_ignored() {
        let mut model = model();
        model.update(true, false, -5.0);
        assert!((model.score() - 100.0).abs() < f64::EPSILON);
    }
}
