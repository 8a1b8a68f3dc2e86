//! One-dimensional Kalman filter for scalar measurement streams.
//!
//! Each noisy per-frame scalar (a pose angle, an iris offset) gets its
//! own filter instance; there is no cross-channel coupling.

/// A 1-D Kalman filter over a scalar measurement stream.
///
/// Per update, with process noise `q` and measurement noise `r`:
///
/// ```text
/// p = p + q                 (predict uncertainty)
/// k = p / (p + r)           (gain)
/// x = x + k * (m - x)       (correct estimate)
/// p = (1 - k) * p           (collapse uncertainty)
/// ```
///
/// With `q`, `r` > 0 the gain stays in (0, 1), so the estimate moves
/// strictly toward each measurement without overshooting it.
#[derive(Debug, Clone)]
pub struct ScalarKalman {
    /// Current state estimate
    x: f64,
    /// Estimate uncertainty
    p: f64,
    /// Process noise
    q: f64,
    /// Measurement noise
    r: f64,
}

impl ScalarKalman {
    /// Creates a filter with the given noise parameters.
    ///
    /// Non-positive noise values are raised to a small epsilon to keep
    /// the gain well-defined.
    #[must_use]
    pub fn new(q: f64, r: f64) -> Self {
        Self {
            x: 0.0,
            p: 1.0,
            q: q.max(1e-9),
            r: r.max(1e-9),
        }
    }

    /// Feeds one measurement and returns the updated estimate.
    pub fn update(&mut self, measurement: f64) -> f64 {
        self.p += self.q;
        let k = self.p / (self.p + self.r);
        self.x += k * (measurement - self.x);
        self.p *= 1.0 - k;
        self.x
    }

    /// Returns the current estimate without feeding a measurement.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.x
    }

    /// Resets the filter to a known initial state.
    pub fn reset(&mut self, initial: f64) {
        self.x = initial;
        self.p = 1.0;
    }
}

impl Default for ScalarKalman {
    fn default() -> Self {
        Self::new(1e-3, 1e-1)
    }
}
