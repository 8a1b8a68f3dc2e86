//! Common utility functions for the GazeGuard system.
//!
//! This module provides small numeric helpers used by the classifiers.

/// Clamps a value to a range.
#[must_use]
pub fn clamp<T: PartialOrd>(value: T, min: T, max: T) -> T {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Linearly interpolates between two values.
#[must_use]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    (b - a).mul_add(t, a)
}

/// Linearly rescales `value` from `[0, max_input]` to `[0, 100]`, saturating.
///
/// Used to turn raw offset magnitudes into percentage confidences.
#[must_use]
pub fn scale_to_percent(value: f64, max_input: f64) -> f64 {
    if max_input <= f64::EPSILON {
        return 0.0;
    }
    clamp(value / max_input * 100.0, 0.0, 100.0)
}

/// Arithmetic mean of a slice.
///
/// Returns 0.0 for an empty slice.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Converts degrees to radians.
#[must_use]
pub fn deg_to_rad(degrees: f64) -> f64 {
    degrees.to_radians()
}

/// Converts radians to degrees.
#[must_use]
pub fn rad_to_deg(radians: f64) -> f64 {
    radians.to_degrees()
}

/// Calculates the Euclidean distance between two points.
#[must_use]
pub fn euclidean_distance(p1: (f64, f64), p2: (f64, f64)) -> f64 {
    let dx = p2.0 - p1.0;
    let dy = p2.1 - p1.1;
    dx.hypot(dy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(5, 0, 10), 5);
        assert_eq!(clamp(-5, 0, 10), 0);
        assert_eq!(clamp(15, 0, 10), 10);
    }

    #[test]
    fn test_lerp() {
        assert!((lerp(0.0, 10.0, 0.5) - 5.0).abs() < 1e-10);
        assert!((lerp(0.0, 10.0, 0.0) - 0.0).abs() < 1e-10);
        assert!((lerp(0.0, 10.0, 1.0) - 10.0).abs() < 1e-10);
    }

    #[test]
    fn test_scale_to_percent() {
        assert!((scale_to_percent(0.05, 0.1) - 50.0).abs() < 1e-10);
        assert!((scale_to_percent(0.2, 0.1) - 100.0).abs() < 1e-10, "should saturate at 100");
        assert!((scale_to_percent(0.05, 0.0) - 0.0).abs() < 1e-10, "zero scale should give 0");
    }

    #[test]
    fn test_mean() {
        assert!((mean(&[1.0, 2.0, 3.0]) - 2.0).abs() < 1e-10);
        assert!((mean(&[]) - 0.0).abs() < 1e-10);
    }

    #[test]
    fn test_deg_rad_conversion() {
        let degrees = 180.0;
        let radians = deg_to_rad(degrees);
        assert!((radians - std::f64::consts::PI).abs() < 1e-10);

        let back = rad_to_deg(radians);
        assert!((back - degrees).abs() < 1e-10);
    }

    #[test]
    fn test_euclidean_distance() {
        let dist = euclidean_distance((0.0, 0.0), (3.0, 4.0));
        assert!((dist - 5.0).abs() < 1e-10);
    }
}
