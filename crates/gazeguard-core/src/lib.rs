//! # GazeGuard Core
//!
//! Core types and utilities for the GazeGuard attention monitoring system.
//!
//! This crate provides the foundational building blocks used by the
//! monitoring engine, including:
//!
//! - **Core Data Types**: [`FrameSample`], [`FaceLandmarks`], [`Landmark`],
//!   [`RotationMatrix`], and [`PoseAngles`] for representing per-frame
//!   landmark input and head pose.
//!
//! - **Error Types**: Error handling via the [`error`] module, with
//!   recoverability classification for per-frame degradation.
//!
//! - **Utilities**: Small numeric helpers shared by the classifiers.
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization via serde
//!
//! ## Example
//!
//! ```rust
//! use gazeguard_core::{Confidence, FaceLandmarks, Landmark, LandmarkIndex};
//!
//! let mut face = FaceLandmarks::new();
//! face.set_landmark(
//!     LandmarkIndex::NoseTip,
//!     Landmark::new(0.5, 0.45, Confidence::new(0.95).unwrap()),
//! );
//!
//! assert_eq!(face.visible_count(), 1);
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod types;
pub mod utils;

// Re-export commonly used types at the crate root
pub use error::{CoreError, CoreResult, LandmarkError};
pub use types::{
    // Landmark types
    BodyPose, FaceLandmarks, Landmark, LandmarkIndex,
    // Pose types
    PoseAngles, RotationMatrix,
    // Frame types
    FrameSample,
    // Common types
    Confidence, DeviceId, SessionId, SubjectId,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Number of semantic landmarks per face table
pub const LANDMARK_COUNT: usize = 11;

/// Default confidence threshold for landmark visibility
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.5;

/// Prelude module for convenient imports.
///
/// ```rust
/// use gazeguard_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{CoreError, CoreResult, LandmarkError};
    pub use crate::types::{
        BodyPose, Confidence, DeviceId, FaceLandmarks, FrameSample, Landmark, LandmarkIndex,
        PoseAngles, RotationMatrix, SessionId, SubjectId,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_valid() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_constants() {
        assert_eq!(LANDMARK_COUNT, types::LandmarkIndex::ALL.len());
        assert!(DEFAULT_CONFIDENCE_THRESHOLD > 0.0);
        assert!(DEFAULT_CONFIDENCE_THRESHOLD < 1.0);
    }
}
