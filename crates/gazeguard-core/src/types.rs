//! Core data types for the GazeGuard attention monitoring system.
//!
//! This module defines the fundamental data structures shared by the
//! monitoring engine for representing facial landmarks, head rotation,
//! and per-frame samples.
//!
//! # Type Categories
//!
//! - **Landmark Types**: [`Landmark`], [`LandmarkIndex`], [`FaceLandmarks`], [`BodyPose`]
//! - **Pose Types**: [`RotationMatrix`], [`PoseAngles`]
//! - **Frame Types**: [`FrameSample`]
//! - **Common Types**: [`Confidence`], [`SessionId`], [`SubjectId`], [`DeviceId`]

use chrono::{DateTime, Utc};
use uuid::Uuid;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, LandmarkError};
use crate::{DEFAULT_CONFIDENCE_THRESHOLD, LANDMARK_COUNT};

// =============================================================================
// Common Types
// =============================================================================

/// Unique identifier for a monitoring session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SessionId(Uuid);

impl SessionId {
    /// Creates a new unique session ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a session ID from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier for the monitored subject.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SubjectId(String);

impl SubjectId {
    /// Creates a new subject ID from a string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the subject ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier for the capture device reporting frames.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeviceId(String);

impl DeviceId {
    /// Creates a new device ID from a string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the device ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Confidence score in the range [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Confidence(f32);

impl Confidence {
    /// Creates a new confidence value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not in the range [0.0, 1.0].
    pub fn new(value: f32) -> CoreResult<Self> {
        if !(0.0..=1.0).contains(&value) {
            return Err(CoreError::validation(format!(
                "Confidence must be in [0.0, 1.0], got {value}"
            )));
        }
        Ok(Self(value))
    }

    /// Creates a confidence value, clamping out-of-range input.
    #[must_use]
    pub fn saturating(value: f32) -> Self {
        Self(value.clamp(0.0, 1.0))
    }

    /// Returns the raw confidence value.
    #[must_use]
    pub fn value(&self) -> f32 {
        self.0
    }

    /// Returns `true` if the confidence exceeds the default threshold.
    #[must_use]
    pub fn is_high(&self) -> bool {
        self.0 >= DEFAULT_CONFIDENCE_THRESHOLD
    }

    /// Returns `true` if the confidence exceeds the given threshold.
    #[must_use]
    pub fn exceeds(&self, threshold: f32) -> bool {
        self.0 >= threshold
    }

    /// Maximum confidence (1.0).
    pub const MAX: Self = Self(1.0);

    /// Minimum confidence (0.0).
    pub const MIN: Self = Self(0.0);
}

impl Default for Confidence {
    fn default() -> Self {
        Self(0.0)
    }
}

// =============================================================================
// Landmark Types
// =============================================================================

/// Semantic index of a tracked facial or upper-body landmark.
///
/// The engine consumes a fixed, detector-agnostic set of points. An
/// upstream landmark detector is expected to map its own mesh indices
/// onto these before handing frames to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum LandmarkIndex {
    /// Top of the forehead
    Forehead = 0,
    /// Bottom of the chin
    Chin = 1,
    /// Tip of the nose
    NoseTip = 2,
    /// Outer corner of the left eye
    LeftEyeOuter = 3,
    /// Inner corner of the left eye
    LeftEyeInner = 4,
    /// Inner corner of the right eye
    RightEyeInner = 5,
    /// Outer corner of the right eye
    RightEyeOuter = 6,
    /// Center of the left iris
    LeftIris = 7,
    /// Center of the right iris
    RightIris = 8,
    /// Center of the upper lip
    UpperLip = 9,
    /// Center of the lower lip
    LowerLip = 10,
}

impl LandmarkIndex {
    /// All landmark indices in table order.
    pub const ALL: [Self; LANDMARK_COUNT] = [
        Self::Forehead,
        Self::Chin,
        Self::NoseTip,
        Self::LeftEyeOuter,
        Self::LeftEyeInner,
        Self::RightEyeInner,
        Self::RightEyeOuter,
        Self::LeftIris,
        Self::RightIris,
        Self::UpperLip,
        Self::LowerLip,
    ];

    /// Returns the landmark name as a string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Forehead => "forehead",
            Self::Chin => "chin",
            Self::NoseTip => "nose_tip",
            Self::LeftEyeOuter => "left_eye_outer",
            Self::LeftEyeInner => "left_eye_inner",
            Self::RightEyeInner => "right_eye_inner",
            Self::RightEyeOuter => "right_eye_outer",
            Self::LeftIris => "left_iris",
            Self::RightIris => "right_iris",
            Self::UpperLip => "upper_lip",
            Self::LowerLip => "lower_lip",
        }
    }

    /// Returns `true` if this landmark belongs to an eye region.
    #[must_use]
    pub fn is_eye(&self) -> bool {
        matches!(
            self,
            Self::LeftEyeOuter
                | Self::LeftEyeInner
                | Self::RightEyeInner
                | Self::RightEyeOuter
                | Self::LeftIris
                | Self::RightIris
        )
    }

    /// Returns `true` if this landmark belongs to the mouth region.
    #[must_use]
    pub fn is_mouth(&self) -> bool {
        matches!(self, Self::UpperLip | Self::LowerLip)
    }
}

impl TryFrom<u8> for LandmarkIndex {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Forehead),
            1 => Ok(Self::Chin),
            2 => Ok(Self::NoseTip),
            3 => Ok(Self::LeftEyeOuter),
            4 => Ok(Self::LeftEyeInner),
            5 => Ok(Self::RightEyeInner),
            6 => Ok(Self::RightEyeOuter),
            7 => Ok(Self::LeftIris),
            8 => Ok(Self::RightIris),
            9 => Ok(Self::UpperLip),
            10 => Ok(Self::LowerLip),
            _ => Err(LandmarkError::UnknownIndex { index: value }.into()),
        }
    }
}

/// A single landmark in normalized image coordinates.
///
/// Coordinates are normalized to [0.0, 1.0] with the origin at the
/// top-left of the frame. `z` is an optional relative depth supplied by
/// detectors that estimate it.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Landmark {
    /// Normalized x coordinate
    pub x: f32,
    /// Normalized y coordinate
    pub y: f32,
    /// Optional relative depth
    pub z: Option<f32>,
    /// Detection confidence
    pub confidence: Confidence,
}

impl Landmark {
    /// Creates a new landmark.
    #[must_use]
    pub fn new(x: f32, y: f32, confidence: Confidence) -> Self {
        Self {
            x,
            y,
            z: None,
            confidence,
        }
    }

    /// Creates a landmark with a depth component.
    #[must_use]
    pub fn with_depth(x: f32, y: f32, z: f32, confidence: Confidence) -> Self {
        Self {
            x,
            y,
            z: Some(z),
            confidence,
        }
    }

    /// Returns the 2D position as a tuple.
    #[must_use]
    pub fn position_2d(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    /// Returns `true` if the landmark confidence exceeds the default threshold.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.confidence.is_high()
    }

    /// Computes the 2D Euclidean distance to another landmark.
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.hypot(dy)
    }

    /// Returns the midpoint between this landmark and another.
    #[must_use]
    pub fn midpoint(&self, other: &Self) -> (f32, f32) {
        ((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// Fixed-capacity landmark table for a single detected face.
///
/// Entries are indexed by [`LandmarkIndex`]; absent entries model
/// landmarks the upstream detector failed to produce. Classifiers treat
/// missing entries as a signal to skip their channel for the frame.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FaceLandmarks {
    landmarks: [Option<Landmark>; LANDMARK_COUNT],
}

impl FaceLandmarks {
    /// Creates an empty landmark table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a landmark at the given index.
    pub fn set_landmark(&mut self, index: LandmarkIndex, landmark: Landmark) {
        self.landmarks[index as usize] = Some(landmark);
    }

    /// Returns the landmark at the given index, if present.
    #[must_use]
    pub fn landmark(&self, index: LandmarkIndex) -> Option<&Landmark> {
        self.landmarks[index as usize].as_ref()
    }

    /// Returns `true` if all of the given landmarks are present.
    #[must_use]
    pub fn has_all(&self, indices: &[LandmarkIndex]) -> bool {
        indices.iter().all(|i| self.landmarks[*i as usize].is_some())
    }

    /// Returns the number of landmarks present in the table.
    #[must_use]
    pub fn visible_count(&self) -> usize {
        self.landmarks.iter().filter(|l| l.is_some()).count()
    }
}

/// Upper-body reference points used by the ratio-based pose fallback.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BodyPose {
    /// Left shoulder landmark
    pub left_shoulder: Option<Landmark>,
    /// Right shoulder landmark
    pub right_shoulder: Option<Landmark>,
}

impl BodyPose {
    /// Creates a body pose from both shoulder landmarks.
    #[must_use]
    pub fn new(left_shoulder: Landmark, right_shoulder: Landmark) -> Self {
        Self {
            left_shoulder: Some(left_shoulder),
            right_shoulder: Some(right_shoulder),
        }
    }

    /// Returns the normalized shoulder width, if both shoulders are present.
    #[must_use]
    pub fn shoulder_width(&self) -> Option<f32> {
        match (&self.left_shoulder, &self.right_shoulder) {
            (Some(l), Some(r)) => Some(l.distance_to(r)),
            _ => None,
        }
    }

    /// Returns the shoulder midpoint, if both shoulders are present.
    #[must_use]
    pub fn shoulder_midpoint(&self) -> Option<(f32, f32)> {
        match (&self.left_shoulder, &self.right_shoulder) {
            (Some(l), Some(r)) => Some(l.midpoint(r)),
            _ => None,
        }
    }
}

// =============================================================================
// Pose Types
// =============================================================================

/// Head pose angles in degrees.
///
/// Convention: positive `pitch` nods the head downward, positive `yaw`
/// turns it to the subject's right (camera's left), positive `roll` tilts
/// it clockwise as seen by the camera.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PoseAngles {
    /// Pitch angle in degrees (nod)
    pub pitch: f64,
    /// Yaw angle in degrees (turn)
    pub yaw: f64,
    /// Roll angle in degrees (tilt)
    pub roll: f64,
}

impl PoseAngles {
    /// Creates a new set of pose angles.
    #[must_use]
    pub fn new(pitch: f64, yaw: f64, roll: f64) -> Self {
        Self { pitch, yaw, roll }
    }

    /// Component-wise difference (`self - other`).
    #[must_use]
    pub fn sub(&self, other: &Self) -> Self {
        Self {
            pitch: self.pitch - other.pitch,
            yaw: self.yaw - other.yaw,
            roll: self.roll - other.roll,
        }
    }

    /// Component-wise mean of a set of angle observations.
    ///
    /// Returns `None` for an empty slice.
    #[must_use]
    pub fn mean(angles: &[Self]) -> Option<Self> {
        if angles.is_empty() {
            return None;
        }
        let n = angles.len() as f64;
        let mut sum = Self::default();
        for a in angles {
            sum.pitch += a.pitch;
            sum.yaw += a.yaw;
            sum.roll += a.roll;
        }
        Some(Self {
            pitch: sum.pitch / n,
            yaw: sum.yaw / n,
            roll: sum.roll / n,
        })
    }

    /// Largest absolute component in degrees.
    #[must_use]
    pub fn max_abs(&self) -> f64 {
        self.pitch.abs().max(self.yaw.abs()).max(self.roll.abs())
    }
}

/// A 3x3 head rotation matrix in row-major order.
///
/// Supplied by upstream detectors that estimate a facial transform;
/// when absent the engine falls back to landmark-ratio classification.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RotationMatrix([[f64; 3]; 3]);

impl RotationMatrix {
    /// Creates a rotation matrix from rows.
    #[must_use]
    pub fn from_rows(rows: [[f64; 3]; 3]) -> Self {
        Self(rows)
    }

    /// The identity rotation (neutral head pose).
    #[must_use]
    pub fn identity() -> Self {
        Self([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]])
    }

    /// Returns the element at `(row, col)`.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.0[row][col]
    }

    /// Extracts Euler angles in degrees using the ZYX convention.
    ///
    /// For `R = Rz(roll) * Ry(yaw) * Rx(pitch)`:
    ///
    /// ```text
    /// sy    = sqrt(r00^2 + r10^2)
    /// pitch = atan2(r21, r22)
    /// yaw   = atan2(-r20, sy)
    /// roll  = atan2(r10, r00)
    /// ```
    ///
    /// Near gimbal lock (`sy ~ 0`) pitch is recovered from the second
    /// row and roll is fixed to zero.
    #[must_use]
    pub fn to_euler_degrees(&self) -> PoseAngles {
        let r = &self.0;
        let sy = r[0][0].hypot(r[1][0]);

        let (pitch, yaw, roll) = if sy > 1e-6 {
            (
                r[2][1].atan2(r[2][2]),
                (-r[2][0]).atan2(sy),
                r[1][0].atan2(r[0][0]),
            )
        } else {
            ((-r[1][2]).atan2(r[1][1]), (-r[2][0]).atan2(sy), 0.0)
        };

        PoseAngles {
            pitch: pitch.to_degrees(),
            yaw: yaw.to_degrees(),
            roll: roll.to_degrees(),
        }
    }
}

impl Default for RotationMatrix {
    fn default() -> Self {
        Self::identity()
    }
}

// =============================================================================
// Frame Types
// =============================================================================

/// One processed video frame as delivered to the monitoring engine.
///
/// A sample carries every detected face (multi-face detection inspects
/// the count), the optional head rotation estimate for the primary face,
/// and optional upper-body reference points. Each sample is consumed
/// exactly once by the frame pipeline.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FrameSample {
    /// Landmark tables for every detected face
    pub faces: Vec<FaceLandmarks>,
    /// Head rotation estimate for the primary face
    pub rotation: Option<RotationMatrix>,
    /// Upper-body reference points
    pub body: Option<BodyPose>,
    /// Capture timestamp
    pub timestamp: DateTime<Utc>,
}

impl FrameSample {
    /// Creates a frame sample with the given faces, captured now.
    #[must_use]
    pub fn new(faces: Vec<FaceLandmarks>) -> Self {
        Self {
            faces,
            rotation: None,
            body: None,
            timestamp: Utc::now(),
        }
    }

    /// Creates an empty sample (no face detected), captured now.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Attaches a head rotation estimate.
    #[must_use]
    pub fn with_rotation(mut self, rotation: RotationMatrix) -> Self {
        self.rotation = Some(rotation);
        self
    }

    /// Attaches upper-body reference points.
    #[must_use]
    pub fn with_body(mut self, body: BodyPose) -> Self {
        self.body = Some(body);
        self
    }

    /// Overrides the capture timestamp.
    #[must_use]
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Number of faces detected in the frame.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Returns the primary (first) face, if any was detected.
    #[must_use]
    pub fn primary_face(&self) -> Option<&FaceLandmarks> {
        self.faces.first()
    }
}
