//! Face presence and multi-face detection.

use gazeguard_core::FrameSample;

/// Result of the presence check for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresenceReading {
    /// Number of faces in the frame
    pub face_count: usize,
}

impl PresenceReading {
    /// Returns `true` if no face was detected.
    #[must_use]
    pub fn is_absent(&self) -> bool {
        self.face_count == 0
    }

    /// Returns `true` if more than one face was detected.
    #[must_use]
    pub fn is_multiple(&self) -> bool {
        self.face_count > 1
    }
}

/// Counts faces per frame.
#[derive(Debug, Default)]
pub struct PresenceDetector;

impl PresenceDetector {
    /// Creates a presence detector.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Classifies one frame.
    #[must_use]
    pub fn classify(&self, sample: &FrameSample) -> PresenceReading {
        PresenceReading {
            face_count: sample.face_count(),
        }
    }
}
