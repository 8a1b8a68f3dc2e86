//! Per-frame classifiers.
//!
//! Each classifier turns landmark input into a small typed reading and
//! degrades to `None` or a neutral reading when its landmarks are
//! missing. Alert cadence (cooldowns, escalation) is not decided here;
//! readings flow into the threshold engine.

mod gaze;
mod mouth;
mod pose;
mod presence;

pub use gaze::{GazeClassifier, GazeReading};
pub use mouth::{MouthClassifier, MouthReading};
pub use pose::{PoseClassifier, PoseMethod, PoseReading};
pub use presence::{PresenceDetector, PresenceReading};
