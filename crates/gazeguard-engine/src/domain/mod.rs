//! Domain types for the attention monitoring engine.
//!
//! Pure data types shared across the classifier, scoring, and alerting
//! contexts: alert channels and their per-channel state, immutable alert
//! events, and the typed event stream exposed to observers.

pub mod alert;
pub mod channel;
pub mod events;

pub use alert::{AlertContext, AlertEvent, AlertId, GazeSnapshot, Severity};
pub use channel::{ChannelId, ChannelState, GazeDirection, PoseDirection};
pub use events::{InMemoryEventLog, MonitorEvent, MonitorObserver};
