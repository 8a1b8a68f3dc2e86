//! Signal conditioning for noisy per-frame measurements.

mod filter;
mod window;

pub use filter::ScalarKalman;
pub use window::RollingWindow;
