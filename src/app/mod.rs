// Screen-level orchestration, independent of any UI toolkit

pub mod screen;

pub use screen::{DetectionScreen, ScreenOutcome};
