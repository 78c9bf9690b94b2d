//! Platforms module - gig platform identification.

mod platforms_detector;
mod platforms_model;

pub use platforms_detector::detect_platform;
pub use platforms_model::Platform;
