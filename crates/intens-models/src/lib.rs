//! Shared data models for the intensify backend.
//!
//! This crate provides:
//! - Artifact identifiers
//! - Crop specs and the jitter encode plan
//! - Upload filename sanitization
//! - Geometry constants shared by the pipeline

pub mod crop;
pub mod id;
pub mod plan;
pub mod sanitize;

// Re-export common types
pub use crop::{CropSpec, MAX_DIMENSION, MAX_OFFSET, MIN_OUTPUT_FRAMES};
pub use id::{ImageId, InvalidImageId};
pub use plan::{Disposal, JitterPlan, PlannedCrop, DEFAULT_DELAY_CS, DEFAULT_OPTIMIZE_LEVEL};
pub use sanitize::sanitize_filename;
