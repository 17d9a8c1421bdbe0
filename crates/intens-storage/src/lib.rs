//! Local filesystem storage for the intensify backend.
//!
//! This crate provides:
//! - The on-disk layout for raw uploads and finished artifacts
//! - Atomic artifact publication (no partial files at the served path)
//! - Cross-device-safe file moves

pub mod error;
pub mod fs;
pub mod store;

pub use error::{StorageError, StorageResult};
pub use fs::move_file;
pub use store::LocalStore;
