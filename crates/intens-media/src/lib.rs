#![deny(unreachable_patterns)]
//! gifsicle CLI wrapper and the intensification pipeline.
//!
//! This crate provides:
//! - Type-safe gifsicle command building
//! - An injectable GIF tool capability with a subprocess-backed implementation
//! - Frame normalization for arbitrary raster inputs
//! - Jitter composition (crop scheduling) and the end-to-end pipeline

pub mod backend;
pub mod command;
pub mod compose;
pub mod error;
pub mod normalize;
pub mod pipeline;

pub use backend::{GifTool, Gifsicle, ResizeTo};
pub use command::{check_gifsicle, GifsicleCommand, GifsicleRunner};
pub use compose::{compose, output_frame_count, ComposeOptions};
pub use error::{MediaError, MediaResult};
pub use normalize::{normalize, FrameSet, NormalizeOptions};
pub use pipeline::{intensify, IntensifyOptions};
