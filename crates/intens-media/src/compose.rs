//! Jitter composition: crop scheduling over normalized frames.

use rand::Rng;

use intens_models::{
    CropSpec, Disposal, JitterPlan, PlannedCrop, DEFAULT_DELAY_CS, DEFAULT_OPTIMIZE_LEVEL,
    MAX_OFFSET, MIN_OUTPUT_FRAMES,
};

use crate::error::{MediaError, MediaResult};
use crate::normalize::FrameSet;

/// Composer tuning.
#[derive(Debug, Clone)]
pub struct ComposeOptions {
    /// Total pixels shaved off each axis per output frame.
    pub max_offset: u32,
    /// Uniform per-frame delay in centiseconds.
    pub delay_cs: u16,
    /// Minimum length of the output animation.
    pub min_output_frames: usize,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            max_offset: MAX_OFFSET,
            delay_cs: DEFAULT_DELAY_CS,
            min_output_frames: MIN_OUTPUT_FRAMES,
        }
    }
}

/// Number of output frames for `input_frames` inputs.
///
/// At least `min_output` frames are produced, and for shorter inputs the
/// count is rounded up to an exact multiple of the input length so a
/// looping animation stays seamless.
pub fn output_frame_count(input_frames: usize, min_output: usize) -> usize {
    if input_frames >= min_output {
        input_frames
    } else {
        input_frames * min_output.div_ceil(input_frames)
    }
}

/// Schedule one near-full-frame crop per output frame.
///
/// Input frames are cycled in display order; each selected frame gets
/// offsets drawn independently and uniformly from `[0, max_offset]`.
/// Per-frame delays of animated inputs are intentionally discarded: the
/// output always plays at the uniform `delay_cs`.
pub fn compose<R: Rng + ?Sized>(
    frames: &FrameSet,
    options: &ComposeOptions,
    rng: &mut R,
) -> MediaResult<JitterPlan> {
    if frames.is_empty() {
        return Err(MediaError::EmptyFrameSet);
    }
    if frames.width <= options.max_offset || frames.height <= options.max_offset {
        return Err(MediaError::ImageTooSmall {
            width: frames.width,
            height: frames.height,
            max_offset: options.max_offset,
        });
    }

    let count = output_frame_count(frames.len(), options.min_output_frames);
    let mut crops = Vec::with_capacity(count);
    for (index, frame) in frames.frames.iter().cycle().take(count).enumerate() {
        crops.push(PlannedCrop {
            spec: CropSpec {
                frame_index: index % frames.len(),
                x: rng.random_range(0..=options.max_offset),
                y: rng.random_range(0..=options.max_offset),
            },
            frame: frame.clone(),
        });
    }

    Ok(JitterPlan {
        crops,
        max_offset: options.max_offset,
        disposal: Disposal::Background,
        loop_forever: true,
        delay_cs: options.delay_cs,
        optimize_level: DEFAULT_OPTIMIZE_LEVEL,
        no_logical_screen: true,
    })
}
