//! End-to-end intensification pipeline.

use std::path::Path;

use rand::Rng;
use tracing::info;

use crate::backend::GifTool;
use crate::compose::{compose, ComposeOptions};
use crate::error::MediaResult;
use crate::normalize::{normalize, NormalizeOptions};

/// Pipeline tuning, passed through to the normalizer and composer.
#[derive(Debug, Clone, Default)]
pub struct IntensifyOptions {
    pub normalize: NormalizeOptions,
    pub compose: ComposeOptions,
}

/// Turn `source_bytes` into a finished jitter animation at `output`.
///
/// Scratch files live in a fresh temporary directory that is removed on
/// every exit path, including errors. On failure nothing is written to
/// `output`. The crop offsets come from `rng`, so a seeded generator
/// reproduces the same animation.
pub async fn intensify<R: Rng + ?Sized>(
    backend: &dyn GifTool,
    source_bytes: &[u8],
    output: &Path,
    options: &IntensifyOptions,
    rng: &mut R,
) -> MediaResult<()> {
    let scratch = tempfile::Builder::new().prefix("intens").tempdir()?;

    let frames = normalize(backend, source_bytes, scratch.path(), &options.normalize).await?;
    let plan = compose(&frames, &options.compose, rng)?;
    backend.encode(&plan, output).await?;

    info!(
        input_frames = frames.len(),
        output_frames = plan.frame_count(),
        width = frames.width,
        height = frames.height,
        "intensified image"
    );
    Ok(())
}
