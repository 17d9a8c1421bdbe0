//! GIF tool capability.
//!
//! The pipeline consumes GIF manipulation through the [`GifTool`] trait
//! so tests can inject a fake and never spawn a real subprocess.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use intens_models::JitterPlan;

use crate::command::{GifsicleCommand, GifsicleRunner};
use crate::error::MediaResult;

/// Downscale applied while exploding. GIF inputs skip the decode path,
/// so their resize happens at this stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeTo {
    pub width: u32,
    pub height: u32,
}

/// Capability interface over an external GIF encoder/decoder.
#[async_trait]
pub trait GifTool: Send + Sync {
    /// Flatten frame-local color tables so the file can be exploded.
    async fn deoptimize(&self, input: &Path, output: &Path) -> MediaResult<()>;

    /// Split a GIF into one file per frame, returned in display order.
    async fn explode(
        &self,
        input: &Path,
        resize: Option<ResizeTo>,
        output_stem: &Path,
    ) -> MediaResult<Vec<PathBuf>>;

    /// Execute an encode plan, writing the finished animation to `output`.
    async fn encode(&self, plan: &JitterPlan, output: &Path) -> MediaResult<()>;
}

/// gifsicle-backed implementation of [`GifTool`].
#[derive(Debug, Clone)]
pub struct Gifsicle {
    runner: GifsicleRunner,
}

impl Gifsicle {
    /// Use the gifsicle found in PATH.
    pub fn new() -> MediaResult<Self> {
        Ok(Self {
            runner: GifsicleRunner::new()?,
        })
    }

    /// Use an explicit binary path.
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            runner: GifsicleRunner::with_binary(binary),
        }
    }

    /// Apply a per-invocation timeout to every tool call.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.runner = self.runner.with_timeout(secs);
        self
    }
}

#[async_trait]
impl GifTool for Gifsicle {
    async fn deoptimize(&self, input: &Path, output: &Path) -> MediaResult<()> {
        self.runner
            .run(&GifsicleCommand::deoptimize(input, output))
            .await
    }

    async fn explode(
        &self,
        input: &Path,
        resize: Option<ResizeTo>,
        output_stem: &Path,
    ) -> MediaResult<Vec<PathBuf>> {
        self.runner
            .run(&GifsicleCommand::explode(input, resize, output_stem))
            .await?;
        list_exploded_frames(output_stem)
    }

    async fn encode(&self, plan: &JitterPlan, output: &Path) -> MediaResult<()> {
        self.runner
            .run(&GifsicleCommand::encode(plan, output))
            .await
    }
}

/// List the files gifsicle's `--explode` produced for `stem`, in frame
/// order.
///
/// Exploded frames are named `{stem}.NNN` with a suffix that widens past
/// three digits on long animations, so the listing sorts by the numeric
/// suffix rather than lexically.
pub fn list_exploded_frames(stem: &Path) -> MediaResult<Vec<PathBuf>> {
    let dir = stem.parent().filter(|p| !p.as_os_str().is_empty());
    let dir = dir.unwrap_or_else(|| Path::new("."));
    let prefix = stem
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut frames: Vec<(usize, PathBuf)> = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let suffix = name
            .strip_prefix(&prefix)
            .and_then(|rest| rest.strip_prefix('.'));
        if let Some(Ok(index)) = suffix.map(str::parse::<usize>) {
            frames.push((index, entry.path()));
        }
    }
    frames.sort_by_key(|(index, _)| *index);
    Ok(frames.into_iter().map(|(_, path)| path).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_exploded_frames_numeric_order() {
        let dir = tempfile::TempDir::new().unwrap();
        for suffix in ["002", "000", "1000", "010", "999"] {
            std::fs::write(dir.path().join(format!("frame.{suffix}")), b"x").unwrap();
        }
        // Unrelated files are ignored.
        std::fs::write(dir.path().join("frame.gif"), b"x").unwrap();
        std::fs::write(dir.path().join("other.000"), b"x").unwrap();

        let frames = list_exploded_frames(&dir.path().join("frame")).unwrap();
        let names: Vec<String> = frames
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec!["frame.000", "frame.002", "frame.010", "frame.999", "frame.1000"]
        );
    }

    #[test]
    fn test_list_exploded_frames_empty_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let frames = list_exploded_frames(&dir.path().join("frame")).unwrap();
        assert!(frames.is_empty());
    }
}
