//! gifsicle command builder and runner.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tracing::{debug, warn};

use intens_models::JitterPlan;

use crate::backend::ResizeTo;
use crate::error::{MediaError, MediaResult};

/// Builder for gifsicle commands.
///
/// gifsicle applies frame options to the inputs that follow them on the
/// command line, so options and inputs are kept in invocation order
/// rather than in separate lists.
#[derive(Debug, Clone)]
pub struct GifsicleCommand {
    args: Vec<String>,
    output: PathBuf,
}

impl GifsicleCommand {
    /// Create an empty command writing to `output`.
    pub fn new(output: impl AsRef<Path>) -> Self {
        Self {
            args: Vec::new(),
            output: output.as_ref().to_path_buf(),
        }
    }

    /// Append an option.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append multiple options.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append an input file.
    pub fn input(mut self, path: impl AsRef<Path>) -> Self {
        self.args
            .push(path.as_ref().to_string_lossy().to_string());
        self
    }

    /// The output path this command writes to.
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// De-optimization pre-pass: flatten frame-local color tables (capped
    /// at 255 colors) so any GIF can be exploded afterwards.
    pub fn deoptimize(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self::new(output)
            .args(["--unoptimize", "--colors", "255"])
            .input(input)
    }

    /// Split a GIF into one file per frame named `{output_stem}.NNN`.
    ///
    /// Asking gifsicle to explode a single-frame image does the right
    /// thing, so callers need no special case for still inputs. A pending
    /// downscale is applied here for GIF inputs that skipped the decode
    /// path.
    pub fn explode(
        input: impl AsRef<Path>,
        resize: Option<ResizeTo>,
        output_stem: impl AsRef<Path>,
    ) -> Self {
        let mut cmd = Self::new(output_stem).args(["--unoptimize", "--explode"]);
        if let Some(resize) = resize {
            cmd = cmd.args([
                "--resize".to_string(),
                format!("{}x{}", resize.width, resize.height),
                "--resize-method".to_string(),
                "lanczos3".to_string(),
            ]);
        }
        cmd.input(input)
    }

    /// Render a [`JitterPlan`] to its gifsicle invocation.
    pub fn encode(plan: &JitterPlan, output: impl AsRef<Path>) -> Self {
        let mut cmd = Self::new(output);
        if plan.no_logical_screen {
            cmd = cmd.arg("--no-logical-screen");
        }
        cmd = cmd.arg(format!("--disposal={}", plan.disposal.as_flag()));
        if plan.loop_forever {
            cmd = cmd.arg("-lforever");
        }
        cmd = cmd.arg(format!("-d{}", plan.delay_cs));
        for crop in &plan.crops {
            cmd = cmd
                .arg("--crop")
                .arg(format!(
                    "{},{}+-{}x-{}",
                    crop.spec.x,
                    crop.spec.y,
                    crop.spec.right_shave(plan.max_offset),
                    crop.spec.bottom_shave(plan.max_offset),
                ))
                .input(&crop.frame);
        }
        cmd.arg(format!("-O{}", plan.optimize_level))
    }

    /// Build the full argument list.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = self.args.clone();
        args.push("-o".to_string());
        args.push(self.output.to_string_lossy().to_string());
        args
    }
}

/// Runner for gifsicle commands with timeout and stderr capture.
#[derive(Debug, Clone)]
pub struct GifsicleRunner {
    binary: PathBuf,
    timeout_secs: Option<u64>,
}

impl GifsicleRunner {
    /// Create a runner using the gifsicle found in PATH.
    pub fn new() -> MediaResult<Self> {
        Ok(Self {
            binary: check_gifsicle()?,
            timeout_secs: None,
        })
    }

    /// Create a runner using an explicit binary path.
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            timeout_secs: None,
        }
    }

    /// Set a per-invocation timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Run a gifsicle command to completion.
    pub async fn run(&self, cmd: &GifsicleCommand) -> MediaResult<()> {
        let args = cmd.build_args();
        debug!("Running gifsicle: {} {}", self.binary.display(), args.join(" "));

        let mut child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => MediaError::GifsicleNotFound,
                _ => MediaError::from(e),
            })?;

        // Drain stderr concurrently so a chatty invocation can't fill the
        // pipe and deadlock against wait().
        let mut stderr = child.stderr.take().expect("stderr not captured");
        let stderr_task = tokio::spawn(async move {
            let mut buf = String::new();
            let _ = stderr.read_to_string(&mut buf).await;
            buf
        });

        let status = self.wait_for_completion(&mut child).await?;
        let stderr_out = stderr_task.await.unwrap_or_default();

        if status.success() {
            Ok(())
        } else {
            Err(MediaError::tool_failure(
                "gifsicle exited with non-zero status",
                (!stderr_out.is_empty()).then_some(stderr_out),
                status.code(),
            ))
        }
    }

    /// Wait for the child, killing it if the timeout elapses.
    async fn wait_for_completion(
        &self,
        child: &mut Child,
    ) -> MediaResult<std::process::ExitStatus> {
        match self.timeout_secs {
            Some(timeout_secs) => {
                let timeout = tokio::time::timeout(
                    Duration::from_secs(timeout_secs),
                    child.wait(),
                );
                match timeout.await {
                    Ok(result) => Ok(result?),
                    Err(_) => {
                        warn!(
                            "gifsicle timed out after {} seconds, killing process",
                            timeout_secs
                        );
                        let _ = child.kill().await;
                        Err(MediaError::Timeout(timeout_secs))
                    }
                }
            }
            None => Ok(child.wait().await?),
        }
    }
}

/// Check if gifsicle is available.
pub fn check_gifsicle() -> MediaResult<PathBuf> {
    which::which("gifsicle").map_err(|_| MediaError::GifsicleNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use intens_models::{CropSpec, Disposal, PlannedCrop};

    #[test]
    fn test_deoptimize_args() {
        let cmd = GifsicleCommand::deoptimize("in.gif", "out.gif");
        assert_eq!(
            cmd.build_args(),
            vec!["--unoptimize", "--colors", "255", "in.gif", "-o", "out.gif"]
        );
    }

    #[test]
    fn test_explode_args_without_resize() {
        let cmd = GifsicleCommand::explode("in.gif", None, "/tmp/work/frame");
        assert_eq!(
            cmd.build_args(),
            vec!["--unoptimize", "--explode", "in.gif", "-o", "/tmp/work/frame"]
        );
    }

    #[test]
    fn test_explode_args_with_resize() {
        let resize = Some(ResizeTo {
            width: 510,
            height: 340,
        });
        let cmd = GifsicleCommand::explode("in.gif", resize, "frame");
        assert_eq!(
            cmd.build_args(),
            vec![
                "--unoptimize",
                "--explode",
                "--resize",
                "510x340",
                "--resize-method",
                "lanczos3",
                "in.gif",
                "-o",
                "frame"
            ]
        );
    }

    #[test]
    fn test_encode_args_interleave_crops_and_frames() {
        let plan = JitterPlan {
            crops: vec![
                PlannedCrop {
                    spec: CropSpec {
                        frame_index: 0,
                        x: 3,
                        y: 7,
                    },
                    frame: "frame.000".into(),
                },
                PlannedCrop {
                    spec: CropSpec {
                        frame_index: 1,
                        x: 0,
                        y: 10,
                    },
                    frame: "frame.001".into(),
                },
            ],
            max_offset: 10,
            disposal: Disposal::Background,
            loop_forever: true,
            delay_cs: 5,
            optimize_level: 3,
            no_logical_screen: true,
        };
        let cmd = GifsicleCommand::encode(&plan, "out.gif");
        assert_eq!(
            cmd.build_args(),
            vec![
                "--no-logical-screen",
                "--disposal=bg",
                "-lforever",
                "-d5",
                "--crop",
                "3,7+-7x-3",
                "frame.000",
                "--crop",
                "0,10+-10x-0",
                "frame.001",
                "-O3",
                "-o",
                "out.gif"
            ]
        );
    }
}
