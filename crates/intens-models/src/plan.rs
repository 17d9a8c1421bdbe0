//! Encode command description executed by the GIF backend.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::crop::CropSpec;

/// Per-frame display time in centiseconds.
pub const DEFAULT_DELAY_CS: u16 = 5;

/// gifsicle optimization level applied to the finished animation.
pub const DEFAULT_OPTIMIZE_LEVEL: u8 = 3;

/// Frame disposal method.
///
/// Crops shift the visible window every frame, so the previous frame
/// must be cleared rather than composited under the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Disposal {
    None,
    Asis,
    #[default]
    Background,
    Previous,
}

impl Disposal {
    /// The flag value gifsicle's `--disposal` option expects.
    pub fn as_flag(&self) -> &'static str {
        match self {
            Disposal::None => "none",
            Disposal::Asis => "asis",
            Disposal::Background => "bg",
            Disposal::Previous => "previous",
        }
    }
}

impl fmt::Display for Disposal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_flag())
    }
}

/// One crop applied to one on-disk frame file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedCrop {
    pub spec: CropSpec,
    /// The normalized single-frame file the crop is taken from.
    pub frame: PathBuf,
}

/// The full encode command description produced by the composer.
///
/// The plan is data only; rendering it to an argv and executing it is the
/// GIF backend's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JitterPlan {
    /// Crops in output order. Input frames repeat in cycle order when the
    /// output is longer than the input.
    pub crops: Vec<PlannedCrop>,
    /// Shave budget each crop distributes between opposing edges.
    pub max_offset: u32,
    pub disposal: Disposal,
    /// Loop the animation forever.
    pub loop_forever: bool,
    /// Uniform per-frame delay in centiseconds.
    pub delay_cs: u16,
    /// gifsicle `-O` level.
    pub optimize_level: u8,
    /// Suppress logical-screen normalization so shifted crops keep their
    /// own dimensions.
    pub no_logical_screen: bool,
}

impl JitterPlan {
    pub fn frame_count(&self) -> usize {
        self.crops.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disposal_flag() {
        assert_eq!(Disposal::Background.as_flag(), "bg");
        assert_eq!(Disposal::default(), Disposal::Background);
        assert_eq!(Disposal::Previous.to_string(), "previous");
    }

    #[test]
    fn test_plan_frame_count() {
        let plan = JitterPlan {
            crops: vec![
                PlannedCrop {
                    spec: CropSpec {
                        frame_index: 0,
                        x: 1,
                        y: 2,
                    },
                    frame: PathBuf::from("frame.000"),
                },
                PlannedCrop {
                    spec: CropSpec {
                        frame_index: 0,
                        x: 4,
                        y: 0,
                    },
                    frame: PathBuf::from("frame.000"),
                },
            ],
            max_offset: 10,
            disposal: Disposal::Background,
            loop_forever: true,
            delay_cs: DEFAULT_DELAY_CS,
            optimize_level: DEFAULT_OPTIMIZE_LEVEL,
            no_logical_screen: true,
        };
        assert_eq!(plan.frame_count(), 2);
    }
}
