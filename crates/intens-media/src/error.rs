//! Error types for media operations.

use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while intensifying an image.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("gifsicle not found in PATH")]
    GifsicleNotFound,

    #[error("Could not decode input image: {0}")]
    DecodeFailure(String),

    #[error("gifsicle command failed: {message}")]
    ToolFailure {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("Frame {width}x{height} is too small for a {max_offset}px shave budget")]
    ImageTooSmall {
        width: u32,
        height: u32,
        max_offset: u32,
    },

    #[error("Input produced no frames")]
    EmptyFrameSet,

    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("GIF encoding failed: {0}")]
    GifEncode(#[from] gif::EncodingError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    /// Create a tool failure error.
    pub fn tool_failure(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::ToolFailure {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Create a decode failure error.
    pub fn decode_failure(message: impl Into<String>) -> Self {
        Self::DecodeFailure(message.into())
    }
}

impl From<image::ImageError> for MediaError {
    fn from(e: image::ImageError) -> Self {
        Self::DecodeFailure(e.to_string())
    }
}
