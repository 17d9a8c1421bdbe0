//! Frame normalization: arbitrary raster input to uniform single-frame GIFs.

use std::borrow::Cow;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use color_quant::NeuQuant;
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{DynamicImage, GenericImageView, ImageDecoder, ImageFormat, ImageReader, RgbaImage};
use tracing::debug;

use intens_models::MAX_DIMENSION;

use crate::backend::{GifTool, ResizeTo};
use crate::error::{MediaError, MediaResult};

/// Palette index reserved for the transparency pseudocolor.
const TRANSPARENT_INDEX: u8 = 255;

/// Colors available to opaque pixels once the transparency slot is
/// reserved.
const OPAQUE_COLORS: usize = 255;

/// Alpha at or below this threshold becomes fully transparent.
const ALPHA_THRESHOLD: u8 = 128;

/// NeuQuant sample factor (1 = slowest/best quality, 30 = fastest).
const QUANT_SAMPLE_FAC: i32 = 10;

/// Normalizer tuning.
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Longest side allowed for a normalized frame.
    pub max_dimension: u32,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            max_dimension: MAX_DIMENSION,
        }
    }
}

/// Ordered on-disk single-frame images produced by [`normalize`].
///
/// Frame order equals display order of the source; dimensions are
/// uniform across the set.
#[derive(Debug, Clone)]
pub struct FrameSet {
    pub frames: Vec<PathBuf>,
    pub width: u32,
    pub height: u32,
}

impl FrameSet {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Decode `source_bytes` into one file per frame under `scratch_dir`.
///
/// The caller owns `scratch_dir` and its cleanup; everything written here
/// lives inside it.
pub async fn normalize(
    backend: &dyn GifTool,
    source_bytes: &[u8],
    scratch_dir: &Path,
    options: &NormalizeOptions,
) -> MediaResult<FrameSet> {
    let format = image::guess_format(source_bytes)
        .map_err(|e| MediaError::decode_failure(e.to_string()))?;

    // GIF input goes straight to the tool. Recoding an already-indexed
    // animation pixel by pixel is unnecessary and lossy, and any pending
    // downscale can ride along with the explode.
    let (gif_path, pending_resize) = if format == ImageFormat::Gif {
        let source = scratch_dir.join("source.gif");
        tokio::fs::write(&source, source_bytes).await?;
        let (width, height) = dimensions_of(source_bytes)?;
        let resize = downscale_target(width, height, options.max_dimension)
            .map(|(width, height)| ResizeTo { width, height });
        (source, resize)
    } else {
        let image = decode_oriented(source_bytes)?;
        let image = fit_within(image, options.max_dimension);
        let converted = scratch_dir.join("converted.gif");
        write_gif_frame(&image, &converted)?;
        (converted, None)
    };

    let deoptimized = scratch_dir.join("deopt.gif");
    backend.deoptimize(&gif_path, &deoptimized).await?;

    let stem = scratch_dir.join("frame");
    let frames = backend.explode(&deoptimized, pending_resize, &stem).await?;
    if frames.is_empty() {
        return Err(MediaError::EmptyFrameSet);
    }

    // Exploded frames carry no file extension, so sniff the dimensions
    // from content rather than through extension-based format guessing.
    let first = tokio::fs::read(&frames[0]).await?;
    let (width, height) = dimensions_of(&first)?;
    debug!(frames = frames.len(), width, height, "normalized input");
    Ok(FrameSet {
        frames,
        width,
        height,
    })
}

/// Decode a non-GIF input, honoring its EXIF orientation.
fn decode_oriented(bytes: &[u8]) -> MediaResult<DynamicImage> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| MediaError::decode_failure(e.to_string()))?;
    let mut decoder = reader.into_decoder()?;
    // A broken EXIF block must not fail the whole decode.
    let orientation = decoder
        .orientation()
        .unwrap_or(Orientation::NoTransforms);
    let mut image = DynamicImage::from_decoder(decoder)?;
    image.apply_orientation(orientation);
    Ok(image)
}

/// Dimensions of an encoded image without a full decode.
fn dimensions_of(bytes: &[u8]) -> MediaResult<(u32, u32)> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| MediaError::decode_failure(e.to_string()))?
        .into_dimensions()
        .map_err(Into::into)
}

/// Target size for inputs whose longest side exceeds `max_dimension`,
/// preserving aspect ratio and rounding down.
fn downscale_target(width: u32, height: u32, max_dimension: u32) -> Option<(u32, u32)> {
    let longest = width.max(height);
    if longest <= max_dimension {
        return None;
    }
    let ratio = max_dimension as f64 / longest as f64;
    // Extreme aspect ratios can floor to zero; keep the resize valid and
    // let the composer reject the degenerate frame.
    Some((
        (((width as f64) * ratio).floor() as u32).max(1),
        (((height as f64) * ratio).floor() as u32).max(1),
    ))
}

/// Downscale `image` if it exceeds the budget. Orientation has already
/// been applied, so a rotated input resizes against its rotated
/// dimensions.
fn fit_within(image: DynamicImage, max_dimension: u32) -> DynamicImage {
    let (width, height) = image.dimensions();
    match downscale_target(width, height, max_dimension) {
        Some((w, h)) => image.resize_exact(w, h, FilterType::Lanczos3),
        None => image,
    }
}

/// Encode a decoded bitmap as a single-frame GIF.
fn write_gif_frame(image: &DynamicImage, path: &Path) -> MediaResult<()> {
    let (width, height) = image.dimensions();
    let frame = if image.color().has_alpha() {
        paletted_frame(&image.to_rgba8())
    } else {
        let rgb = image.to_rgb8();
        gif::Frame::from_rgb_speed(width as u16, height as u16, rgb.as_raw(), QUANT_SAMPLE_FAC)
    };
    let mut file = std::fs::File::create(path)?;
    let mut encoder = gif::Encoder::new(&mut file, width as u16, height as u16, &[])?;
    encoder.write_frame(&frame)?;
    Ok(())
}

/// Quantize an RGBA bitmap to an adaptive 255-color palette with index
/// 255 reserved for transparency.
fn paletted_frame(rgba: &RgbaImage) -> gif::Frame<'static> {
    // Train the quantizer on color data alone (alpha forced opaque) so
    // translucent regions can't starve the palette.
    let samples: Vec<u8> = rgba
        .pixels()
        .flat_map(|p| [p[0], p[1], p[2], 0xFF])
        .collect();
    let quantizer = NeuQuant::new(QUANT_SAMPLE_FAC, OPAQUE_COLORS, &samples);

    let indices: Vec<u8> = rgba
        .pixels()
        .map(|p| {
            if p[3] <= ALPHA_THRESHOLD {
                TRANSPARENT_INDEX
            } else {
                quantizer.index_of(&[p[0], p[1], p[2], 0xFF]) as u8
            }
        })
        .collect();

    let mut palette = quantizer.color_map_rgb();
    // Slot 255 holds the transparency pseudocolor.
    palette.resize(256 * 3, 0);

    let mut frame = gif::Frame::default();
    frame.width = rgba.width() as u16;
    frame.height = rgba.height() as u16;
    frame.buffer = Cow::Owned(indices);
    frame.palette = Some(palette);
    frame.transparent = Some(TRANSPARENT_INDEX);
    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_downscale_target_policy() {
        // Long edge over budget scales both axes, rounding down.
        assert_eq!(downscale_target(1000, 800, 510), Some((510, 408)));
        assert_eq!(downscale_target(800, 1000, 510), Some((408, 510)));
        // At or under budget is left alone.
        assert_eq!(downscale_target(510, 510, 510), None);
        assert_eq!(downscale_target(320, 200, 510), None);
    }

    #[test]
    fn test_downscale_target_rounds_down() {
        // 801 * (510/1000) = 408.51
        assert_eq!(downscale_target(1000, 801, 510), Some((510, 408)));
    }

    #[test]
    fn test_downscale_target_never_hits_zero() {
        assert_eq!(downscale_target(100_000, 3, 510), Some((510, 1)));
    }

    #[test]
    fn test_rotated_input_resizes_against_rotated_dimensions() {
        // EXIF orientation 6 (rotate 90 CW) turns an 800x400 input into
        // 400x800, so the downscale must target the swapped aspect.
        let mut image = DynamicImage::new_rgb8(800, 400);
        image.apply_orientation(Orientation::Rotate90);
        let fitted = fit_within(image, 510);
        assert_eq!(fitted.dimensions(), (255, 510));
    }

    #[test]
    fn test_write_gif_frame_opaque_roundtrip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out.gif");
        let image = DynamicImage::new_rgb8(10, 8);
        write_gif_frame(&image, &path).unwrap();
        assert_eq!(image::image_dimensions(&path).unwrap(), (10, 8));
    }

    #[test]
    fn test_transparent_region_maps_to_reserved_index() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out.gif");

        // Left half fully transparent, right half opaque red.
        let mut rgba = RgbaImage::new(16, 16);
        for (x, _, pixel) in rgba.enumerate_pixels_mut() {
            *pixel = if x < 8 {
                Rgba([0, 0, 0, 0])
            } else {
                Rgba([255, 0, 0, 255])
            };
        }
        write_gif_frame(&DynamicImage::ImageRgba8(rgba), &path).unwrap();

        let mut options = gif::DecodeOptions::new();
        options.set_color_output(gif::ColorOutput::Indexed);
        let mut decoder = options
            .read_info(std::fs::File::open(&path).unwrap())
            .unwrap();
        let frame = decoder.read_next_frame().unwrap().unwrap();

        assert_eq!(frame.transparent, Some(TRANSPARENT_INDEX));
        let width = frame.width as usize;
        for row in frame.buffer.chunks(width) {
            for (x, &index) in row.iter().enumerate() {
                if x < 8 {
                    assert_eq!(index, TRANSPARENT_INDEX);
                } else {
                    assert_ne!(index, TRANSPARENT_INDEX);
                }
            }
        }
    }

    #[test]
    fn test_alpha_threshold_is_midpoint_inclusive() {
        let mut rgba = RgbaImage::new(2, 1);
        rgba.put_pixel(0, 0, Rgba([10, 20, 30, ALPHA_THRESHOLD]));
        rgba.put_pixel(1, 0, Rgba([10, 20, 30, ALPHA_THRESHOLD + 1]));
        let frame = paletted_frame(&rgba);
        assert_eq!(frame.buffer[0], TRANSPARENT_INDEX);
        assert_ne!(frame.buffer[1], TRANSPARENT_INDEX);
    }
}
