//! Image decoding and the two rescale paths used by image blocks.
//!
//! The original full-resolution image is decoded exactly once per block;
//! rescaling afterwards works purely on the cached `DynamicImage`. The
//! preview path trades quality for responsiveness while the pointer is
//! dragging, the commit path runs a smooth filter once the drag ends.

use egui::ColorImage;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Failure to produce a decoded original for an image block.
///
/// Construction of an image block propagates this instead of inserting a
/// broken block; the failure is never retried.
#[derive(Debug)]
pub enum ImageLoadError {
    Read { path: PathBuf, source: std::io::Error },
    Decode { detail: String },
}

impl fmt::Display for ImageLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageLoadError::Read { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
            ImageLoadError::Decode { detail } => write!(f, "failed to decode image: {detail}"),
        }
    }
}

impl std::error::Error for ImageLoadError {}

/// Reads and decodes the image at `path`.
pub fn load_original(path: &Path) -> Result<DynamicImage, ImageLoadError> {
    let bytes = fs::read(path).map_err(|err| ImageLoadError::Read {
        path: path.to_path_buf(),
        source: err,
    })?;
    decode(&bytes, ImageFormat::from_path(path).ok())
}

/// Decodes an image already held in memory (clipboard or dropped-file bytes).
pub fn load_original_from_bytes(bytes: &[u8]) -> Result<DynamicImage, ImageLoadError> {
    decode(bytes, None)
}

fn decode(
    bytes: &[u8],
    fallback_format: Option<ImageFormat>,
) -> Result<DynamicImage, ImageLoadError> {
    let format = image::guess_format(bytes)
        .ok()
        .or(fallback_format)
        .ok_or_else(|| ImageLoadError::Decode {
            detail: "unrecognized image format".to_string(),
        })?;
    image::load_from_memory_with_format(bytes, format)
        .map_err(|err| ImageLoadError::Decode {
            detail: err.to_string(),
        })
}

/// Uniform scale fitting `original` inside a `max_size` square.
///
/// Both dimensions are multiplied by `min(max_size/w, max_size/h)` and
/// truncated, so the aspect ratio is preserved and neither axis exceeds the
/// bound. Truncation to zero is bumped back to one pixel.
pub fn scaled_dimensions(original: (u32, u32), max_size: f32) -> (u32, u32) {
    let (width, height) = original;
    let scale = (max_size / width.max(1) as f32).min(max_size / height.max(1) as f32);
    (
        ((width as f32 * scale) as u32).max(1),
        ((height as f32 * scale) as u32).max(1),
    )
}

/// Fast low-fidelity rescale used every frame while the user is resizing.
pub fn rescale_preview(original: &DynamicImage, max_size: f32) -> ColorImage {
    rescale(original, max_size, FilterType::Nearest)
}

/// High-fidelity rescale committed once resizing ends.
pub fn rescale_smooth(original: &DynamicImage, max_size: f32) -> ColorImage {
    rescale(original, max_size, FilterType::CatmullRom)
}

fn rescale(original: &DynamicImage, max_size: f32, filter: FilterType) -> ColorImage {
    let (width, height) = scaled_dimensions(original.dimensions(), max_size);
    color_image_from_dynamic(&original.resize_exact(width, height, filter))
}

fn color_image_from_dynamic(image: &DynamicImage) -> ColorImage {
    let rgba = image.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    ColorImage::from_rgba_unmultiplied(size, &rgba.into_raw())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaled_dimensions_fit_bound_and_keep_ratio() {
        assert_eq!(scaled_dimensions((800, 400), 160.0), (160, 80));
        assert_eq!(scaled_dimensions((400, 800), 160.0), (80, 160));
        assert_eq!(scaled_dimensions((500, 500), 20.0), (20, 20));

        let (w, h) = scaled_dimensions((333, 217), 160.0);
        assert!(w.max(h) <= 160);
        // Ratio match within integer-truncation tolerance.
        let original_ratio = 333.0 / 217.0;
        let scaled_ratio = w as f32 / h as f32;
        assert!((original_ratio - scaled_ratio).abs() < 0.02);
    }

    #[test]
    fn scaled_dimensions_never_collapse_to_zero() {
        let (w, h) = scaled_dimensions((10_000, 10), 20.0);
        assert_eq!(w, 20);
        assert_eq!(h, 1);
    }

    #[test]
    fn preview_and_commit_agree_on_size() {
        let original = DynamicImage::new_rgba8(800, 400);
        let preview = rescale_preview(&original, 160.0);
        let committed = rescale_smooth(&original, 160.0);
        assert_eq!(preview.size, [160, 80]);
        assert_eq!(committed.size, [160, 80]);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = load_original_from_bytes(&[0u8; 16]).unwrap_err();
        assert!(matches!(err, ImageLoadError::Decode { .. }));
    }

    #[test]
    fn missing_file_reports_read_error() {
        let err = load_original(Path::new("/nonexistent/blocklink-test.png")).unwrap_err();
        assert!(matches!(err, ImageLoadError::Read { .. }));
    }
}
