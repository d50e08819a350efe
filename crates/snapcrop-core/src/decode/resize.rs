//! Resampling and aspect-ratio arithmetic.
//!
//! `resize` is a pure scale: callers decide the aspect ratio. The helpers
//! below implement the rounding rule the record store uses when the aspect
//! lock is on.

use super::{expected_len, DecodeError, FilterType, PixelBuffer};

/// Resize an image to exact dimensions.
///
/// Dimensions below 1 are clamped to 1 and logged; only a malformed source
/// buffer is an error.
///
/// # Errors
///
/// Returns `DecodeError::CorruptedBuffer` if the source pixel data doesn't
/// match its dimensions.
pub fn resize(
    image: &PixelBuffer,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<PixelBuffer, DecodeError> {
    if width == 0 || height == 0 {
        tracing::warn!(width, height, "resize requested below 1px, clamping");
    }
    let (width, height) = (width.max(1), height.max(1));

    let rgba = image
        .to_rgba_image()
        .ok_or_else(|| DecodeError::CorruptedBuffer {
            expected: expected_len(image.width, image.height),
            actual: image.pixels.len(),
        })?;

    // Fast path: if dimensions match, just clone
    if image.width == width && image.height == height {
        return Ok(image.clone());
    }

    let resized = image::imageops::resize(&rgba, width, height, filter.to_image_filter());

    Ok(PixelBuffer::from_rgba_image(resized))
}

/// Height that keeps the `original_width x original_height` ratio at `width`.
///
/// Always at least 1. A degenerate original leaves the width unchanged.
pub fn height_for_width(width: u32, original_width: u32, original_height: u32) -> u32 {
    if original_width == 0 || original_height == 0 {
        return width.max(1);
    }
    let h = (width as f64 * original_height as f64 / original_width as f64).round();
    (h as u32).max(1)
}

/// Width that keeps the `original_width x original_height` ratio at `height`.
pub fn width_for_height(height: u32, original_width: u32, original_height: u32) -> u32 {
    if original_width == 0 || original_height == 0 {
        return height.max(1);
    }
    let w = (height as f64 * original_width as f64 / original_height as f64).round();
    (w as u32).max(1)
}

/// Dimensions that fit within `max_edge` while preserving aspect ratio.
///
/// Images already inside the box keep their size.
pub fn fit_within(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }
    if width <= max_edge && height <= max_edge {
        return (width, height);
    }

    if width >= height {
        // Landscape or square: constrain by width
        (max_edge.max(1), height_for_width(max_edge, width, height))
    } else {
        // Portrait: constrain by height
        (width_for_height(max_edge, width, height), max_edge.max(1))
    }
}
