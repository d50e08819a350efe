//! Crop extraction from a rotated canvas.
//!
//! The crop rectangle is expressed in pixels of the *rotated* canvas: the
//! bounding box of the source turned about its centre. This matches what a
//! crop selection UI reports after the user rotates the preview.
//!
//! # Coordinate System
//!
//! - Origin is the top-left corner of the rotated canvas
//! - `x`/`y` may be negative and the rectangle may extend past the canvas;
//!   uncovered pixels are transparent
//! - The output is always exactly `width x height`

use serde::{Deserialize, Serialize};

use super::rotation::{is_identity_angle, normalize_rotation, RotatedCanvas};
use super::compute_rotated_bounds;
use crate::decode::{PixelBuffer, CHANNELS};

/// A crop region in rotated-canvas pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRect {
    /// Left edge (may be negative).
    pub x: i64,
    /// Top edge (may be negative).
    pub y: i64,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
}

impl CropRect {
    pub fn new(x: i64, y: i64, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The rectangle covering a whole `width x height` canvas.
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Round fractional selection coordinates (as reported by pointer UIs)
    /// to whole pixels.
    pub fn from_fractional(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x: x.round() as i64,
            y: y.round() as i64,
            width: width.round().max(0.0) as u32,
            height: height.round().max(0.0) as u32,
        }
    }

    /// Number of pixels covered.
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Rotate `image` onto its bounding canvas and extract `rect` from it.
///
/// `rect = None` means the whole rotated canvas. The rotation is normalized to
/// `[0, 360)` first; positive angles turn clockwise. The source is never
/// modified.
///
/// # Returns
///
/// A new `PixelBuffer` of exactly `rect.width x rect.height` (or the rotated
/// bounds when `rect` is `None`). Pixels outside the rotated source are
/// transparent.
pub fn crop_to_bounding_box(
    image: &PixelBuffer,
    rect: Option<CropRect>,
    rotation_degrees: f64,
) -> PixelBuffer {
    let angle = normalize_rotation(rotation_degrees);

    if image.is_empty() || !image.is_well_formed() {
        tracing::warn!(
            width = image.width,
            height = image.height,
            "crop source is empty or malformed, producing transparent output"
        );
        let rect = rect.unwrap_or_else(|| CropRect::full(0, 0));
        return PixelBuffer::transparent(rect.width, rect.height);
    }

    if is_identity_angle(angle) {
        return match rect {
            None => image.clone(),
            Some(rect) => copy_region(image, rect),
        };
    }

    let canvas = RotatedCanvas::new(image, angle);
    let rect = match rect {
        None => return canvas.render(),
        Some(rect) => rect,
    };

    let mut output = PixelBuffer::transparent(rect.width, rect.height);
    for oy in 0..rect.height {
        let cy = rect.y + oy as i64;
        if cy < 0 || cy >= canvas.height() as i64 {
            continue;
        }
        let row_start = oy as usize * rect.width as usize * CHANNELS;
        for ox in 0..rect.width {
            let idx = row_start + ox as usize * CHANNELS;
            let px = canvas.sample(rect.x + ox as i64, cy);
            output.pixels[idx..idx + CHANNELS].copy_from_slice(&px);
        }
    }

    output
}

/// Dimensions `crop_to_bounding_box` will produce, without doing the work.
pub fn cropped_dimensions(
    width: u32,
    height: u32,
    rect: Option<CropRect>,
    rotation_degrees: f64,
) -> (u32, u32) {
    match rect {
        Some(rect) => (rect.width, rect.height),
        None => compute_rotated_bounds(width, height, rotation_degrees),
    }
}

/// Unrotated crop: plain row copies, transparent outside the source.
fn copy_region(image: &PixelBuffer, rect: CropRect) -> PixelBuffer {
    if rect.x == 0 && rect.y == 0 && rect.width == image.width && rect.height == image.height {
        return image.clone();
    }

    let mut output = PixelBuffer::transparent(rect.width, rect.height);

    // Intersection of the rectangle with the source, in output coordinates
    let src_w = image.width as i64;
    let src_h = image.height as i64;
    let x_start = (-rect.x).clamp(0, rect.width as i64);
    let x_end = (src_w - rect.x).clamp(0, rect.width as i64);
    if x_start >= x_end {
        return output;
    }
    let span = (x_end - x_start) as usize * CHANNELS;

    for oy in 0..rect.height as i64 {
        let sy = rect.y + oy;
        if sy < 0 || sy >= src_h {
            continue;
        }
        let sx = rect.x + x_start;
        let src_idx = (sy as usize * image.width as usize + sx as usize) * CHANNELS;
        let dst_idx = (oy as usize * rect.width as usize + x_start as usize) * CHANNELS;
        output.pixels[dst_idx..dst_idx + span]
            .copy_from_slice(&image.pixels[src_idx..src_idx + span]);
    }

    output
}


// ============================================================================
// Property-Based Tests
// ============================================================================
