//! Rotation about the image centre onto an expanded, transparent canvas.
//!
//! The rotation uses inverse mapping: for each pixel of the output canvas we
//! find the point of the source it came from and interpolate bilinearly.
//! Angles are in degrees, positive = clockwise on screen (y axis down), the
//! same convention as a 2D canvas context.
//!
//! For a canvas pixel centre `(dx, dy)` relative to the canvas centre, the
//! inverse transform is:
//! ```text
//! src_x =  dx * cos(θ) + dy * sin(θ) + src_cx
//! src_y = -dx * sin(θ) + dy * cos(θ) + src_cy
//! ```

use crate::decode::{PixelBuffer, CHANNELS};

/// Angles closer than this to 0° (mod 360) are treated as no rotation.
const ANGLE_EPSILON: f64 = 0.001;

/// Fully transparent pixel used outside the rotated source.
pub const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

/// Map any angle into `[0, 360)`.
///
/// Non-finite input maps to 0.
pub fn normalize_rotation(angle_degrees: f64) -> f64 {
    if !angle_degrees.is_finite() {
        return 0.0;
    }
    let normalized = angle_degrees.rem_euclid(360.0);
    // rem_euclid may round up to exactly 360 for tiny negative inputs
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}

/// Whether a normalized angle is effectively zero.
pub(crate) fn is_identity_angle(normalized: f64) -> bool {
    normalized < ANGLE_EPSILON || 360.0 - normalized < ANGLE_EPSILON
}

/// Compute the dimensions of the bounding box for a rotated image.
///
/// When an image is rotated, the corners extend beyond the original bounds.
/// This function calculates the minimum bounding box that contains the
/// entire rotated image. Both axes are at least 1 for a non-empty input.
pub fn compute_rotated_bounds(width: u32, height: u32, angle_degrees: f64) -> (u32, u32) {
    let angle = normalize_rotation(angle_degrees);

    // Fast path: no rotation or half turn keeps dimensions
    if is_identity_angle(angle) || (angle - 180.0).abs() < ANGLE_EPSILON {
        return (width, height);
    }

    // Fast path: quarter turns swap dimensions
    if (angle - 90.0).abs() < ANGLE_EPSILON || (angle - 270.0).abs() < ANGLE_EPSILON {
        return (height, width);
    }

    let angle_rad = angle.to_radians();
    let cos = angle_rad.cos().abs();
    let sin = angle_rad.sin().abs();

    let w = width as f64;
    let h = height as f64;

    // new_w = |w*cos| + |h*sin|
    // new_h = |w*sin| + |h*cos|
    let new_w = (w * cos + h * sin).round() as u32;
    let new_h = (w * sin + h * cos).round() as u32;

    (new_w.max(1), new_h.max(1))
}

/// A source image painted rotated about the centre of its bounding canvas.
///
/// Nothing is rendered up front; `sample` evaluates single canvas pixels so
/// callers can extract just the region they need.
pub(crate) struct RotatedCanvas<'a> {
    image: &'a PixelBuffer,
    width: u32,
    height: u32,
    cos: f64,
    sin: f64,
    src_cx: f64,
    src_cy: f64,
    dst_cx: f64,
    dst_cy: f64,
}

impl<'a> RotatedCanvas<'a> {
    /// Build the canvas for `image` rotated by an angle already in `[0, 360)`.
    pub(crate) fn new(image: &'a PixelBuffer, normalized_angle: f64) -> Self {
        let (width, height) = compute_rotated_bounds(image.width, image.height, normalized_angle);
        let angle_rad = normalized_angle.to_radians();
        Self {
            image,
            width,
            height,
            cos: angle_rad.cos(),
            sin: angle_rad.sin(),
            src_cx: image.width as f64 / 2.0,
            src_cy: image.height as f64 / 2.0,
            dst_cx: width as f64 / 2.0,
            dst_cy: height as f64 / 2.0,
        }
    }

    pub(crate) fn width(&self) -> u32 {
        self.width
    }

    pub(crate) fn height(&self) -> u32 {
        self.height
    }

    /// RGBA value of canvas pixel `(x, y)`; transparent outside the canvas
    /// or outside the rotated source.
    pub(crate) fn sample(&self, x: i64, y: i64) -> [u8; 4] {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return TRANSPARENT;
        }

        // Pixel centre relative to the canvas centre
        let dx = x as f64 + 0.5 - self.dst_cx;
        let dy = y as f64 + 0.5 - self.dst_cy;

        let src_x = dx * self.cos + dy * self.sin + self.src_cx;
        let src_y = -dx * self.sin + dy * self.cos + self.src_cy;

        sample_bilinear(self.image, src_x, src_y)
    }

    /// Render the whole canvas.
    pub(crate) fn render(&self) -> PixelBuffer {
        let mut out = PixelBuffer::transparent(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = (y as usize * self.width as usize + x as usize) * CHANNELS;
                out.pixels[idx..idx + CHANNELS].copy_from_slice(&self.sample(x as i64, y as i64));
            }
        }
        out
    }
}

/// Rotate an image onto its full bounding canvas.
///
/// Areas of the canvas not covered by the source are transparent.
pub fn apply_rotation(image: &PixelBuffer, angle_degrees: f64) -> PixelBuffer {
    let angle = normalize_rotation(angle_degrees);
    if is_identity_angle(angle) || image.is_empty() || !image.is_well_formed() {
        return image.clone();
    }
    RotatedCanvas::new(image, angle).render()
}

/// Sample a pixel using bilinear interpolation.
///
/// `x`/`y` are continuous source coordinates where pixel `i` covers
/// `[i, i + 1)`. Points outside the source area are transparent; points
/// inside but near the border clamp to the edge pixels.
fn sample_bilinear(image: &PixelBuffer, x: f64, y: f64) -> [u8; 4] {
    let (w, h) = (image.width as f64, image.height as f64);
    if !(0.0..w).contains(&x) || !(0.0..h).contains(&y) {
        return TRANSPARENT;
    }

    // Shift to pixel-centre space
    let fx = (x - 0.5).max(0.0);
    let fy = (y - 0.5).max(0.0);

    let x0 = (fx.floor() as u32).min(image.width - 1);
    let y0 = (fy.floor() as u32).min(image.height - 1);
    let x1 = (x0 + 1).min(image.width - 1);
    let y1 = (y0 + 1).min(image.height - 1);

    // Fractional distances
    let tx = fx - x0 as f64;
    let ty = fy - y0 as f64;

    let p00 = image.pixel(x0, y0);
    let p10 = image.pixel(x1, y0);
    let p01 = image.pixel(x0, y1);
    let p11 = image.pixel(x1, y1);

    let mut result = [0u8; 4];
    for i in 0..CHANNELS {
        let v = p00[i] as f64 * (1.0 - tx) * (1.0 - ty)
            + p10[i] as f64 * tx * (1.0 - ty)
            + p01[i] as f64 * (1.0 - tx) * ty
            + p11[i] as f64 * tx * ty;
        result[i] = v.clamp(0.0, 255.0).round() as u8;
    }

    result
}
