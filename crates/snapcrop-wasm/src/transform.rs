//! WASM bindings for rotation and crop.
//!
//! Crop rectangles are in pixels of the rotated canvas, the same space the
//! crop UI draws its selection in. Angles are degrees, positive = clockwise.

use crate::types::{to_js_error, JsPixelBuffer};
use snapcrop_core::transform::{self, CropRect};
use wasm_bindgen::prelude::*;

/// Bounding box of an image rotated about its centre, as `[width, height]`.
#[wasm_bindgen]
pub fn rotated_bounds(width: u32, height: u32, rotation_degrees: f64) -> Vec<u32> {
    let (w, h) = transform::compute_rotated_bounds(width, height, rotation_degrees);
    vec![w, h]
}

/// Rotate `image` and cut out a rectangle of the rotated canvas.
///
/// Fractional coordinates from pointer events are rounded to whole pixels.
/// Areas outside the rotated source come back transparent.
///
/// # Example (TypeScript)
///
/// ```typescript
/// const [cw, ch] = rotated_bounds(image.width, image.height, 15);
/// const cropped = crop_to_bounding_box(image, cw / 4, ch / 4, cw / 2, ch / 2, 15);
/// ```
#[wasm_bindgen]
pub fn crop_to_bounding_box(
    image: &JsPixelBuffer,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    rotation_degrees: f64,
) -> Result<JsPixelBuffer, JsValue> {
    let src = image.to_buffer().map_err(to_js_error)?;
    let rect = CropRect::from_fractional(x, y, width, height);
    Ok(JsPixelBuffer::from_buffer(transform::crop_to_bounding_box(
        &src,
        Some(rect),
        rotation_degrees,
    )))
}

/// Rotate `image` onto its full bounding canvas.
#[wasm_bindgen]
pub fn rotate_full_frame(
    image: &JsPixelBuffer,
    rotation_degrees: f64,
) -> Result<JsPixelBuffer, JsValue> {
    let src = image.to_buffer().map_err(to_js_error)?;
    Ok(JsPixelBuffer::from_buffer(transform::crop_to_bounding_box(
        &src,
        None,
        rotation_degrees,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Create a simple test image.
    fn test_image(width: u32, height: u32) -> JsPixelBuffer {
        let pixels: Vec<u8> = (0..(width * height * 4) as usize)
            .map(|i| if i % 4 == 3 { 255 } else { (i % 256) as u8 })
            .collect();
        JsPixelBuffer::new(width, height, pixels)
    }

    #[test]
    fn test_rotated_bounds() {
        assert_eq!(rotated_bounds(100, 50, 0.0), vec![100, 50]);
        assert_eq!(rotated_bounds(100, 50, 90.0), vec![50, 100]);
        assert_eq!(rotated_bounds(100, 50, -90.0), vec![50, 100]);
        assert_eq!(rotated_bounds(100, 100, 45.0), vec![141, 141]);
    }

    #[test]
    fn test_rotate_full_frame_90_degrees() {
        let img = test_image(100, 50);
        let result = rotate_full_frame(&img, 90.0).unwrap();
        // 90-degree rotation swaps dimensions
        assert_eq!(result.width(), 50);
        assert_eq!(result.height(), 100);
    }

    #[test]
    fn test_rotate_full_frame_no_change() {
        let img = test_image(30, 20);
        let result = rotate_full_frame(&img, 360.0).unwrap();
        assert_eq!(result.pixels(), img.pixels());
    }

    #[test]
    fn test_crop_exact_dimensions() {
        let img = test_image(100, 100);
        let result = crop_to_bounding_box(&img, 10.0, 20.0, 30.0, 40.0, 0.0).unwrap();
        assert_eq!(result.width(), 30);
        assert_eq!(result.height(), 40);
    }

    #[test]
    fn test_crop_rounds_fractional_rect() {
        let img = test_image(100, 100);
        let result = crop_to_bounding_box(&img, 0.4, 0.6, 49.6, 50.4, 12.5).unwrap();
        assert_eq!(result.width(), 50);
        assert_eq!(result.height(), 50);
    }

    #[test]
    fn test_crop_outside_canvas_is_transparent() {
        let img = test_image(10, 10);
        let result = crop_to_bounding_box(&img, 50.0, 50.0, 4.0, 4.0, 0.0).unwrap();
        assert!(result.pixels().iter().all(|&b| b == 0));
    }
}

/// WASM-specific tests that require JsValue.
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_crop_malformed_source() {
        let img = JsPixelBuffer::new(10, 10, vec![0u8; 3]);
        assert!(crop_to_bounding_box(&img, 0.0, 0.0, 5.0, 5.0, 0.0).is_err());
        assert!(rotate_full_frame(&img, 30.0).is_err());
    }
}
