//! Image decoding and resizing WASM bindings.
//!
//! # Functions
//!
//! - [`is_supported_mime`] - Check a MIME type against the intake allow-list
//! - [`decode_image`] - Decode any supported image to RGBA
//! - [`resize`] - Resize an image to exact dimensions
//! - [`resize_to_fit`] - Resize to fit within a max edge, preserving aspect ratio
//!
//! # Example
//!
//! ```typescript
//! import { is_supported_mime, decode_image, resize_to_fit } from '@snapcrop/wasm';
//!
//! if (is_supported_mime(file.type)) {
//!   const image = decode_image(new Uint8Array(await file.arrayBuffer()));
//!   const preview = resize_to_fit(image, 1024, 1);
//! }
//! ```

use crate::types::{filter_from_u8, to_js_error, JsPixelBuffer};
use snapcrop_core::decode;
use wasm_bindgen::prelude::*;

/// Whether the store would accept a file of this MIME type.
#[wasm_bindgen]
pub fn is_supported_mime(mime: &str) -> bool {
    decode::is_supported_mime(mime)
}

/// Decode image bytes (JPEG, PNG, WebP, GIF, BMP) to RGBA.
///
/// The format is sniffed from the bytes.
///
/// # Errors
///
/// Returns an error if the bytes are not a decodable image.
#[wasm_bindgen]
pub fn decode_image(bytes: &[u8]) -> Result<JsPixelBuffer, JsValue> {
    decode::decode_image(bytes)
        .map(JsPixelBuffer::from_buffer)
        .map_err(to_js_error)
}

/// Resize an image to exact dimensions.
///
/// # Arguments
///
/// * `image` - The source image
/// * `width` - Target width in pixels (0 is clamped to 1)
/// * `height` - Target height in pixels (0 is clamped to 1)
/// * `filter` - Resize filter: 0 = Nearest, 1 = Bilinear, 2 = Lanczos3
///
/// # Errors
///
/// Returns an error if the source pixel data doesn't match its dimensions.
#[wasm_bindgen]
pub fn resize(
    image: &JsPixelBuffer,
    width: u32,
    height: u32,
    filter: u8,
) -> Result<JsPixelBuffer, JsValue> {
    let src = image.to_buffer().map_err(to_js_error)?;
    decode::resize(&src, width, height, filter_from_u8(filter))
        .map(JsPixelBuffer::from_buffer)
        .map_err(to_js_error)
}

/// Resize an image so its longest edge is at most `max_edge`.
///
/// Images already small enough are returned at their size.
#[wasm_bindgen]
pub fn resize_to_fit(
    image: &JsPixelBuffer,
    max_edge: u32,
    filter: u8,
) -> Result<JsPixelBuffer, JsValue> {
    let (width, height) = decode::fit_within(image.width(), image.height(), max_edge);
    resize(image, width, height, filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbaImage};
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, image::Rgba([1, 2, 3, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_is_supported_mime() {
        assert!(is_supported_mime("image/png"));
        assert!(is_supported_mime("IMAGE/JPEG"));
        assert!(!is_supported_mime("image/tiff"));
        assert!(!is_supported_mime("application/pdf"));
    }

    #[test]
    fn test_decode_image_png() {
        let img = decode_image(&png(6, 4)).unwrap();
        assert_eq!(img.width(), 6);
        assert_eq!(img.height(), 4);
        assert_eq!(img.byte_length(), 6 * 4 * 4);
    }

    #[test]
    fn test_resize_exact() {
        let img = JsPixelBuffer::new(10, 10, vec![128u8; 400]);
        let out = resize(&img, 5, 3, 1).unwrap();
        assert_eq!((out.width(), out.height()), (5, 3));
    }

    #[test]
    fn test_resize_to_fit_landscape() {
        let img = JsPixelBuffer::new(200, 100, vec![0u8; 200 * 100 * 4]);
        let out = resize_to_fit(&img, 50, 0).unwrap();
        assert_eq!((out.width(), out.height()), (50, 25));
    }

    #[test]
    fn test_resize_to_fit_small_image_unchanged() {
        let img = JsPixelBuffer::new(20, 10, vec![0u8; 800]);
        let out = resize_to_fit(&img, 100, 2).unwrap();
        assert_eq!((out.width(), out.height()), (20, 10));
    }
}
