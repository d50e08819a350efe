//! Image encoding WASM bindings.
//!
//! # Functions
//!
//! - [`encode`] - Encode an image as jpeg, webp, png or pdf
//! - [`format_file_name`] - Swap a file name's extension for a format's
//! - [`format_mime_type`] - MIME type of a format
//! - [`human_readable_size`] - `1536` → `"1.5 KB"`
//!
//! # Example
//!
//! ```typescript
//! import { encode, format_file_name, human_readable_size } from '@snapcrop/wasm';
//!
//! const bytes = encode(image, 'webp', 80);
//! const name = format_file_name(file.name, 'webp');
//! console.log(`${name}: ${human_readable_size(bytes.byteLength)}`);
//! ```

use crate::types::{to_js_error, JsPixelBuffer};
use snapcrop_core::encode::{self, OutputFormat, Quality};
use wasm_bindgen::prelude::*;

/// Encode an image.
///
/// # Arguments
///
/// * `image` - RGBA source image
/// * `format` - `"jpeg"` (or `"jpg"`), `"webp"`, `"png"` or `"pdf"`
/// * `quality` - 10-100 (clamped); ignored for png
///
/// # Errors
///
/// Returns an error for an unknown format, a malformed image, or a codec
/// failure.
#[wasm_bindgen]
pub fn encode(image: &JsPixelBuffer, format: &str, quality: u32) -> Result<Vec<u8>, JsValue> {
    let format: OutputFormat = format.parse().map_err(to_js_error)?;
    let src = image.to_buffer().map_err(to_js_error)?;
    encode::encode(&src, format, Quality::new(quality))
        .map(|encoded| encoded.bytes)
        .map_err(to_js_error)
}

/// `photo.png` + `"jpeg"` → `photo.jpg`.
#[wasm_bindgen]
pub fn format_file_name(original: &str, format: &str) -> Result<String, JsValue> {
    let format: OutputFormat = format.parse().map_err(to_js_error)?;
    Ok(encode::format_file_name(original, format))
}

#[wasm_bindgen]
pub fn format_mime_type(format: &str) -> Result<String, JsValue> {
    let format: OutputFormat = format.parse().map_err(to_js_error)?;
    Ok(format.mime_type().to_string())
}

/// Byte count as a short label. Negative or non-finite input reads as 0.
#[wasm_bindgen]
pub fn human_readable_size(bytes: f64) -> String {
    let bytes = if bytes.is_finite() && bytes > 0.0 {
        bytes as u64
    } else {
        0
    };
    encode::human_readable_size(bytes)
}


/// WASM-specific tests that require JsValue.
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_encode_unknown_format() {
        let img = JsPixelBuffer::new(2, 2, vec![0u8; 16]);
        assert!(encode(&img, "tiff", 80).is_err());
    }

    #[wasm_bindgen_test]
    fn test_encode_invalid_pixel_data() {
        let img = JsPixelBuffer::new(100, 100, vec![0u8; 10]);
        assert!(encode(&img, "jpeg", 80).is_err());
    }

    #[wasm_bindgen_test]
    fn test_encode_webp_lossless_fallback() {
        let img = JsPixelBuffer::new(8, 8, vec![200u8; 256]);
        let webp = encode(&img, "webp", 80).unwrap();
        assert_eq!(&webp[0..4], b"RIFF");
    }

    #[wasm_bindgen_test]
    fn test_format_file_name_unknown_format() {
        assert!(format_file_name("a.png", "gif").is_err());
    }
}
