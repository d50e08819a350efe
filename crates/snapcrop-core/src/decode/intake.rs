//! File intake: MIME allow-list and decoding to RGBA.

use std::io::Cursor;

use image::ImageReader;

use super::{DecodeError, PixelBuffer};

/// MIME types accepted at intake. Everything else is dropped.
pub const SUPPORTED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/webp",
    "image/gif",
    "image/bmp",
];

/// Check whether a MIME type is in the intake allow-list.
///
/// Parameters such as `; charset=...` are ignored and the comparison is
/// case-insensitive.
pub fn is_supported_mime(mime: &str) -> bool {
    let essence = mime.split(';').next().unwrap_or_default().trim();
    SUPPORTED_MIME_TYPES
        .iter()
        .any(|supported| supported.eq_ignore_ascii_case(essence))
}

/// Decode encoded image bytes into an RGBA pixel buffer.
///
/// The container format is sniffed from the bytes, not from the MIME type.
///
/// # Errors
///
/// Returns `DecodeError::LoadError` if the bytes are not a decodable image.
pub fn decode_image(bytes: &[u8]) -> Result<PixelBuffer, DecodeError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::LoadError(e.to_string()))?;

    let img = reader
        .decode()
        .map_err(|e| DecodeError::LoadError(e.to_string()))?;

    let buffer = PixelBuffer::from_rgba_image(img.into_rgba8());
    if buffer.is_empty() {
        return Err(DecodeError::LoadError("image has no pixels".to_string()));
    }
    Ok(buffer)
}

/// Validate the MIME type, then decode.
pub fn load_file(mime: &str, bytes: &[u8]) -> Result<PixelBuffer, DecodeError> {
    if !is_supported_mime(mime) {
        return Err(DecodeError::UnsupportedInput {
            mime: mime.to_string(),
        });
    }
    decode_image(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbaImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_supported_mime_types() {
        assert!(is_supported_mime("image/jpeg"));
        assert!(is_supported_mime("image/png"));
        assert!(is_supported_mime("IMAGE/WEBP"));
        assert!(is_supported_mime("image/png; charset=binary"));
    }

    #[test]
    fn test_unsupported_mime_types() {
        assert!(!is_supported_mime("image/svg+xml"));
        assert!(!is_supported_mime("application/pdf"));
        assert!(!is_supported_mime("text/plain"));
        assert!(!is_supported_mime(""));
    }

    #[test]
    fn test_decode_png() {
        let img = decode_image(&png_bytes(7, 3)).unwrap();
        assert_eq!(img.dimensions(), (7, 3));
        assert_eq!(img.pixel(0, 0), [10, 20, 30, 255]);
    }

    #[test]
    fn test_decode_garbage_fails() {
        let result = decode_image(&[0x00, 0x01, 0x02, 0x03]);
        assert!(matches!(result, Err(DecodeError::LoadError(_))));
    }

    #[test]
    fn test_decode_empty_fails() {
        assert!(matches!(decode_image(&[]), Err(DecodeError::LoadError(_))));
    }

    #[test]
    fn test_load_file_rejects_mime_before_decoding() {
        let result = load_file("text/plain", &png_bytes(2, 2));
        assert!(matches!(
            result,
            Err(DecodeError::UnsupportedInput { mime }) if mime == "text/plain"
        ));
    }

    #[test]
    fn test_load_file_sniffs_content() {
        // Declared as JPEG but actually PNG: content wins.
        let img = load_file("image/jpeg", &png_bytes(4, 5)).unwrap();
        assert_eq!(img.dimensions(), (4, 5));
    }
}
