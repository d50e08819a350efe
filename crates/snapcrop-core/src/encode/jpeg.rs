//! JPEG encoding for export.
//!
//! This module provides JPEG encoding using the `image` crate's JPEG encoder.
//! JPEG has no alpha channel: transparent areas (from rotation) encode as
//! black, the same as a browser canvas does.

use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;
use std::io::Cursor;

use super::types::{validate, EncodeError, OutputFormat};
use crate::decode::PixelBuffer;

/// Encode an RGBA buffer to JPEG bytes.
///
/// # Arguments
///
/// * `image` - Source buffer; alpha is dropped
/// * `quality` - Normalized quality (0.1 to 1.0)
///
/// # Quality Guidelines
///
/// * 0.9-1.0: High quality, suitable for archival or further editing
/// * 0.8-0.9: Good quality, recommended for most uses
/// * 0.6-0.8: Medium quality, acceptable for web/social media
/// * Below 0.6: Low quality, visible artifacts
pub fn encode_jpeg(image: &PixelBuffer, quality: f32) -> Result<Vec<u8>, EncodeError> {
    validate(image)?;

    let native_quality = native_quality(quality);
    let rgb = image.to_rgb_bytes();

    // Create output buffer
    let mut buffer = Cursor::new(Vec::new());

    // Create JPEG encoder with specified quality
    let encoder = JpegEncoder::new_with_quality(&mut buffer, native_quality);

    encoder
        .write_image(&rgb, image.width, image.height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::codec(OutputFormat::Jpeg, e))?;

    Ok(buffer.into_inner())
}

/// Map a normalized quality onto the encoder's 1-100 scale.
fn native_quality(quality: f32) -> u8 {
    (quality.clamp(0.01, 1.0) * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray(width: u32, height: u32) -> PixelBuffer {
        PixelBuffer::new(width, height, vec![128u8; (width * height * 4) as usize])
    }

    /// Gradient with per-pixel noise so quality visibly changes the size.
    fn detailed(width: u32, height: u32) -> PixelBuffer {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                let noise = ((x * 7919 + y * 104729) % 61) as u8;
                pixels.extend_from_slice(&[
                    (x * 255 / width) as u8 ^ noise,
                    (y * 255 / height) as u8,
                    noise.wrapping_mul(4),
                    255,
                ]);
            }
        }
        PixelBuffer::new(width, height, pixels)
    }

    #[test]
    fn test_encode_jpeg_basic() {
        let jpeg_bytes = encode_jpeg(&gray(100, 100), 0.9).unwrap();

        // Check JPEG magic bytes (SOI marker)
        assert_eq!(&jpeg_bytes[0..2], &[0xFF, 0xD8]);

        // Check JPEG ends with EOI marker
        let len = jpeg_bytes.len();
        assert_eq!(&jpeg_bytes[len - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn test_encode_jpeg_quality_monotonic() {
        let img = detailed(96, 96);

        let low_q = encode_jpeg(&img, 0.1).unwrap();
        let high_q = encode_jpeg(&img, 0.9).unwrap();

        assert!(
            high_q.len() >= low_q.len(),
            "q=0.9 gave {} bytes, q=0.1 gave {}",
            high_q.len(),
            low_q.len()
        );
    }

    #[test]
    fn test_native_quality_mapping() {
        assert_eq!(native_quality(0.1), 10);
        assert_eq!(native_quality(0.8), 80);
        assert_eq!(native_quality(1.0), 100);
        assert_eq!(native_quality(5.0), 100);
        assert_eq!(native_quality(0.0), 1);
    }

    #[test]
    fn test_encode_jpeg_transparent_input() {
        let img = PixelBuffer::transparent(8, 8);
        let jpeg = encode_jpeg(&img, 0.8).unwrap();

        let decoded = image::load_from_memory(&jpeg).unwrap().into_rgb8();
        // Transparent pixels flatten to black
        assert!(decoded.pixels().all(|p| p.0.iter().all(|&c| c < 8)));
    }

    #[test]
    fn test_encode_jpeg_invalid_pixel_data() {
        let img = PixelBuffer {
            width: 100,
            height: 100,
            pixels: vec![128u8; 99 * 100 * 4],
        };
        let result = encode_jpeg(&img, 0.9);
        assert!(matches!(result, Err(EncodeError::InvalidPixelData { .. })));
    }

    #[test]
    fn test_encode_jpeg_zero_width() {
        let img = PixelBuffer::new(0, 100, vec![]);
        let result = encode_jpeg(&img, 0.9);
        assert!(matches!(result, Err(EncodeError::InvalidDimensions { .. })));
    }

    #[test]
    fn test_encode_jpeg_small_image() {
        let img = PixelBuffer::new(1, 1, vec![255, 0, 0, 255]);
        let jpeg_bytes = encode_jpeg(&img, 0.9).unwrap();
        assert_eq!(&jpeg_bytes[0..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_encode_jpeg_non_square() {
        assert!(encode_jpeg(&gray(200, 50), 0.9).is_ok());
        assert!(encode_jpeg(&gray(50, 200), 0.9).is_ok());
    }

    #[test]
    fn test_encode_jpeg_decodes_to_same_dimensions() {
        let jpeg = encode_jpeg(&detailed(33, 17), 0.7).unwrap();
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (33, 17));
    }
}
