//! Core types for decoded pixel data.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Bytes per RGBA8 pixel.
pub const CHANNELS: usize = 4;

/// Error types for decoding and pixel buffer validation.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The MIME type is not in the intake allow-list.
    #[error("Unsupported input type: {mime}")]
    UnsupportedInput { mime: String },

    /// The bytes could not be decoded into a pixel buffer.
    #[error("Failed to decode image: {0}")]
    LoadError(String),

    /// A dimension is zero.
    #[error("Invalid dimensions: {width}x{height} (both must be at least 1)")]
    InvalidDimension { width: u32, height: u32 },

    /// Pixel data length doesn't match the dimensions.
    #[error("Corrupted pixel buffer: expected {expected} bytes, got {actual}")]
    CorruptedBuffer { expected: usize, actual: usize },
}

/// Filter type for image resizing operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    /// Nearest neighbor interpolation (fastest, lowest quality).
    Nearest,
    /// Bilinear interpolation (fast, acceptable quality).
    #[default]
    Bilinear,
    /// Lanczos3 interpolation (slower, highest quality).
    Lanczos3,
}

impl FilterType {
    /// Convert to the image crate's FilterType.
    pub fn to_image_filter(self) -> image::imageops::FilterType {
        match self {
            FilterType::Nearest => image::imageops::FilterType::Nearest,
            FilterType::Bilinear => image::imageops::FilterType::Triangle,
            FilterType::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}

/// A decoded image with RGBA pixel data.
///
/// Alpha is kept so that regions outside a rotated source stay transparent
/// until an encoder decides how to flatten them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// RGBA pixel data in row-major order (4 bytes per pixel).
    pub pixels: Vec<u8>,
}

impl PixelBuffer {
    /// Create a new PixelBuffer with the given dimensions and pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            expected_len(width, height),
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a PixelBuffer from untrusted input, validating dimensions and length.
    pub fn try_new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, DecodeError> {
        if width == 0 || height == 0 {
            return Err(DecodeError::InvalidDimension { width, height });
        }
        let expected = expected_len(width, height);
        if pixels.len() != expected {
            return Err(DecodeError::CorruptedBuffer {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// A fully transparent buffer.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0u8; expected_len(width, height)],
        }
    }

    /// Create a PixelBuffer from an image::RgbaImage.
    pub fn from_rgba_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.into_raw(),
        }
    }

    /// Convert to an image::RgbaImage for further processing.
    ///
    /// Returns `None` when the pixel data doesn't match the dimensions.
    pub fn to_rgba_image(&self) -> Option<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    /// Drop the alpha channel, returning packed RGB bytes.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        self.pixels
            .chunks_exact(CHANNELS)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect()
    }

    /// RGBA value at (x, y). Caller guarantees the coordinates are in bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = (y as usize * self.width as usize + x as usize) * CHANNELS;
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }

    /// Get the total number of pixels.
    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Get the size of the pixel buffer in bytes.
    pub fn byte_size(&self) -> usize {
        self.pixels.len()
    }

    /// Dimensions as a `(width, height)` tuple.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Check if this is an empty/invalid image.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }

    /// Whether the pixel data length matches the dimensions.
    pub fn is_well_formed(&self) -> bool {
        self.pixels.len() == expected_len(self.width, self.height)
    }
}

/// Number of bytes an RGBA buffer of the given size must hold.
pub fn expected_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * CHANNELS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_type_conversion() {
        assert!(matches!(
            FilterType::Nearest.to_image_filter(),
            image::imageops::FilterType::Nearest
        ));
        assert!(matches!(
            FilterType::Bilinear.to_image_filter(),
            image::imageops::FilterType::Triangle
        ));
        assert!(matches!(
            FilterType::Lanczos3.to_image_filter(),
            image::imageops::FilterType::Lanczos3
        ));
    }

    #[test]
    fn test_pixel_buffer_creation() {
        let img = PixelBuffer::new(100, 50, vec![0u8; 100 * 50 * 4]);

        assert_eq!(img.width, 100);
        assert_eq!(img.height, 50);
        assert_eq!(img.pixel_count(), 5000);
        assert_eq!(img.byte_size(), 20000);
        assert!(!img.is_empty());
        assert!(img.is_well_formed());
    }

    #[test]
    fn test_pixel_buffer_empty() {
        let img = PixelBuffer::new(0, 0, vec![]);
        assert!(img.is_empty());
    }

    #[test]
    fn test_try_new_rejects_zero_dimension() {
        let err = PixelBuffer::try_new(0, 10, vec![]).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::InvalidDimension {
                width: 0,
                height: 10
            }
        ));
    }

    #[test]
    fn test_try_new_rejects_length_mismatch() {
        let err = PixelBuffer::try_new(2, 2, vec![0u8; 12]).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::CorruptedBuffer {
                expected: 16,
                actual: 12
            }
        ));
    }

    #[test]
    fn test_to_rgb_bytes_drops_alpha() {
        let img = PixelBuffer::new(2, 1, vec![1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(img.to_rgb_bytes(), vec![1, 2, 3, 5, 6, 7]);
    }

    #[test]
    fn test_pixel_accessor() {
        let img = PixelBuffer::new(2, 2, (0u8..16).collect());
        assert_eq!(img.pixel(1, 1), [12, 13, 14, 15]);
        assert_eq!(img.pixel(0, 1), [8, 9, 10, 11]);
    }

    #[test]
    fn test_rgba_image_conversion() {
        let img = PixelBuffer::new(3, 2, vec![7u8; 3 * 2 * 4]);
        let rgba = img.to_rgba_image().unwrap();
        assert_eq!(rgba.dimensions(), (3, 2));
        assert_eq!(PixelBuffer::from_rgba_image(rgba), img);
    }

    #[test]
    fn test_decode_error_display() {
        let err = DecodeError::UnsupportedInput {
            mime: "text/plain".to_string(),
        };
        assert_eq!(err.to_string(), "Unsupported input type: text/plain");

        let err = DecodeError::InvalidDimension {
            width: 0,
            height: 3,
        };
        assert_eq!(
            err.to_string(),
            "Invalid dimensions: 0x3 (both must be at least 1)"
        );
    }
}
