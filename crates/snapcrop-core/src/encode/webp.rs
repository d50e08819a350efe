//! WebP encoding.
//!
//! Native builds use libwebp through the `webp` crate, which honours the
//! quality setting. libwebp does not build for `wasm32`, so browser builds
//! fall back to the pure-Rust lossless encoder from `image` and ignore
//! quality.

use super::types::{validate, EncodeError, OutputFormat};
use crate::decode::PixelBuffer;

/// Encode an RGBA buffer to lossy WebP at a normalized quality (0.1 to 1.0).
#[cfg(not(target_arch = "wasm32"))]
pub fn encode_webp(image: &PixelBuffer, quality: f32) -> Result<Vec<u8>, EncodeError> {
    validate(image)?;

    let encoder = webp::Encoder::from_rgba(&image.pixels, image.width, image.height);
    let memory = encoder
        .encode_simple(false, quality.clamp(0.0, 1.0) * 100.0)
        .map_err(|e| EncodeError::codec(OutputFormat::Webp, format!("{e:?}")))?;

    Ok(memory.to_vec())
}

#[cfg(target_arch = "wasm32")]
pub fn encode_webp(image: &PixelBuffer, quality: f32) -> Result<Vec<u8>, EncodeError> {
    use image::codecs::webp::WebPEncoder;
    use image::{ExtendedColorType, ImageEncoder};

    validate(image)?;
    tracing::debug!(quality, "lossy WebP unavailable, encoding lossless");

    let mut buffer = std::io::Cursor::new(Vec::new());
    WebPEncoder::new_lossless(&mut buffer)
        .write_image(
            &image.pixels,
            image.width,
            image.height,
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| EncodeError::codec(OutputFormat::Webp, e))?;

    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(width: u32, height: u32) -> PixelBuffer {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                let v = if (x / 4 + y / 4) % 2 == 0 { 230 } else { 20 };
                pixels.extend_from_slice(&[v, 255 - v, (x * 3) as u8, 255]);
            }
        }
        PixelBuffer::new(width, height, pixels)
    }

    #[test]
    fn test_encode_webp_riff_container() {
        let webp = encode_webp(&checker(32, 24), 0.8).unwrap();
        assert_eq!(&webp[0..4], b"RIFF");
        assert_eq!(&webp[8..12], b"WEBP");
    }

    #[test]
    fn test_encode_webp_decodes_to_same_dimensions() {
        let webp = encode_webp(&checker(40, 10), 0.5).unwrap();
        let decoded = image::load_from_memory(&webp).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (40, 10));
    }

    /// Lossy encode only exists on native targets.
    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_encode_webp_quality_monotonic() {
        let mut pixels = Vec::with_capacity(96 * 96 * 4);
        for y in 0..96u32 {
            for x in 0..96u32 {
                let noise = ((x * 7919 + y * 104729) % 61) as u8;
                pixels.extend_from_slice(&[
                    (x * 255 / 96) as u8 ^ noise,
                    (y * 255 / 96) as u8,
                    noise.wrapping_mul(4),
                    255,
                ]);
            }
        }
        let img = PixelBuffer::new(96, 96, pixels);

        let low_q = encode_webp(&img, 0.1).unwrap();
        let high_q = encode_webp(&img, 0.9).unwrap();

        assert!(
            high_q.len() >= low_q.len(),
            "q=0.9 gave {} bytes, q=0.1 gave {}",
            high_q.len(),
            low_q.len()
        );
    }

    #[test]
    fn test_encode_webp_rejects_malformed() {
        let img = PixelBuffer {
            width: 4,
            height: 4,
            pixels: vec![0; 10],
        };
        assert!(matches!(
            encode_webp(&img, 0.8),
            Err(EncodeError::InvalidPixelData { .. })
        ));
    }
}
