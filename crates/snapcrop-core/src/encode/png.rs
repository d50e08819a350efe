//! Lossless PNG encoding. Alpha is preserved.

use std::io::Cursor;

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

use super::types::{validate, EncodeError, OutputFormat};
use crate::decode::PixelBuffer;

pub fn encode_png(image: &PixelBuffer) -> Result<Vec<u8>, EncodeError> {
    validate(image)?;

    let mut buffer = Cursor::new(Vec::new());
    PngEncoder::new(&mut buffer)
        .write_image(
            &image.pixels,
            image.width,
            image.height,
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| EncodeError::codec(OutputFormat::Png, e))?;

    Ok(buffer.into_inner())
}
