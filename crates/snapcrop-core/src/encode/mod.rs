//! Encoding of finished rasters into deliverable bytes.
//!
//! This module provides:
//! - JPEG and WebP encoding with a quality setting
//! - Lossless PNG encoding
//! - Single-page PDF documents wrapping a JPEG raster
//! - Output file naming and size labels
//!
//! Quality is carried as a [`Quality`] percentage and handed to codecs as
//! a normalized fraction via [`EncodeSettings`].
//!
//! # Examples
//!
//! ```ignore
//! use snapcrop_core::encode::{encode, OutputFormat, Quality};
//!
//! let encoded = encode(&buffer, OutputFormat::Webp, Quality::new(75))?;
//! println!("Encoded {} bytes", encoded.byte_len());
//! ```

mod jpeg;
mod naming;
mod pdf;
mod png;
mod types;
mod webp;

pub use jpeg::encode_jpeg;
pub use naming::{format_file_name, human_readable_size};
pub use pdf::{document_layout, encode_pdf, DocumentLayout, PageOrientation};
pub use png::encode_png;
pub use types::{EncodeError, EncodeSettings, EncodedImage, OutputFormat, Quality};
pub use webp::encode_webp;

use crate::decode::PixelBuffer;

/// Encode `image` in `format` at `quality`.
pub fn encode(
    image: &PixelBuffer,
    format: OutputFormat,
    quality: Quality,
) -> Result<EncodedImage, EncodeError> {
    encode_with(image, EncodeSettings::new(format, quality))
}

/// Encode `image` with explicit per-format settings.
#[tracing::instrument(skip(image), fields(width = image.width, height = image.height))]
pub fn encode_with(
    image: &PixelBuffer,
    settings: EncodeSettings,
) -> Result<EncodedImage, EncodeError> {
    let (bytes, document) = match settings {
        EncodeSettings::Jpeg { quality } => (encode_jpeg(image, quality)?, None),
        EncodeSettings::Webp { quality } => (encode_webp(image, quality)?, None),
        EncodeSettings::Png => (encode_png(image)?, None),
        EncodeSettings::Pdf { raster_quality } => (
            encode_pdf(image, raster_quality)?,
            Some(document_layout(image.width, image.height)),
        ),
    };

    tracing::debug!(bytes = bytes.len(), "encoded");

    Ok(EncodedImage {
        format: settings.format(),
        width: image.width,
        height: image.height,
        bytes,
        document,
    })
}
