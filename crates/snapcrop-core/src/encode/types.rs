//! Core types for encoding.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::pdf::DocumentLayout;
use crate::decode::{expected_len, PixelBuffer};

/// Errors that can occur during encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 4), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The codec rejected the image
    #[error("{format} encoding failed: {message}")]
    EncodingFailed {
        format: OutputFormat,
        message: String,
    },

    /// Building the PDF container failed
    #[error("Document assembly failed: {0}")]
    Document(String),

    /// Format name not recognised
    #[error("Unknown output format: {0}")]
    UnknownFormat(String),
}

impl EncodeError {
    pub(crate) fn codec(format: OutputFormat, err: impl fmt::Display) -> Self {
        EncodeError::EncodingFailed {
            format,
            message: err.to_string(),
        }
    }
}

/// The fixed set of export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossy raster, JPEG codec.
    #[default]
    Jpeg,
    /// Lossy raster, WebP codec.
    Webp,
    /// Lossless raster.
    Png,
    /// One-page document wrapping a JPEG.
    Pdf,
}

impl OutputFormat {
    /// All formats in UI order.
    pub const ALL: [OutputFormat; 4] = [
        OutputFormat::Jpeg,
        OutputFormat::Webp,
        OutputFormat::Png,
        OutputFormat::Pdf,
    ];

    /// Canonical format name.
    pub fn name(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Webp => "webp",
            OutputFormat::Png => "png",
            OutputFormat::Pdf => "pdf",
        }
    }

    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Webp => "webp",
            OutputFormat::Png => "png",
            OutputFormat::Pdf => "pdf",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Webp => "image/webp",
            OutputFormat::Png => "image/png",
            OutputFormat::Pdf => "application/pdf",
        }
    }

    /// Whether the quality setting affects the output.
    pub fn is_lossy(self) -> bool {
        match self {
            OutputFormat::Jpeg | OutputFormat::Webp | OutputFormat::Pdf => true,
            OutputFormat::Png => false,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutputFormat {
    type Err = EncodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "webp" => Ok(OutputFormat::Webp),
            "png" => Ok(OutputFormat::Png),
            "pdf" => Ok(OutputFormat::Pdf),
            _ => Err(EncodeError::UnknownFormat(s.to_string())),
        }
    }
}

/// Export quality as an integer percentage, always within `[10, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct Quality(u8);

impl Quality {
    pub const MIN: u8 = 10;
    pub const MAX: u8 = 100;

    /// Clamp any integer into the valid range.
    pub fn new(value: u32) -> Self {
        Self(value.clamp(Self::MIN as u32, Self::MAX as u32) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Codec-native fraction: `clamp(quality / 100, 0.1, 1.0)`.
    pub fn normalized(self) -> f32 {
        (self.0 as f32 / 100.0).clamp(0.1, 1.0)
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(80)
    }
}

impl From<u32> for Quality {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl From<Quality> for u32 {
    fn from(quality: Quality) -> Self {
        quality.0 as u32
    }
}

/// Per-format encoder parameters.
///
/// Fractions are normalized qualities in `[0.1, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EncodeSettings {
    Jpeg { quality: f32 },
    Webp { quality: f32 },
    Png,
    Pdf { raster_quality: f32 },
}

impl EncodeSettings {
    pub fn new(format: OutputFormat, quality: Quality) -> Self {
        let q = quality.normalized();
        match format {
            OutputFormat::Jpeg => EncodeSettings::Jpeg { quality: q },
            OutputFormat::Webp => EncodeSettings::Webp { quality: q },
            OutputFormat::Png => EncodeSettings::Png,
            OutputFormat::Pdf => EncodeSettings::Pdf { raster_quality: q },
        }
    }

    pub fn format(&self) -> OutputFormat {
        match self {
            EncodeSettings::Jpeg { .. } => OutputFormat::Jpeg,
            EncodeSettings::Webp { .. } => OutputFormat::Webp,
            EncodeSettings::Png => OutputFormat::Png,
            EncodeSettings::Pdf { .. } => OutputFormat::Pdf,
        }
    }
}

/// An encoded image ready for delivery.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub format: OutputFormat,
    /// Pixel width of the encoded raster.
    pub width: u32,
    /// Pixel height of the encoded raster.
    pub height: u32,
    pub bytes: Vec<u8>,
    /// Page layout, present for documents only.
    pub document: Option<DocumentLayout>,
}

impl EncodedImage {
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }
}

/// Reject buffers no codec can handle.
pub(crate) fn validate(image: &PixelBuffer) -> Result<(), EncodeError> {
    if image.width == 0 || image.height == 0 {
        return Err(EncodeError::InvalidDimensions {
            width: image.width,
            height: image.height,
        });
    }
    let expected = expected_len(image.width, image.height);
    if image.pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: image.pixels.len(),
        });
    }
    Ok(())
}
