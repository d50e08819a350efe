//! WASM-compatible wrapper types for image data.
//!
//! This module provides JavaScript-friendly types that wrap the core Snapcrop
//! types, handling the conversion between Rust and JavaScript data
//! representations.

use std::fmt;

use snapcrop_core::decode::{DecodeError, FilterType, PixelBuffer};
use snapcrop_core::export::{DeliveredFile, ExportSummary};
use wasm_bindgen::prelude::*;

/// An RGBA image wrapper for JavaScript.
///
/// # Memory Management
///
/// The pixel data is stored in WASM memory. When you call `pixels()`, a copy
/// is made to JavaScript memory as a `Uint8Array`; it can be handed straight
/// to `new ImageData(new Uint8ClampedArray(pixels), width, height)`.
///
/// The `free()` method can be called to explicitly release WASM memory, but
/// this is optional as wasm-bindgen's finalizer will handle cleanup.
#[wasm_bindgen]
pub struct JsPixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsPixelBuffer {
    /// Create a new JsPixelBuffer from dimensions and pixel data.
    ///
    /// # Arguments
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    /// * `pixels` - RGBA pixel data (4 bytes per pixel, row-major order)
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> JsPixelBuffer {
        JsPixelBuffer {
            width,
            height,
            pixels,
        }
    }

    /// Get the image width in pixels
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the image height in pixels
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the number of bytes in the pixel buffer (width * height * 4)
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.pixels.len()
    }

    /// Returns RGBA pixel data as Uint8Array (a copy).
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }

    /// Explicitly free WASM memory.
    pub fn free(self) {
        // Dropping self releases the memory
    }
}

impl JsPixelBuffer {
    pub(crate) fn from_buffer(buffer: PixelBuffer) -> Self {
        Self {
            width: buffer.width,
            height: buffer.height,
            pixels: buffer.pixels,
        }
    }

    /// Validate and convert to a core buffer. Clones the pixel data.
    pub(crate) fn to_buffer(&self) -> Result<PixelBuffer, DecodeError> {
        PixelBuffer::try_new(self.width, self.height, self.pixels.clone())
    }
}

/// The file produced by `JsImageStore.export_all`.
///
/// `has_file` is false when nothing was exported or the run was cancelled.
#[wasm_bindgen]
pub struct JsExportResult {
    file: Option<DeliveredFile>,
    archive: bool,
    summary: Option<ExportSummary>,
}

#[wasm_bindgen]
impl JsExportResult {
    #[wasm_bindgen(getter)]
    pub fn has_file(&self) -> bool {
        self.file.is_some()
    }

    /// Whether the file is a ZIP of several exports.
    #[wasm_bindgen(getter)]
    pub fn is_archive(&self) -> bool {
        self.archive
    }

    /// Suggested download name, empty when there is no file.
    #[wasm_bindgen(getter)]
    pub fn name(&self) -> String {
        self.file.as_ref().map(|f| f.name.clone()).unwrap_or_default()
    }

    #[wasm_bindgen(getter)]
    pub fn mime(&self) -> String {
        self.file.as_ref().map(|f| f.mime.clone()).unwrap_or_default()
    }

    /// File contents as Uint8Array (a copy).
    pub fn bytes(&self) -> Vec<u8> {
        self.file
            .as_ref()
            .map(|f| f.bytes.to_vec())
            .unwrap_or_default()
    }

    /// `{ total, exported, failed, cancelled, delivered_name, delivered_size }`,
    /// or `undefined` when only a fallback file could be delivered.
    pub fn summary(&self) -> Result<JsValue, JsValue> {
        match &self.summary {
            Some(summary) => serde_wasm_bindgen::to_value(summary).map_err(to_js_error),
            None => Ok(JsValue::UNDEFINED),
        }
    }
}

impl JsExportResult {
    pub(crate) fn new(file: Option<DeliveredFile>, archive: bool, summary: ExportSummary) -> Self {
        Self {
            file,
            archive,
            summary: Some(summary),
        }
    }

    /// A single file salvaged from a failed archive build.
    pub(crate) fn fallback(file: DeliveredFile) -> Self {
        Self {
            file: Some(file),
            archive: false,
            summary: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn summary_value(&self) -> Option<&ExportSummary> {
        self.summary.as_ref()
    }
}

/// Convert a u8 filter type value to the core FilterType enum.
///
/// Values:
/// - 0 = Nearest (fastest, lowest quality)
/// - 1 = Bilinear (good balance of speed and quality)
/// - 2 = Lanczos3 (best quality, slowest)
///
/// Any other value defaults to Bilinear.
pub(crate) fn filter_from_u8(value: u8) -> FilterType {
    match value {
        0 => FilterType::Nearest,
        2 => FilterType::Lanczos3,
        _ => FilterType::Bilinear, // Default
    }
}

/// Error to JavaScript string.
pub(crate) fn to_js_error(err: impl fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}
