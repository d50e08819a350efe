//! Pixel buffers, file intake and resampling.
//!
//! This module provides functionality for:
//! - The RGBA `PixelBuffer` every other stage operates on
//! - Accepting user files against a MIME allow-list and decoding them
//! - Resizing buffers and the aspect-ratio arithmetic behind the size inputs
//!
//! # Architecture
//!
//! Everything here is synchronous and allocation-only; nothing touches the
//! filesystem. Inputs arrive as `(mime, bytes)` pairs from the host page.

mod intake;
mod resize;
mod types;

pub use intake::{decode_image, is_supported_mime, load_file, SUPPORTED_MIME_TYPES};
pub use resize::{fit_within, height_for_width, resize, width_for_height};
pub use types::{expected_len, DecodeError, FilterType, PixelBuffer, CHANNELS};
