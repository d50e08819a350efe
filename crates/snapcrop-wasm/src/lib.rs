//! Snapcrop WASM - WebAssembly bindings for Snapcrop
//!
//! This crate exposes snapcrop-core to JavaScript/TypeScript applications.
//!
//! # Module Structure
//!
//! - `store` - The image store: intake, per-image edits, batch export
//! - `types` - WASM-compatible wrapper types for pixel data and export results
//! - `decode` - Decoding and resizing
//! - `transform` - Rotation and crop
//! - `encode` - Encoding to jpeg, webp, png and pdf
//! - `logging` - Console logging setup
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsImageStore } from '@snapcrop/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const store = new JsImageStore();
//! const id = store.add_file(file.name, file.type, new Uint8Array(await file.arrayBuffer()));
//! if (id !== undefined) store.set_format(id, 'webp');
//! const result = store.export_all();
//! ```

use wasm_bindgen::prelude::*;

mod decode;
mod encode;
mod logging;
mod store;
mod transform;
mod types;

pub use decode::{decode_image, is_supported_mime, resize, resize_to_fit};
pub use encode::{encode, format_file_name, format_mime_type, human_readable_size};
pub use logging::init_logging;
pub use store::JsImageStore;
pub use transform::{crop_to_bounding_box, rotate_full_frame, rotated_bounds};
pub use types::{JsExportResult, JsPixelBuffer};

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    logging::init_logging(false);
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
