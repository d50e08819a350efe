//! Snapcrop Core - Image crop, resize and export library
//!
//! This crate provides the core functionality for Snapcrop: decoding
//! uploaded images, rotating and cropping them, resizing to a target size,
//! encoding to JPEG/WebP/PNG/PDF, and exporting a whole batch as a single
//! file or a ZIP archive.
//!
//! Everything here is synchronous and single-threaded so it runs unchanged
//! inside a browser worker via the `snapcrop-wasm` bindings.

pub mod config;
pub mod decode;
pub mod encode;
pub mod export;
pub mod store;
pub mod transform;

pub use config::{ConfigError, ExportConfig};
pub use decode::{resize, DecodeError, FilterType, PixelBuffer};
pub use encode::{
    encode, format_file_name, human_readable_size, EncodeError, EncodedImage, OutputFormat,
    Quality,
};
pub use export::{
    CancelToken, Delivery, DeliveredFile, ExportError, ExportOutcome, ExportRun, ExportSummary,
    ProgressSink, StatusLine,
};
pub use store::{ImageId, ImageRecord, ImageStore, IntakeOutcome, RejectReason, StoreError};
pub use transform::{compute_rotated_bounds, crop_to_bounding_box, CropRect};

#[cfg(test)]
mod tests {
    use super::*;

    /// Load, crop with a rotation, resize, then export: the path a user
    /// takes through the UI.
    #[test]
    fn test_end_to_end_single_export() {
        let source = image::RgbaImage::from_fn(60, 40, |x, y| {
            image::Rgba([(x * 4) as u8, (y * 6) as u8, 120, 255])
        });
        let mut png = std::io::Cursor::new(Vec::new());
        source
            .write_to(&mut png, image::ImageFormat::Png)
            .unwrap();

        let mut store = ImageStore::default();
        let id = store
            .add_file("holiday.png", "image/png", png.into_inner())
            .accepted()
            .unwrap();

        store.set_crop_rotation(id, 90.0).unwrap();
        store
            .set_crop_rect(id, Some(CropRect::new(0, 10, 40, 40)))
            .unwrap();
        assert!(store.apply_crop(id).unwrap());
        assert_eq!(store.record(id).unwrap().target_dimensions(), (40, 40));

        store.set_keep_aspect_ratio(id, false).unwrap();
        store.set_width(id, 20).unwrap();
        store.set_height(id, 20).unwrap();
        store.set_format(id, OutputFormat::Webp).unwrap();

        let mut status = StatusLine::new();
        let outcome = ExportRun::new(ExportConfig::default(), &mut status, 42)
            .run(&mut store)
            .unwrap();

        let Delivery::Single(file) = outcome.delivery else {
            panic!("expected a single file");
        };
        assert_eq!(file.name, "holiday.webp");
        let decoded = image::load_from_memory(&file.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (20, 20));
        assert_eq!(status.current(), None);
    }
}
