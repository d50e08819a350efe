//! The image store exposed to JavaScript.
//!
//! Record ids cross the boundary as plain numbers. Every edit goes through
//! the store so that stale export results are dropped consistently.
//!
//! # Example
//!
//! ```typescript
//! const store = JsImageStore.with_config({ default_format: 'webp', default_quality: 75 });
//! for (const file of input.files) {
//!   store.add_file(file.name, file.type, new Uint8Array(await file.arrayBuffer()));
//! }
//! const id = store.selected;
//! store.set_width(id, 1200);
//! const result = store.export_all((status) => { label.textContent = status ?? ''; });
//! if (result.has_file) download(result.name, result.mime, result.bytes());
//! ```

use serde::Serialize;
use snapcrop_core::config::ExportConfig;
use snapcrop_core::encode::{format_file_name, OutputFormat, Quality};
use snapcrop_core::export::{
    CancelToken, Delivery, ExportError, ExportRun, ProgressSink,
};
use snapcrop_core::store::{AspectRatio, CropSession, ImageId, ImageRecord, ImageStore};
use snapcrop_core::transform::CropRect;
use wasm_bindgen::prelude::*;

use crate::types::{to_js_error, JsExportResult, JsPixelBuffer};

/// Plain-object view of a record for rendering.
#[derive(Debug, Serialize)]
struct RecordView<'a> {
    id: u64,
    name: &'a str,
    mime: &'a str,
    original_width: u32,
    original_height: u32,
    working_width: u32,
    working_height: u32,
    width: u32,
    height: u32,
    keep_aspect_ratio: bool,
    format: OutputFormat,
    quality: u8,
    output_name: String,
    crop: &'a CropSession,
    export_size: Option<usize>,
}

impl<'a> RecordView<'a> {
    fn new(record: &'a ImageRecord) -> Self {
        let (original_width, original_height) = record.original_dimensions();
        let (working_width, working_height) = record.working().dimensions();
        let (width, height) = record.target_dimensions();
        Self {
            id: record.id().value(),
            name: record.name(),
            mime: record.mime(),
            original_width,
            original_height,
            working_width,
            working_height,
            width,
            height,
            keep_aspect_ratio: record.keep_aspect_ratio(),
            format: record.format(),
            quality: record.quality().value(),
            output_name: format_file_name(record.name(), record.format()),
            crop: record.crop(),
            export_size: record.export_result().map(|r| r.size),
        }
    }
}

/// Ordered collection of loaded images with one selection.
#[wasm_bindgen]
pub struct JsImageStore {
    inner: ImageStore,
}

impl Default for JsImageStore {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl JsImageStore {
    #[wasm_bindgen(constructor)]
    pub fn new() -> JsImageStore {
        JsImageStore {
            inner: ImageStore::default(),
        }
    }

    /// Create a store from a partial `ExportConfig` object.
    ///
    /// # Errors
    ///
    /// Returns an error if the object has the wrong shape or fails
    /// validation (quality outside 10-100, bad archive prefix).
    pub fn with_config(config: JsValue) -> Result<JsImageStore, JsValue> {
        let config: ExportConfig = if config.is_undefined() || config.is_null() {
            ExportConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(to_js_error)?
        };
        Self::from_config(config).map_err(to_js_error)
    }

    /// Add a file. Returns its id, or `undefined` if it was not accepted
    /// (unsupported type or undecodable bytes).
    pub fn add_file(&mut self, name: &str, mime: &str, bytes: Vec<u8>) -> Option<f64> {
        self.inner
            .add_file(name, mime, bytes)
            .accepted()
            .map(|id| id.value() as f64)
    }

    #[wasm_bindgen(getter)]
    pub fn length(&self) -> usize {
        self.inner.len()
    }

    /// Record ids in display order.
    pub fn ids(&self) -> Vec<f64> {
        self.inner.iter().map(|r| r.id().value() as f64).collect()
    }

    #[wasm_bindgen(getter)]
    pub fn selected(&self) -> Option<f64> {
        self.inner.selected().map(|id| id.value() as f64)
    }

    pub fn select(&mut self, id: f64) -> Result<(), JsValue> {
        let id = self.id(id)?;
        self.inner.select(id).map_err(to_js_error)
    }

    pub fn remove(&mut self, id: f64) -> Result<(), JsValue> {
        let id = self.id(id)?;
        self.inner.remove(id).map_err(to_js_error)
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// A plain object describing the record.
    pub fn record(&self, id: f64) -> Result<JsValue, JsValue> {
        let record = self.inner.record(self.id(id)?).map_err(to_js_error)?;
        serde_wasm_bindgen::to_value(&RecordView::new(record)).map_err(to_js_error)
    }

    /// The current working buffer, for drawing the crop preview.
    pub fn working_image(&self, id: f64) -> Result<JsPixelBuffer, JsValue> {
        let record = self.inner.record(self.id(id)?).map_err(to_js_error)?;
        Ok(JsPixelBuffer::from_buffer(record.working().clone()))
    }

    /// Set the target width. Returns the resulting `[width, height]`.
    pub fn set_width(&mut self, id: f64, width: u32) -> Result<Vec<u32>, JsValue> {
        let id = self.id(id)?;
        let (w, h) = self.inner.set_width(id, width).map_err(to_js_error)?;
        Ok(vec![w, h])
    }

    /// Set the target height. Returns the resulting `[width, height]`.
    pub fn set_height(&mut self, id: f64, height: u32) -> Result<Vec<u32>, JsValue> {
        let id = self.id(id)?;
        let (w, h) = self.inner.set_height(id, height).map_err(to_js_error)?;
        Ok(vec![w, h])
    }

    pub fn set_keep_aspect_ratio(&mut self, id: f64, keep: bool) -> Result<(), JsValue> {
        let id = self.id(id)?;
        self.inner
            .set_keep_aspect_ratio(id, keep)
            .map_err(to_js_error)
    }

    pub fn set_format(&mut self, id: f64, format: &str) -> Result<(), JsValue> {
        let id = self.id(id)?;
        let format: OutputFormat = format.parse().map_err(to_js_error)?;
        self.inner.set_format(id, format).map_err(to_js_error)
    }

    /// Quality is clamped to 10-100.
    pub fn set_quality(&mut self, id: f64, quality: u32) -> Result<(), JsValue> {
        let id = self.id(id)?;
        self.inner
            .set_quality(id, Quality::new(quality))
            .map_err(to_js_error)
    }

    pub fn set_crop_offset(&mut self, id: f64, x: f64, y: f64) -> Result<(), JsValue> {
        let id = self.id(id)?;
        self.inner.set_crop_offset(id, x, y).map_err(to_js_error)
    }

    pub fn set_crop_zoom(&mut self, id: f64, zoom: f64) -> Result<(), JsValue> {
        let id = self.id(id)?;
        self.inner.set_crop_zoom(id, zoom).map_err(to_js_error)
    }

    pub fn set_crop_rotation(&mut self, id: f64, degrees: f64) -> Result<(), JsValue> {
        let id = self.id(id)?;
        self.inner.set_crop_rotation(id, degrees).map_err(to_js_error)
    }

    /// Lock the crop selection to `width:height`, or unlock when either is
    /// missing.
    pub fn set_crop_aspect(
        &mut self,
        id: f64,
        width: Option<u32>,
        height: Option<u32>,
    ) -> Result<(), JsValue> {
        let id = self.id(id)?;
        let aspect = width.zip(height).map(|(w, h)| AspectRatio::new(w, h));
        self.inner.set_crop_aspect(id, aspect).map_err(to_js_error)
    }

    /// The selection in rotated-canvas pixels; fractions are rounded.
    pub fn set_crop_rect(
        &mut self,
        id: f64,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<(), JsValue> {
        let id = self.id(id)?;
        let rect = CropRect::from_fractional(x, y, width, height);
        self.inner.set_crop_rect(id, Some(rect)).map_err(to_js_error)
    }

    pub fn clear_crop_rect(&mut self, id: f64) -> Result<(), JsValue> {
        let id = self.id(id)?;
        self.inner.set_crop_rect(id, None).map_err(to_js_error)
    }

    /// Commit the pending crop. Returns whether anything changed.
    pub fn apply_crop(&mut self, id: f64) -> Result<bool, JsValue> {
        let id = self.id(id)?;
        self.inner.apply_crop(id).map_err(to_js_error)
    }

    pub fn cancel_crop(&mut self, id: f64) -> Result<(), JsValue> {
        let id = self.id(id)?;
        self.inner.cancel_crop(id).map_err(to_js_error)
    }

    pub fn reset(&mut self, id: f64) -> Result<(), JsValue> {
        let id = self.id(id)?;
        self.inner.reset(id).map_err(to_js_error)
    }

    /// Total bytes of the latest export results.
    pub fn total_export_size(&self) -> f64 {
        self.inner.total_export_size() as f64
    }

    pub fn live_output_handles(&self) -> usize {
        self.inner.live_output_handles()
    }

    /// Export every record.
    ///
    /// `progress` is called with a status string per record and with `null`
    /// at the end. Returning `false` from it cancels the run; a cancelled
    /// run delivers nothing.
    pub fn export_all(
        &mut self,
        progress: Option<js_sys::Function>,
    ) -> Result<JsExportResult, JsValue> {
        let cancel = CancelToken::new();
        let token = cancel.clone();
        let mut sink = move |status: Option<&str>| {
            let Some(callback) = &progress else {
                return;
            };
            let arg = status.map_or(JsValue::NULL, JsValue::from_str);
            match callback.call1(&JsValue::NULL, &arg) {
                Ok(ret) if status.is_some() && ret.as_bool() == Some(false) => token.cancel(),
                Ok(_) => {}
                Err(err) => tracing::warn!(?err, "progress callback threw"),
            }
        };
        let timestamp = (js_sys::Date::now() / 1000.0) as u64;

        match self.run_export(&mut sink, timestamp, cancel) {
            Ok(result) => Ok(result),
            Err(ExportError::Pack {
                source,
                fallback: Some(file),
            }) => {
                tracing::warn!(error = %source, file = %file.name, "delivering first file only");
                Ok(JsExportResult::fallback(file))
            }
            Err(err) => Err(to_js_error(err)),
        }
    }
}

impl JsImageStore {
    fn from_config(config: ExportConfig) -> Result<Self, snapcrop_core::ConfigError> {
        config.validate()?;
        Ok(Self {
            inner: ImageStore::new(config),
        })
    }

    fn id(&self, raw: f64) -> Result<ImageId, JsValue> {
        parse_id(raw).ok_or_else(|| JsValue::from_str(&format!("Invalid image id: {raw}")))
    }

    fn run_export(
        &mut self,
        sink: &mut dyn ProgressSink,
        unix_timestamp: u64,
        cancel: CancelToken,
    ) -> Result<JsExportResult, ExportError> {
        let config = self.inner.config().clone();
        let outcome = ExportRun::new(config, sink, unix_timestamp)
            .with_cancel(cancel)
            .run(&mut self.inner)?;

        let summary = outcome.summary();
        let (file, archive) = match outcome.delivery {
            Delivery::Single(file) => (Some(file), false),
            Delivery::Archive(file) => (Some(file), true),
            Delivery::Nothing => (None, false),
        };
        Ok(JsExportResult::new(file, archive, summary))
    }
}

/// Ids are non-negative integers; anything else names no record.
fn parse_id(raw: f64) -> Option<ImageId> {
    if raw.is_finite() && raw >= 0.0 && raw.fract() == 0.0 {
        Some(ImageId::from_raw(raw as u64))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbaImage};
    use snapcrop_core::export::StatusLine;
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            image::Rgba([(x * 10) as u8, (y * 10) as u8, 77, 255])
        });
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id(3.0), Some(ImageId::from_raw(3)));
        assert_eq!(parse_id(0.0), Some(ImageId::from_raw(0)));
        assert_eq!(parse_id(-1.0), None);
        assert_eq!(parse_id(1.5), None);
        assert_eq!(parse_id(f64::NAN), None);
    }

    #[test]
    fn test_add_file_and_selection() {
        let mut store = JsImageStore::new();
        let first = store.add_file("a.png", "image/png", png(4, 3)).unwrap();
        let second = store.add_file("b.png", "image/png", png(4, 3)).unwrap();
        assert_eq!(store.add_file("c.txt", "text/plain", vec![1, 2]), None);

        assert_eq!(store.length(), 2);
        assert_eq!(store.ids(), vec![first, second]);
        assert_eq!(store.selected(), Some(first));

        store.select(second).unwrap();
        assert_eq!(store.selected(), Some(second));
        store.remove(second).unwrap();
        assert_eq!(store.selected(), Some(first));
    }

    #[test]
    fn test_edits_through_bindings() {
        let mut store = JsImageStore::new();
        let id = store.add_file("a.png", "image/png", png(40, 30)).unwrap();

        assert_eq!(store.set_width(id, 20).unwrap(), vec![20, 15]);
        store.set_crop_rotation(id, 90.0).unwrap();
        store.set_crop_rect(id, 0.0, 0.0, 10.2, 9.8).unwrap();
        assert!(store.apply_crop(id).unwrap());

        let working = store.working_image(id).unwrap();
        assert_eq!((working.width(), working.height()), (10, 10));

        store.reset(id).unwrap();
        let working = store.working_image(id).unwrap();
        assert_eq!((working.width(), working.height()), (40, 30));
    }

    #[test]
    fn test_run_export_two_records() {
        let mut store = JsImageStore::new();
        store.add_file("a.png", "image/png", png(6, 6)).unwrap();
        let b = store.add_file("b.png", "image/png", png(6, 6)).unwrap();
        store.set_format(b, "pdf").unwrap();

        let mut status = StatusLine::new();
        let result = store
            .run_export(&mut status, 1_700_000_000, CancelToken::new())
            .unwrap();

        assert!(result.has_file());
        assert!(result.is_archive());
        assert_eq!(result.name(), "compressed-1700000000.zip");
        assert_eq!(result.mime(), "application/zip");
        assert_eq!(result.summary_value().unwrap().exported, 2);
        assert_eq!(store.live_output_handles(), 2);
        assert!(store.total_export_size() > 0.0);
        assert_eq!(status.current(), None);
    }

    #[test]
    fn test_run_export_single_record() {
        let mut store = JsImageStore::new();
        let id = store.add_file("scan.png", "image/png", png(6, 4)).unwrap();
        store.set_format(id, "png").unwrap();

        let mut status = StatusLine::new();
        let result = store.run_export(&mut status, 0, CancelToken::new()).unwrap();
        assert!(!result.is_archive());
        assert_eq!(result.name(), "scan.png");
        assert_eq!(&result.bytes()[1..4], b"PNG");
    }

    #[test]
    fn test_run_export_cancelled() {
        let mut store = JsImageStore::new();
        store.add_file("a.png", "image/png", png(2, 2)).unwrap();

        let cancel = CancelToken::new();
        cancel.cancel();
        let mut status = StatusLine::new();
        let result = store.run_export(&mut status, 0, cancel).unwrap();
        assert!(!result.has_file());
        assert!(result.summary_value().unwrap().cancelled);
    }

    #[test]
    fn test_from_config_uses_defaults() {
        let mut config = ExportConfig::default();
        config.default_format = OutputFormat::Webp;
        let mut store = JsImageStore::from_config(config).unwrap();
        let id = store.add_file("a.png", "image/png", png(2, 2)).unwrap();
        let record = store.inner.record(parse_id(id).unwrap()).unwrap();
        assert_eq!(record.format(), OutputFormat::Webp);
    }

    #[test]
    fn test_from_config_rejects_invalid() {
        let mut config = ExportConfig::default();
        config.archive_prefix = "../x".to_string();
        assert!(JsImageStore::from_config(config).is_err());
    }
}
