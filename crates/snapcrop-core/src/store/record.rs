//! One loaded image and everything the user has done to it.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::output::OutputHandle;
use super::StoreError;
use crate::config::ExportConfig;
use crate::decode::{height_for_width, width_for_height, PixelBuffer};
use crate::encode::{OutputFormat, Quality};
use crate::transform::{crop_to_bounding_box, is_identity_angle, normalize_rotation, CropRect};

/// Store-issued record identity. Never reused within a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(u64);

impl ImageId {
    /// Rebuild an id received from outside (e.g. JavaScript).
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Aspect ratio constraint for the crop selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AspectRatio {
    pub width: u32,
    pub height: u32,
}

impl AspectRatio {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

/// Uncommitted crop-tool state.
///
/// `pending_rect` is in pixels of the working buffer rotated by `rotation`.
/// Offset and zoom are the preview's pan and magnification; they are kept
/// for the UI and do not affect the committed pixels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropSession {
    pub offset: (f64, f64),
    pub zoom: f64,
    /// Degrees in `[0, 360)`.
    pub rotation: f64,
    pub aspect: Option<AspectRatio>,
    pub pending_rect: Option<CropRect>,
}

impl Default for CropSession {
    fn default() -> Self {
        Self {
            offset: (0.0, 0.0),
            zoom: 1.0,
            rotation: 0.0,
            aspect: None,
            pending_rect: None,
        }
    }
}

impl CropSession {
    /// No pan, no zoom, no rotation, no selection.
    pub fn is_identity(&self) -> bool {
        self.offset == (0.0, 0.0)
            && self.zoom == 1.0
            && is_identity_angle(self.rotation)
            && self.pending_rect.is_none()
    }

    /// Back to identity, keeping the aspect lock.
    fn reset(&mut self) {
        *self = Self {
            aspect: self.aspect,
            ..Self::default()
        };
    }
}

/// The most recent successful export of a record.
#[derive(Debug)]
pub struct ExportResult {
    pub file_name: String,
    pub format: OutputFormat,
    pub size: usize,
    pub handle: OutputHandle,
}

/// A loaded image: immutable source, working buffer, and output settings.
#[derive(Debug)]
pub struct ImageRecord {
    id: ImageId,
    name: String,
    mime: String,
    original_bytes: Arc<[u8]>,
    original: PixelBuffer,
    working: PixelBuffer,
    width: u32,
    height: u32,
    keep_aspect_ratio: bool,
    crop: CropSession,
    format: OutputFormat,
    quality: Quality,
    export: Option<ExportResult>,
}

impl ImageRecord {
    pub(crate) fn new(
        id: ImageId,
        name: String,
        mime: String,
        original_bytes: Arc<[u8]>,
        original: PixelBuffer,
        config: &ExportConfig,
    ) -> Self {
        let (width, height) = original.dimensions();
        Self {
            id,
            name,
            mime,
            original_bytes,
            working: original.clone(),
            original,
            width: width.max(1),
            height: height.max(1),
            keep_aspect_ratio: config.keep_aspect_ratio,
            crop: CropSession::default(),
            format: config.default_format,
            quality: config.quality(),
            export: None,
        }
    }

    pub fn id(&self) -> ImageId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn original_bytes(&self) -> &[u8] {
        &self.original_bytes
    }

    pub fn original(&self) -> &PixelBuffer {
        &self.original
    }

    /// (width₀, height₀) of the decoded source.
    pub fn original_dimensions(&self) -> (u32, u32) {
        self.original.dimensions()
    }

    pub fn working(&self) -> &PixelBuffer {
        &self.working
    }

    /// Export size; both axes are at least 1.
    pub fn target_dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn keep_aspect_ratio(&self) -> bool {
        self.keep_aspect_ratio
    }

    pub fn crop(&self) -> &CropSession {
        &self.crop
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    pub fn export_result(&self) -> Option<&ExportResult> {
        self.export.as_ref()
    }

    pub(crate) fn set_width(&mut self, width: u32) -> bool {
        let width = width.max(1);
        let height = if self.keep_aspect_ratio {
            let (w0, h0) = self.original_dimensions();
            height_for_width(width, w0, h0)
        } else {
            self.height
        };
        self.set_target(width, height)
    }

    pub(crate) fn set_height(&mut self, height: u32) -> bool {
        let height = height.max(1);
        let width = if self.keep_aspect_ratio {
            let (w0, h0) = self.original_dimensions();
            width_for_height(height, w0, h0)
        } else {
            self.width
        };
        self.set_target(width, height)
    }

    /// Turning the lock on recomputes the height from the current width.
    pub(crate) fn set_keep_aspect_ratio(&mut self, keep: bool) -> bool {
        if self.keep_aspect_ratio == keep {
            return false;
        }
        self.keep_aspect_ratio = keep;
        if keep {
            let (w0, h0) = self.original_dimensions();
            let height = height_for_width(self.width, w0, h0);
            self.set_target(self.width, height);
        }
        self.invalidate_export();
        true
    }

    pub(crate) fn set_format(&mut self, format: OutputFormat) -> bool {
        if self.format == format {
            return false;
        }
        self.format = format;
        self.invalidate_export();
        true
    }

    pub(crate) fn set_quality(&mut self, quality: Quality) -> bool {
        if self.quality == quality {
            return false;
        }
        self.quality = quality;
        self.invalidate_export();
        true
    }

    pub(crate) fn set_crop_offset(&mut self, x: f64, y: f64) {
        let finite_or_zero = |v: f64| if v.is_finite() { v } else { 0.0 };
        self.crop.offset = (finite_or_zero(x), finite_or_zero(y));
    }

    pub(crate) fn set_crop_zoom(&mut self, zoom: f64) {
        self.crop.zoom = if zoom.is_finite() { zoom.max(1.0) } else { 1.0 };
    }

    pub(crate) fn set_crop_rotation(&mut self, degrees: f64) {
        self.crop.rotation = normalize_rotation(degrees);
    }

    pub(crate) fn set_crop_aspect(&mut self, aspect: Option<AspectRatio>) {
        self.crop.aspect = aspect;
    }

    pub(crate) fn set_crop_rect(&mut self, rect: Option<CropRect>) {
        self.crop.pending_rect = rect;
    }

    pub(crate) fn cancel_crop(&mut self) {
        self.crop.reset();
    }

    /// Bake the pending crop and rotation into the working buffer.
    ///
    /// Returns `Ok(false)` when there is nothing to commit.
    pub(crate) fn apply_crop(&mut self) -> Result<bool, StoreError> {
        let rotation = self.crop.rotation;
        let rotated = !is_identity_angle(normalize_rotation(rotation));

        let rect = match self.crop.pending_rect {
            Some(rect) if rect.is_empty() => return Err(StoreError::EmptyCrop(self.id)),
            Some(rect) => Some(rect),
            None if rotated => None,
            None => return Ok(false),
        };

        let cropped = crop_to_bounding_box(&self.working, rect, rotation);
        tracing::debug!(
            id = %self.id,
            rotation,
            from = ?self.working.dimensions(),
            to = ?cropped.dimensions(),
            "committed crop"
        );

        let (width, height) = cropped.dimensions();
        self.working = cropped;
        self.width = width.max(1);
        self.height = height.max(1);
        self.crop.reset();
        self.invalidate_export();
        Ok(true)
    }

    /// Working buffer, target size and crop session back to the source.
    pub(crate) fn reset(&mut self) {
        self.working = self.original.clone();
        let (width, height) = self.original.dimensions();
        self.width = width.max(1);
        self.height = height.max(1);
        self.crop.reset();
        self.invalidate_export();
    }

    /// Replace the export result. The previous handle is released first.
    pub(crate) fn store_export(&mut self, result: ExportResult) {
        self.export.take();
        self.export = Some(result);
    }

    pub(crate) fn invalidate_export(&mut self) {
        if let Some(previous) = self.export.take() {
            tracing::debug!(id = %self.id, size = previous.size, "dropped export result");
        }
    }

    #[cfg(test)]
    pub(crate) fn replace_working(&mut self, buffer: PixelBuffer) {
        self.working = buffer;
    }

    fn set_target(&mut self, width: u32, height: u32) -> bool {
        let changed = (width, height) != (self.width, self.height);
        self.width = width;
        self.height = height;
        if changed {
            self.invalidate_export();
        }
        changed
    }
}
