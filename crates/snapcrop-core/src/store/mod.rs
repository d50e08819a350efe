//! The image record store.
//!
//! Owns every loaded image, the selection, and the export results. All
//! edits go through the transitions on [`ImageStore`]; records are only
//! readable from outside.
//!
//! Collection order is insertion order and never changes on edit.

mod output;
mod record;

pub use output::OutputHandle;
pub use record::{AspectRatio, CropSession, ExportResult, ImageId, ImageRecord};

pub(crate) use output::HandleTracker;

use std::sync::Arc;

use thiserror::Error;

use crate::config::ExportConfig;
use crate::decode::{load_file, DecodeError, PixelBuffer};
use crate::encode::{OutputFormat, Quality};
use crate::transform::CropRect;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("No image with id {0}")]
    UnknownImage(ImageId),

    #[error("Crop rectangle for image {0} has zero area")]
    EmptyCrop(ImageId),
}

/// A file offered to the store.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl IncomingFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }
}

/// Why a file was not added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    UnsupportedInput { mime: String },
    LoadError { message: String },
}

impl From<DecodeError> for RejectReason {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::UnsupportedInput { mime } => RejectReason::UnsupportedInput { mime },
            other => RejectReason::LoadError {
                message: other.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntakeOutcome {
    Accepted(ImageId),
    Rejected(RejectReason),
}

impl IntakeOutcome {
    pub fn accepted(&self) -> Option<ImageId> {
        match self {
            IntakeOutcome::Accepted(id) => Some(*id),
            IntakeOutcome::Rejected(_) => None,
        }
    }
}

/// Ordered collection of image records with a single selection.
#[derive(Debug, Default)]
pub struct ImageStore {
    records: Vec<ImageRecord>,
    selected: Option<ImageId>,
    next_id: u64,
    config: ExportConfig,
    handles: HandleTracker,
}

impl ImageStore {
    /// The config is not validated here; only its clamped defaults are used
    /// at intake. [`ExportRun::run`](crate::export::ExportRun::run) validates
    /// before naming anything after it.
    pub fn new(config: ExportConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Defaults for records added from now on.
    pub fn set_config(&mut self, config: ExportConfig) {
        self.config = config;
    }

    /// Decode and add one file.
    pub fn add_file(&mut self, name: &str, mime: &str, bytes: Vec<u8>) -> IntakeOutcome {
        match load_file(mime, &bytes) {
            Ok(buffer) => {
                let id = self.insert_decoded(name, mime, bytes, buffer);
                IntakeOutcome::Accepted(id)
            }
            Err(err) => {
                match &err {
                    DecodeError::UnsupportedInput { mime } => {
                        tracing::debug!(name, mime = %mime, "skipping unsupported file");
                    }
                    other => {
                        tracing::warn!(name, mime, error = %other, "failed to load image");
                    }
                }
                IntakeOutcome::Rejected(err.into())
            }
        }
    }

    /// Add many files, one outcome per input in order.
    pub fn add_files<I>(&mut self, files: I) -> Vec<IntakeOutcome>
    where
        I: IntoIterator<Item = IncomingFile>,
    {
        files
            .into_iter()
            .map(|file| self.add_file(&file.name, &file.mime, file.bytes))
            .collect()
    }

    /// Add an already-decoded buffer.
    pub(crate) fn insert_decoded(
        &mut self,
        name: &str,
        mime: &str,
        original_bytes: Vec<u8>,
        buffer: PixelBuffer,
    ) -> ImageId {
        let id = ImageId::from_raw(self.next_id);
        self.next_id += 1;

        tracing::debug!(
            %id,
            name,
            width = buffer.width,
            height = buffer.height,
            "added image"
        );

        self.records.push(ImageRecord::new(
            id,
            name.to_string(),
            mime.to_string(),
            Arc::from(original_bytes),
            buffer,
            &self.config,
        ));
        if self.selected.is_none() {
            self.selected = Some(id);
        }
        id
    }

    pub fn get(&self, id: ImageId) -> Option<&ImageRecord> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn record(&self, id: ImageId) -> Result<&ImageRecord, StoreError> {
        self.get(id).ok_or(StoreError::UnknownImage(id))
    }

    pub(crate) fn record_mut(&mut self, id: ImageId) -> Result<&mut ImageRecord, StoreError> {
        self.records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or(StoreError::UnknownImage(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageRecord> {
        self.records.iter()
    }

    /// Record ids in collection order.
    pub fn ids(&self) -> Vec<ImageId> {
        self.records.iter().map(ImageRecord::id).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn selected(&self) -> Option<ImageId> {
        self.selected
    }

    pub fn selected_record(&self) -> Option<&ImageRecord> {
        self.selected.and_then(|id| self.get(id))
    }

    pub fn select(&mut self, id: ImageId) -> Result<(), StoreError> {
        self.record(id)?;
        self.selected = Some(id);
        Ok(())
    }

    /// Delete a record, releasing its buffers and export result.
    ///
    /// If it was selected, the record that takes its position is selected,
    /// or the new last record, or nothing.
    pub fn remove(&mut self, id: ImageId) -> Result<(), StoreError> {
        let index = self
            .records
            .iter()
            .position(|r| r.id() == id)
            .ok_or(StoreError::UnknownImage(id))?;
        let removed = self.records.remove(index);
        tracing::debug!(%id, name = removed.name(), "removed image");
        drop(removed);

        if self.selected == Some(id) {
            self.selected = self
                .records
                .get(index)
                .or_else(|| self.records.last())
                .map(ImageRecord::id);
        }
        Ok(())
    }

    /// Remove every record.
    pub fn clear(&mut self) {
        self.records.clear();
        self.selected = None;
    }

    pub fn set_width(&mut self, id: ImageId, width: u32) -> Result<(u32, u32), StoreError> {
        let record = self.record_mut(id)?;
        record.set_width(width);
        Ok(record.target_dimensions())
    }

    pub fn set_height(&mut self, id: ImageId, height: u32) -> Result<(u32, u32), StoreError> {
        let record = self.record_mut(id)?;
        record.set_height(height);
        Ok(record.target_dimensions())
    }

    pub fn set_keep_aspect_ratio(&mut self, id: ImageId, keep: bool) -> Result<(), StoreError> {
        self.record_mut(id)?.set_keep_aspect_ratio(keep);
        Ok(())
    }

    pub fn set_format(&mut self, id: ImageId, format: OutputFormat) -> Result<(), StoreError> {
        self.record_mut(id)?.set_format(format);
        Ok(())
    }

    pub fn set_quality(&mut self, id: ImageId, quality: Quality) -> Result<(), StoreError> {
        self.record_mut(id)?.set_quality(quality);
        Ok(())
    }

    pub fn set_crop_offset(&mut self, id: ImageId, x: f64, y: f64) -> Result<(), StoreError> {
        self.record_mut(id)?.set_crop_offset(x, y);
        Ok(())
    }

    pub fn set_crop_zoom(&mut self, id: ImageId, zoom: f64) -> Result<(), StoreError> {
        self.record_mut(id)?.set_crop_zoom(zoom);
        Ok(())
    }

    pub fn set_crop_rotation(&mut self, id: ImageId, degrees: f64) -> Result<(), StoreError> {
        self.record_mut(id)?.set_crop_rotation(degrees);
        Ok(())
    }

    pub fn set_crop_aspect(
        &mut self,
        id: ImageId,
        aspect: Option<AspectRatio>,
    ) -> Result<(), StoreError> {
        self.record_mut(id)?.set_crop_aspect(aspect);
        Ok(())
    }

    /// Record the selection the crop UI computed, in rotated-canvas pixels.
    pub fn set_crop_rect(&mut self, id: ImageId, rect: Option<CropRect>) -> Result<(), StoreError> {
        self.record_mut(id)?.set_crop_rect(rect);
        Ok(())
    }

    /// Commit the pending crop. Returns whether the working buffer changed.
    pub fn apply_crop(&mut self, id: ImageId) -> Result<bool, StoreError> {
        self.record_mut(id)?.apply_crop()
    }

    pub fn cancel_crop(&mut self, id: ImageId) -> Result<(), StoreError> {
        self.record_mut(id)?.cancel_crop();
        Ok(())
    }

    pub fn reset(&mut self, id: ImageId) -> Result<(), StoreError> {
        self.record_mut(id)?.reset();
        Ok(())
    }

    /// Sum of the sizes of all present export results.
    pub fn total_export_size(&self) -> u64 {
        self.records
            .iter()
            .filter_map(ImageRecord::export_result)
            .map(|r| r.size as u64)
            .sum()
    }

    /// Number of output handles issued by this store that are still alive.
    pub fn live_output_handles(&self) -> usize {
        self.handles.live()
    }

    pub(crate) fn handles(&self) -> &HandleTracker {
        &self.handles
    }
}
