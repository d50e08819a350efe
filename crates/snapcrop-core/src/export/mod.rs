//! Batch export: crop, resize and encode every record, then deliver.
//!
//! Records are processed one at a time in collection order. A failing
//! record is logged and skipped; the rest of the batch carries on. One
//! output is delivered as-is, two or more are bundled into a ZIP archive.
//!
//! # Examples
//!
//! ```ignore
//! use snapcrop_core::export::{ExportRun, StatusLine};
//!
//! let mut status = StatusLine::new();
//! let outcome = ExportRun::new(config, &mut status, now).run(&mut store)?;
//! println!("{} of {} exported", outcome.exported(), outcome.total());
//! ```

pub mod archive;
mod progress;

pub use archive::{pack, ArchiveEntry, PackError, ARCHIVE_MIME};
pub use progress::{CancelToken, ProgressSink, StatusLine};

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::config::{ConfigError, ExportConfig};
use crate::decode::{expected_len, resize, DecodeError, FilterType};
use crate::encode::{encode, format_file_name, EncodeError, EncodedImage};
use crate::store::{ExportResult, ImageId, ImageRecord, ImageStore, StoreError};
use crate::transform::crop_to_bounding_box;
use progress::{processing_message, ProgressGuard};

/// Where a record is in the export pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportStage {
    Pending,
    Cropping,
    Resizing,
    Encoding,
    Done,
    Failed,
}

/// Why one record could not be exported.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Working buffer is unusable: {0}")]
    Source(DecodeError),

    #[error("Resize failed: {0}")]
    Resize(DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Errors that abort a whole run.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Invalid export configuration: {0}")]
    Config(#[from] ConfigError),

    /// Packing failed. `fallback` is the first output, deliverable alone.
    #[error("Failed to build archive: {source}")]
    Pack {
        source: PackError,
        fallback: Option<DeliveredFile>,
    },
}

/// A file handed to the user.
#[derive(Debug, Clone)]
pub struct DeliveredFile {
    pub name: String,
    pub mime: String,
    pub bytes: Arc<[u8]>,
}

#[derive(Debug, Clone)]
pub enum Delivery {
    /// Exactly one record exported.
    Single(DeliveredFile),
    /// Two or more records, bundled.
    Archive(DeliveredFile),
    /// Nothing exported, or the run was cancelled.
    Nothing,
}

impl Delivery {
    pub fn file(&self) -> Option<&DeliveredFile> {
        match self {
            Delivery::Single(file) | Delivery::Archive(file) => Some(file),
            Delivery::Nothing => None,
        }
    }
}

/// Final state of one record after a run.
#[derive(Debug, Clone, Serialize)]
pub struct RecordReport {
    pub id: ImageId,
    pub name: String,
    pub state: ExportStage,
    /// The stage that failed, for failed records.
    pub stage: Option<ExportStage>,
    pub error: Option<String>,
}

impl RecordReport {
    fn new(id: ImageId, name: &str, state: ExportStage) -> Self {
        Self {
            id,
            name: name.to_string(),
            state,
            stage: None,
            error: None,
        }
    }

    fn failed(id: ImageId, name: &str, stage: ExportStage, error: &RecordError) -> Self {
        Self {
            stage: Some(stage),
            error: Some(error.to_string()),
            ..Self::new(id, name, ExportStage::Failed)
        }
    }
}

/// Serializable "N of M exported" summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    pub total: usize,
    pub exported: usize,
    pub failed: usize,
    pub cancelled: bool,
    pub delivered_name: Option<String>,
    pub delivered_size: usize,
}

#[derive(Debug)]
pub struct ExportOutcome {
    pub reports: Vec<RecordReport>,
    pub delivery: Delivery,
    pub cancelled: bool,
}

impl ExportOutcome {
    pub fn total(&self) -> usize {
        self.reports.len()
    }

    pub fn exported(&self) -> usize {
        self.count(ExportStage::Done)
    }

    pub fn failed(&self) -> usize {
        self.count(ExportStage::Failed)
    }

    pub fn summary(&self) -> ExportSummary {
        let delivered = self.delivery.file();
        ExportSummary {
            total: self.total(),
            exported: self.exported(),
            failed: self.failed(),
            cancelled: self.cancelled,
            delivered_name: delivered.map(|f| f.name.clone()),
            delivered_size: delivered.map_or(0, |f| f.bytes.len()),
        }
    }

    fn count(&self, state: ExportStage) -> usize {
        self.reports.iter().filter(|r| r.state == state).count()
    }
}

enum Interrupt {
    Cancelled,
    Failed(ExportStage, RecordError),
}

/// One export run over a store.
pub struct ExportRun<'a> {
    config: ExportConfig,
    progress: &'a mut dyn ProgressSink,
    unix_timestamp: u64,
    cancel: CancelToken,
}

impl<'a> ExportRun<'a> {
    /// `unix_timestamp` names the archive; the caller supplies the clock.
    pub fn new(
        config: ExportConfig,
        progress: &'a mut dyn ProgressSink,
        unix_timestamp: u64,
    ) -> Self {
        Self {
            config,
            progress,
            unix_timestamp,
            cancel: CancelToken::default(),
        }
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Fails up front with [`ExportError::Config`] if the configuration does
    /// not validate; no record is touched in that case.
    pub fn run(self, store: &mut ImageStore) -> Result<ExportOutcome, ExportError> {
        let ExportRun {
            config,
            progress,
            unix_timestamp,
            cancel,
        } = self;
        config.validate()?;
        let mut progress = ProgressGuard::new(progress);

        let ids = store.ids();
        let total = ids.len();
        tracing::info!(total, "starting export");

        let mut reports = Vec::with_capacity(total);
        let mut outputs: Vec<DeliveredFile> = Vec::new();
        let mut cancelled = false;

        for (index, &id) in ids.iter().enumerate() {
            let record = store.record(id)?;
            let name = record.name().to_string();

            if cancel.is_cancelled() {
                cancelled = true;
                reports.push(RecordReport::new(id, &name, ExportStage::Pending));
                continue;
            }

            progress.report(&processing_message(&name, index, total));

            match export_record(record, config.resample_filter, &cancel) {
                Ok(encoded) => {
                    let file = deliver(store, id, &name, encoded)?;
                    tracing::debug!(%id, file = %file.name, bytes = file.bytes.len(), "exported");
                    outputs.push(file);
                    reports.push(RecordReport::new(id, &name, ExportStage::Done));
                }
                Err(Interrupt::Cancelled) => {
                    cancelled = true;
                    reports.push(RecordReport::new(id, &name, ExportStage::Pending));
                }
                Err(Interrupt::Failed(stage, err)) => {
                    tracing::warn!(%id, name = %name, ?stage, error = %err, "export failed");
                    store.record_mut(id)?.invalidate_export();
                    reports.push(RecordReport::failed(id, &name, stage, &err));
                }
            }
        }

        if cancelled {
            tracing::info!(
                exported = outputs.len(),
                total,
                "export cancelled, nothing delivered"
            );
            return Ok(ExportOutcome {
                reports,
                delivery: Delivery::Nothing,
                cancelled: true,
            });
        }

        let delivery = match outputs.len() {
            0 => Delivery::Nothing,
            1 => outputs
                .pop()
                .map_or(Delivery::Nothing, Delivery::Single),
            _ => {
                let packed = {
                    let entries: Vec<ArchiveEntry<'_>> = outputs
                        .iter()
                        .map(|f| ArchiveEntry {
                            name: &f.name,
                            bytes: &f.bytes,
                        })
                        .collect();
                    pack(&entries)
                };
                match packed {
                    Ok(bytes) => Delivery::Archive(DeliveredFile {
                        name: config.archive_name(unix_timestamp),
                        mime: ARCHIVE_MIME.to_string(),
                        bytes: Arc::from(bytes),
                    }),
                    Err(source) => {
                        tracing::error!(error = %source, "failed to pack archive");
                        return Err(ExportError::Pack {
                            source,
                            fallback: outputs.into_iter().next(),
                        });
                    }
                }
            }
        };

        let outcome = ExportOutcome {
            reports,
            delivery,
            cancelled: false,
        };
        tracing::info!(
            exported = outcome.exported(),
            failed = outcome.failed(),
            total,
            "export finished"
        );
        Ok(outcome)
    }
}

/// Crop (full frame), resize and encode one record.
fn export_record(
    record: &ImageRecord,
    filter: FilterType,
    cancel: &CancelToken,
) -> Result<EncodedImage, Interrupt> {
    let working = record.working();

    let stage = ExportStage::Cropping;
    if working.width == 0 || working.height == 0 {
        return Err(Interrupt::Failed(
            stage,
            RecordError::Source(DecodeError::InvalidDimension {
                width: working.width,
                height: working.height,
            }),
        ));
    }
    if !working.is_well_formed() {
        return Err(Interrupt::Failed(
            stage,
            RecordError::Source(DecodeError::CorruptedBuffer {
                expected: expected_len(working.width, working.height),
                actual: working.pixels.len(),
            }),
        ));
    }
    let cropped = crop_to_bounding_box(working, None, 0.0);
    checkpoint(cancel)?;

    let stage = ExportStage::Resizing;
    let (width, height) = record.target_dimensions();
    let resized = resize(&cropped, width, height, filter)
        .map_err(|e| Interrupt::Failed(stage, RecordError::Resize(e)))?;
    checkpoint(cancel)?;

    let stage = ExportStage::Encoding;
    encode(&resized, record.format(), record.quality())
        .map_err(|e| Interrupt::Failed(stage, RecordError::Encode(e)))
}

fn checkpoint(cancel: &CancelToken) -> Result<(), Interrupt> {
    if cancel.is_cancelled() {
        Err(Interrupt::Cancelled)
    } else {
        Ok(())
    }
}

/// Store the new export result on the record and build the delivered file.
fn deliver(
    store: &mut ImageStore,
    id: ImageId,
    name: &str,
    encoded: EncodedImage,
) -> Result<DeliveredFile, StoreError> {
    let format = encoded.format;
    let file_name = format_file_name(name, format);
    let bytes: Arc<[u8]> = Arc::from(encoded.bytes);
    let handle = store.handles().issue(Arc::clone(&bytes));

    store.record_mut(id)?.store_export(ExportResult {
        file_name: file_name.clone(),
        format,
        size: bytes.len(),
        handle,
    });

    Ok(DeliveredFile {
        name: file_name,
        mime: format.mime_type().to_string(),
        bytes,
    })
}
