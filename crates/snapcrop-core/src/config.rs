//! Export configuration.
//!
//! Holds the defaults new records start with and the knobs of an export run.
//! Every field has a default, so a partial object (e.g. `{ "default_format":
//! "png" }` from JavaScript) is a valid configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::FilterType;
use crate::encode::{OutputFormat, Quality};

/// Default archive name prefix: `compressed-<timestamp>.zip`.
pub const DEFAULT_ARCHIVE_PREFIX: &str = "compressed";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Quality {0} is outside 10..=100")]
    QualityOutOfRange(u32),

    #[error("Invalid archive prefix {0:?}: must be non-empty and contain no path separators")]
    InvalidArchivePrefix(String),
}

/// Settings shared by intake and the export orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Format given to newly added records
    pub default_format: OutputFormat,

    /// Quality given to newly added records. Stored raw so `validate` can
    /// report values a UI should not have sent.
    pub default_quality: u32,

    /// Whether new records start with the aspect lock on
    pub keep_aspect_ratio: bool,

    /// Filter used when scaling to the target size
    pub resample_filter: FilterType,

    /// File name prefix of batch archives
    pub archive_prefix: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            default_format: OutputFormat::Jpeg,
            default_quality: Quality::default().value() as u32,
            keep_aspect_ratio: true,
            resample_filter: FilterType::default(),
            archive_prefix: DEFAULT_ARCHIVE_PREFIX.to_string(),
        }
    }
}

impl ExportConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let range = Quality::MIN as u32..=Quality::MAX as u32;
        if !range.contains(&self.default_quality) {
            return Err(ConfigError::QualityOutOfRange(self.default_quality));
        }

        let prefix = self.archive_prefix.trim();
        if prefix.is_empty() || prefix.contains(['/', '\\']) || prefix == "." || prefix == ".." {
            return Err(ConfigError::InvalidArchivePrefix(
                self.archive_prefix.clone(),
            ));
        }

        Ok(())
    }

    /// The default quality, clamped.
    pub fn quality(&self) -> Quality {
        Quality::new(self.default_quality)
    }

    /// `{prefix}-{unix_timestamp}.zip`
    pub fn archive_name(&self, unix_timestamp: u64) -> String {
        format!("{}-{}.zip", self.archive_prefix.trim(), unix_timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ExportConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_format, OutputFormat::Jpeg);
        assert_eq!(config.quality(), Quality::default());
        assert!(config.keep_aspect_ratio);
        assert_eq!(config.resample_filter, FilterType::Bilinear);
    }

    #[test]
    fn test_archive_name() {
        let config = ExportConfig::default();
        assert_eq!(config.archive_name(1_700_000_000), "compressed-1700000000.zip");
    }

    #[test]
    fn test_rejects_out_of_range_quality() {
        let mut config = ExportConfig::default();
        config.default_quality = 5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::QualityOutOfRange(5))
        ));
        config.default_quality = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_prefix() {
        for prefix in ["", "  ", "a/b", "..\\up", ".."] {
            let mut config = ExportConfig::default();
            config.archive_prefix = prefix.to_string();
            assert!(
                matches!(config.validate(), Err(ConfigError::InvalidArchivePrefix(_))),
                "prefix {prefix:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_quality_accessor_clamps() {
        let mut config = ExportConfig::default();
        config.default_quality = 500;
        assert_eq!(config.quality().value(), 100);
    }
}
