//! Pipeline configuration
//!
//! All stage entry points receive a [`PipelineConfig`] instead of reading
//! process-wide constants. Configuration is loaded from YAML and may be
//! overridden from the command line.
//!
//! ```yaml
//! bucket_name: procureflow-datalake-raw
//! landing_prefix: landing_zone/
//! raw_prefix: raw_data/
//! clean_prefix: clean_data/
//! target_cycles: 20
//! cooldown_seconds: 10
//! rows_per_file: 800000
//! files_per_batch: 10
//! storage:
//!   type: local
//!   root: ./datalake
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

// ============================================================================
// Top-Level Pipeline Config
// ============================================================================

/// Complete pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Bucket (or container) holding every zone
    #[serde(default = "default_bucket_name")]
    pub bucket_name: String,

    /// Zone where the generator drops legacy `.dat` files
    #[serde(default = "default_landing_prefix")]
    pub landing_prefix: String,

    /// Zone holding untyped columnar copies (audit trail)
    #[serde(default = "default_raw_prefix")]
    pub raw_prefix: String,

    /// Zone holding schema-enforced columnar files
    #[serde(default = "default_clean_prefix")]
    pub clean_prefix: String,

    /// Number of orchestrator cycles
    #[serde(default = "default_target_cycles")]
    pub target_cycles: u32,

    /// Pause between cycles in seconds
    #[serde(default = "default_cooldown_seconds")]
    pub cooldown_seconds: u64,

    /// Rows in every generated file
    #[serde(default = "default_rows_per_file")]
    pub rows_per_file: usize,

    /// Files written by one generator run
    #[serde(default = "default_files_per_batch")]
    pub files_per_batch: usize,

    /// Suffix of legacy files in the landing zone
    #[serde(default = "default_landing_suffix")]
    pub landing_suffix: String,

    /// Suffix of columnar files in the raw and clean zones
    #[serde(default = "default_columnar_suffix")]
    pub columnar_suffix: String,

    /// Storage backend
    #[serde(default)]
    pub storage: StorageConfig,

    /// Parquet compression codec
    #[serde(default)]
    pub compression: CompressionCodec,

    /// Optional storage request rate limit
    #[serde(default)]
    pub requests_per_second: Option<u32>,

    /// Optional generator seed for reproducible batches
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            bucket_name: default_bucket_name(),
            landing_prefix: default_landing_prefix(),
            raw_prefix: default_raw_prefix(),
            clean_prefix: default_clean_prefix(),
            target_cycles: default_target_cycles(),
            cooldown_seconds: default_cooldown_seconds(),
            rows_per_file: default_rows_per_file(),
            files_per_batch: default_files_per_batch(),
            landing_suffix: default_landing_suffix(),
            columnar_suffix: default_columnar_suffix(),
            storage: StorageConfig::default(),
            compression: CompressionCodec::default(),
            requests_per_second: None,
            seed: None,
        }
    }
}

fn default_bucket_name() -> String {
    "procureflow-datalake-raw".to_string()
}

fn default_landing_prefix() -> String {
    "landing_zone/".to_string()
}

fn default_raw_prefix() -> String {
    "raw_data/".to_string()
}

fn default_clean_prefix() -> String {
    "clean_data/".to_string()
}

fn default_target_cycles() -> u32 {
    20
}

fn default_cooldown_seconds() -> u64 {
    10
}

fn default_rows_per_file() -> usize {
    800_000
}

fn default_files_per_batch() -> usize {
    10
}

fn default_landing_suffix() -> String {
    ".dat".to_string()
}

fn default_columnar_suffix() -> String {
    ".parquet".to_string()
}

impl PipelineConfig {
    /// Create a config with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a config from a YAML file and validate it
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Parse a config from a YAML string and validate it
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Pause between cycles
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_seconds)
    }

    /// Set the storage backend
    #[must_use]
    pub fn with_storage(mut self, storage: StorageConfig) -> Self {
        self.storage = storage;
        self
    }

    /// Set the number of cycles
    #[must_use]
    pub fn with_target_cycles(mut self, cycles: u32) -> Self {
        self.target_cycles = cycles;
        self
    }

    /// Set the cooldown between cycles
    #[must_use]
    pub fn with_cooldown_seconds(mut self, seconds: u64) -> Self {
        self.cooldown_seconds = seconds;
        self
    }

    /// Set the generator batch shape
    #[must_use]
    pub fn with_batch_shape(mut self, files_per_batch: usize, rows_per_file: usize) -> Self {
        self.files_per_batch = files_per_batch;
        self.rows_per_file = rows_per_file;
        self
    }

    /// Set the generator seed
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check the config for values no stage can work with
    pub fn validate(&self) -> Result<()> {
        if self.bucket_name.trim().is_empty() {
            return Err(Error::missing_field("bucket_name"));
        }

        let prefixes = [
            ("landing_prefix", &self.landing_prefix),
            ("raw_prefix", &self.raw_prefix),
            ("clean_prefix", &self.clean_prefix),
        ];
        for (field, prefix) in prefixes {
            if prefix.is_empty() {
                return Err(Error::missing_field(field));
            }
            if !prefix.ends_with('/') {
                return Err(Error::invalid_value(field, "zone prefix must end with '/'"));
            }
        }
        if self.landing_prefix == self.raw_prefix
            || self.raw_prefix == self.clean_prefix
            || self.landing_prefix == self.clean_prefix
        {
            return Err(Error::config("zone prefixes must be distinct"));
        }

        for (field, suffix) in [
            ("landing_suffix", &self.landing_suffix),
            ("columnar_suffix", &self.columnar_suffix),
        ] {
            if !suffix.starts_with('.') || suffix.len() < 2 {
                return Err(Error::invalid_value(
                    field,
                    "suffix must start with '.' and name an extension",
                ));
            }
        }

        if self.target_cycles == 0 {
            return Err(Error::invalid_value("target_cycles", "must be at least 1"));
        }
        if self.rows_per_file == 0 {
            return Err(Error::invalid_value("rows_per_file", "must be at least 1"));
        }
        if self.files_per_batch == 0 {
            return Err(Error::invalid_value("files_per_batch", "must be at least 1"));
        }
        if self.requests_per_second == Some(0) {
            return Err(Error::invalid_value(
                "requests_per_second",
                "must be at least 1 when set",
            ));
        }
        if let StorageConfig::Local { root } = &self.storage {
            if root.trim().is_empty() {
                return Err(Error::missing_field("storage.root"));
            }
        }

        Ok(())
    }
}

// ============================================================================
// Storage Config
// ============================================================================

/// Object storage backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageConfig {
    /// AWS S3 (credentials and region from the environment)
    #[default]
    S3,

    /// Google Cloud Storage
    Gcs,

    /// Azure Blob Storage (bucket name is the container)
    Azure,

    /// Local directory; the bucket becomes a sub-directory of `root`
    Local {
        /// Root directory
        root: String,
    },

    /// Process-local in-memory store
    Memory,
}

// ============================================================================
// Compression
// ============================================================================

/// Parquet compression codec
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompressionCodec {
    #[default]
    Snappy,
    Zstd,
    Gzip,
    #[serde(rename = "none")]
    Uncompressed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.bucket_name, "procureflow-datalake-raw");
        assert_eq!(config.landing_prefix, "landing_zone/");
        assert_eq!(config.raw_prefix, "raw_data/");
        assert_eq!(config.clean_prefix, "clean_data/");
        assert_eq!(config.target_cycles, 20);
        assert_eq!(config.cooldown(), Duration::from_secs(10));
        assert_eq!(config.rows_per_file, 800_000);
        assert_eq!(config.files_per_batch, 10);
        assert_eq!(config.storage, StorageConfig::S3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_minimal_yaml() {
        let config = PipelineConfig::from_yaml("bucket_name: test-bucket\n").unwrap();
        assert_eq!(config.bucket_name, "test-bucket");
        assert_eq!(config.raw_prefix, "raw_data/");
    }

    #[test]
    fn test_parse_full_yaml() {
        let yaml = r"
bucket_name: lake
landing_prefix: inbox/
raw_prefix: bronze/
clean_prefix: silver/
target_cycles: 3
cooldown_seconds: 0
rows_per_file: 50
files_per_batch: 2
compression: zstd
requests_per_second: 25
seed: 7
storage:
  type: local
  root: /tmp/lake
";

        let config = PipelineConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.landing_prefix, "inbox/");
        assert_eq!(config.target_cycles, 3);
        assert_eq!(config.compression, CompressionCodec::Zstd);
        assert_eq!(config.requests_per_second, Some(25));
        assert_eq!(config.seed, Some(7));
        assert_eq!(
            config.storage,
            StorageConfig::Local {
                root: "/tmp/lake".to_string()
            }
        );
    }

    #[test]
    fn test_parse_memory_storage() {
        let config = PipelineConfig::from_yaml("storage:\n  type: memory\n").unwrap();
        assert_eq!(config.storage, StorageConfig::Memory);
    }

    #[test]
    fn test_validate_prefix_without_slash() {
        let mut config = PipelineConfig::default();
        config.raw_prefix = "raw_data".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("raw_prefix"));
    }

    #[test]
    fn test_validate_duplicate_prefixes() {
        let mut config = PipelineConfig::default();
        config.clean_prefix = config.raw_prefix.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_values() {
        assert!(PipelineConfig::default()
            .with_target_cycles(0)
            .validate()
            .is_err());
        assert!(PipelineConfig::default()
            .with_batch_shape(0, 10)
            .validate()
            .is_err());
        assert!(PipelineConfig::default()
            .with_batch_shape(1, 0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_validate_suffix() {
        let mut config = PipelineConfig::default();
        config.landing_suffix = "dat".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = PipelineConfig::load("/nonexistent/pipeline.yaml").unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.yaml");
        std::fs::write(&path, "target_cycles: 5\nstorage:\n  type: memory\n").unwrap();

        let config = PipelineConfig::load(&path).unwrap();
        assert_eq!(config.target_cycles, 5);
    }
}
