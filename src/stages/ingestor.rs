//! Landing → raw ingestion

use super::{names, Stage};
use crate::codec::{decode_delimited, encode_parquet};
use crate::config::{CompressionCodec, PipelineConfig};
use crate::error::Result;
use crate::schema::Schema;
use crate::storage::ObjectStorage;
use crate::transition::{KeyMapping, StageTransition, TransitionReport};
use async_trait::async_trait;
use bytes::Bytes;

/// Converts legacy files in the landing zone to raw Parquet files
pub struct Ingestor {
    storage: ObjectStorage,
    transition: StageTransition,
    schema: Schema,
    compression: CompressionCodec,
}

impl Ingestor {
    /// Create an ingestor from the pipeline config
    pub fn new(config: &PipelineConfig, storage: ObjectStorage) -> Self {
        let mapping = KeyMapping::new(
            &config.landing_prefix,
            &config.raw_prefix,
            &config.landing_suffix,
            &config.columnar_suffix,
        );

        Self {
            storage,
            transition: StageTransition::new(mapping),
            schema: Schema::legacy_transactions().clone(),
            compression: config.compression,
        }
    }

    /// Decode one legacy payload and re-encode it as Parquet
    ///
    /// Deterministic for a given payload, so re-ingesting a source that
    /// survived a crash rewrites an identical raw file.
    pub fn convert(&self, data: &[u8]) -> Result<Bytes> {
        let batch = decode_delimited(data, &self.schema)?;
        tracing::debug!(rows = batch.num_rows(), "Decoded legacy payload");
        encode_parquet(&batch, self.compression)
    }

    /// Run one pass over the landing zone
    #[tracing::instrument(skip(self))]
    pub async fn ingest(&self) -> TransitionReport {
        let zone = &self.transition.mapping().source_prefix;
        tracing::info!("Checking {} for new files...", self.storage.url(zone));
        let transform = |_key: &str, data: Bytes| self.convert(&data);
        self.transition.run(&self.storage, &transform).await
    }
}

#[async_trait]
impl Stage for Ingestor {
    fn name(&self) -> &str {
        names::INGEST
    }

    /// Batch-tolerant: skipped files are reported, never raised
    async fn run(&self) -> Result<()> {
        let report = self.ingest().await;
        if report.skipped() > 0 {
            tracing::warn!(
                skipped = report.skipped(),
                "Some landing files were left for a later pass"
            );
        }
        Ok(())
    }
}
