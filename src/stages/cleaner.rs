//! Raw → clean, driven by object-created events

use super::{names, Stage};
use crate::clean::CleaningEngine;
use crate::codec::{decode_parquet, encode_parquet};
use crate::config::{CompressionCodec, PipelineConfig};
use crate::error::{Error, Result};
use crate::events::{parse_notification, EventPublisher, EventReceiver, StorageEvent};
use crate::storage::ObjectStorage;
use crate::transition::KeyMapping;
use async_trait::async_trait;
use serde::Serialize;

/// Outcome of draining the event channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DrainSummary {
    /// Events that produced a clean file
    pub cleaned: usize,
    /// Events outside the raw zone or bucket
    pub ignored: usize,
    /// Events whose cleaning failed
    pub failed: usize,
}

/// Cleans raw Parquet files into the clean zone
///
/// The raw copy is kept as an audit trail.
pub struct Cleaner {
    storage: ObjectStorage,
    engine: CleaningEngine,
    mapping: KeyMapping,
    compression: CompressionCodec,
}

impl Cleaner {
    /// Create a cleaner from the pipeline config
    ///
    /// `storage` should not publish events itself, otherwise the channel it
    /// drains never closes.
    pub fn new(config: &PipelineConfig, storage: ObjectStorage) -> Self {
        let mapping = KeyMapping::new(
            &config.raw_prefix,
            &config.clean_prefix,
            &config.columnar_suffix,
            &config.columnar_suffix,
        );

        Self {
            storage,
            engine: CleaningEngine::legacy(),
            mapping,
            compression: config.compression,
        }
    }

    /// Clean the object an event points at
    ///
    /// Returns the clean key, or `None` when the event is not for a raw
    /// object in this bucket. Any failure is returned as is.
    #[tracing::instrument(skip(self), fields(key = %event.key))]
    pub async fn handle(&self, event: &StorageEvent) -> Result<Option<String>> {
        if !event.key.contains(&self.mapping.source_prefix) {
            tracing::debug!("Not a raw object, ignoring");
            return Ok(None);
        }
        if event.bucket != self.storage.bucket() {
            tracing::warn!(
                bucket = %event.bucket,
                "Event for a foreign bucket, ignoring"
            );
            return Ok(None);
        }

        tracing::info!("Processing raw file: {}", event.key);

        let clean_key = self
            .mapping
            .map(&event.key)
            .ok_or_else(|| Error::storage(&event.key, "no clean key for raw object"))?;

        let data = self.storage.get(&event.key).await?;
        let raw = decode_parquet(data)?;
        let (cleaned, stats) = self.engine.clean(&raw)?;
        let payload = encode_parquet(&cleaned, self.compression)?;
        self.storage.put(&clean_key, payload).await?;

        tracing::info!(
            rows = stats.rows,
            replaced = stats.total_replaced(),
            "Fully cleaned and saved to: {clean_key}"
        );
        Ok(Some(clean_key))
    }

    /// Handle every record of a notification document
    pub async fn handle_notification(&self, json: &str) -> Result<Vec<String>> {
        let mut written = Vec::new();
        for event in parse_notification(json)? {
            if let Some(key) = self.handle(&event).await? {
                written.push(key);
            }
        }
        Ok(written)
    }

    /// Handle events until every publisher is gone
    ///
    /// A failed event is logged and counted; later events are still
    /// handled.
    pub async fn run(&self, mut receiver: EventReceiver) -> DrainSummary {
        let mut summary = DrainSummary::default();

        while let Some(event) = receiver.recv().await {
            match self.handle(&event).await {
                Ok(Some(_)) => summary.cleaned += 1,
                Ok(None) => summary.ignored += 1,
                Err(e) if e.is_structural() => {
                    tracing::error!(key = %event.key, "Error cleaning {}: {e}", event.key);
                    summary.failed += 1;
                }
                Err(e) => {
                    tracing::warn!(key = %event.key, "Could not clean {}: {e}", event.key);
                    summary.failed += 1;
                }
            }
        }

        tracing::info!(
            cleaned = summary.cleaned,
            ignored = summary.ignored,
            failed = summary.failed,
            "Event channel closed, cleaner stopped"
        );
        summary
    }
}

/// The orchestrator's per-cycle cleaning step
///
/// Cleaning itself happens on the event channel as raw files appear; this
/// step only checks that someone is still listening. It never waits for
/// cleaning to finish.
pub struct CleanTrigger {
    publisher: EventPublisher,
}

impl CleanTrigger {
    /// Create a trigger watching a publisher's channel
    pub fn new(publisher: EventPublisher) -> Self {
        Self { publisher }
    }
}

#[async_trait]
impl Stage for CleanTrigger {
    fn name(&self) -> &str {
        names::CLEAN
    }

    async fn run(&self) -> Result<()> {
        if self.publisher.is_closed() {
            return Err(Error::EventChannelClosed);
        }
        tracing::info!(
            published = self.publisher.published(),
            "Cleaner is listening for raw files"
        );
        Ok(())
    }
}
