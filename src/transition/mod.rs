//! Stage transition module
//!
//! Moves every matching object of one zone into the next:
//! read → transform → write → retire source.
//!
//! # Overview
//!
//! - `StageTransition` - runs one pass over a source zone
//! - `KeyMapping` - source/destination key conventions
//! - `TransitionReport` - per-object outcomes of a pass
//!
//! A failing object is recorded as skipped and the pass continues. Only
//! after a successful write is the source deleted, so a crash in between
//! leaves the source to be processed again.

mod types;

pub use types::{KeyMapping, ObjectOutcome, Transform, TransitionReport};

use crate::error::{Error, Result};
use crate::storage::ObjectStorage;
use std::time::Instant;

/// One zone-to-zone transition
#[derive(Debug, Clone)]
pub struct StageTransition {
    /// Key conventions
    mapping: KeyMapping,
    /// Whether the source object is deleted after a successful write
    retire_source: bool,
}

impl StageTransition {
    /// Create a transition that deletes its sources
    pub fn new(mapping: KeyMapping) -> Self {
        Self {
            mapping,
            retire_source: true,
        }
    }

    /// Keep (true) or retire (false) source objects after writing
    #[must_use]
    pub fn keep_source(mut self, keep: bool) -> Self {
        self.retire_source = !keep;
        self
    }

    /// Key conventions of this transition
    pub fn mapping(&self) -> &KeyMapping {
        &self.mapping
    }

    /// Run one pass over the source zone
    ///
    /// Never fails: a listing error or an empty zone produce an empty report.
    pub async fn run(&self, storage: &ObjectStorage, transform: &dyn Transform) -> TransitionReport {
        let start = Instant::now();
        let mut report = TransitionReport::default();

        let keys = match storage.list(&self.mapping.source_prefix).await {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!(
                    prefix = %self.mapping.source_prefix,
                    "Could not list source zone, nothing to do: {e}"
                );
                report.listing_error = Some(e.to_string());
                report.duration_ms = start.elapsed().as_millis() as u64;
                return report;
            }
        };

        let files: Vec<String> = keys
            .into_iter()
            .filter(|key| self.mapping.matches(key))
            .collect();

        if files.is_empty() {
            tracing::info!(
                prefix = %self.mapping.source_prefix,
                "No files found, waiting for next batch"
            );
            report.duration_ms = start.elapsed().as_millis() as u64;
            return report;
        }

        tracing::info!(
            "Found {} {} files to process",
            files.len(),
            self.mapping.source_suffix
        );

        let total = files.len();
        for (i, key) in files.into_iter().enumerate() {
            let filename = key.rsplit('/').next().unwrap_or(&key);
            tracing::info!("[{}/{total}] Processing {filename}", i + 1);

            match self.process_object(storage, transform, &key).await {
                Ok(dest) => {
                    report
                        .outcomes
                        .push(ObjectOutcome::Processed { source: key, dest });
                }
                Err(e) => {
                    tracing::warn!(key = %key, "Failed to process {filename}: {e}");
                    report.outcomes.push(ObjectOutcome::Skipped {
                        key,
                        reason: e.to_string(),
                    });
                }
            }
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            processed = report.processed(),
            skipped = report.skipped(),
            duration_ms = report.duration_ms,
            "Transition pass complete"
        );
        report
    }

    /// Move a single object; any error leaves the source in place
    async fn process_object(
        &self,
        storage: &ObjectStorage,
        transform: &dyn Transform,
        key: &str,
    ) -> Result<String> {
        let dest = self
            .mapping
            .map(key)
            .ok_or_else(|| Error::storage(key, "key is outside the source zone"))?;

        let data = storage.get(key).await?;
        let output = transform.apply(key, data)?;
        storage.put(&dest, output).await?;
        tracing::info!("Saved to: {dest}");

        if self.retire_source {
            storage.delete(key).await.map_err(|e| {
                Error::storage(key, format!("written to {dest} but not retired: {e}"))
            })?;
            tracing::debug!("Deleted original: {key}");
        }

        Ok(dest)
    }
}

#[cfg(test)]
mod tests;
