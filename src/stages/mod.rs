//! Pipeline stages
//!
//! Each stage is a self-contained entry point that reads one zone and writes
//! the next. The orchestrator drives the [`Stage`] implementations in order;
//! the [`Cleaner`] is reactive and runs off the storage event channel.
//!
//! # Overview
//!
//! - `Generator` - writes synthetic legacy batches into the landing zone
//! - `Ingestor` - landing → raw (legacy text → Parquet), retiring sources
//! - `Cleaner` - raw → clean on every object-created event
//! - `CleanTrigger` - the orchestrator's per-cycle cleaning step

mod cleaner;
mod generator;
mod ingestor;

pub use cleaner::{CleanTrigger, Cleaner, DrainSummary};
pub use generator::{generate_batch, Generator};
pub use ingestor::Ingestor;

use crate::error::Result;
use async_trait::async_trait;

/// Stage names used in orchestrator plans
pub mod names {
    /// Synthetic data generation
    pub const GENERATE: &str = "generate";
    /// Landing to raw transition
    pub const INGEST: &str = "ingest";
    /// Cleaner trigger
    pub const CLEAN: &str = "clean";
}

/// A pipeline step the orchestrator can run
#[async_trait]
pub trait Stage: Send + Sync {
    /// Name used in orchestrator plans and logs
    fn name(&self) -> &str;

    /// Run the stage once
    ///
    /// An error is structural and aborts the orchestrator.
    async fn run(&self) -> Result<()>;
}
