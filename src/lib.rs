// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # ProcureFlow
//!
//! A staged ETL pipeline over object storage. Legacy pipe-delimited
//! transaction files move through three zones:
//!
//! ```text
//! landing_zone/*.dat ──ingest──▶ raw_data/*.parquet ──clean──▶ clean_data/*.parquet
//!      (legacy text)              (all columns text)            (typed columns)
//! ```
//!
//! ## Features
//!
//! - **Schema Registry**: one fixed, ordered schema shared by every stage
//! - **Stage Transitions**: batch-tolerant read → transform → write → retire
//! - **Cleaning Rules**: per-type coercion that never drops a row
//! - **Event-Driven Cleaning**: raw writes notify the cleaner over a channel
//! - **Orchestrator**: fixed cycle count, fail-fast, cooldown pacing
//! - **Storage Backends**: S3, GCS, Azure, local filesystem, in-memory
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use procureflow::config::{PipelineConfig, StorageConfig};
//! use procureflow::orchestrator::run_pipeline;
//! use procureflow::storage::ObjectStorage;
//!
//! #[tokio::main]
//! async fn main() -> procureflow::Result<()> {
//!     let config = PipelineConfig::default().with_storage(StorageConfig::Memory);
//!     let storage = ObjectStorage::from_config(&config)?;
//!
//!     let outcome = run_pipeline(&config, storage).await?;
//!     println!("{}", outcome.run.state);
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the pipeline
pub mod error;

/// Pipeline configuration
pub mod config;

/// Schema registry
pub mod schema;

/// Legacy text and Parquet codecs
pub mod codec;

/// Object storage adapter
pub mod storage;

/// Object-created event channel
pub mod events;

/// Stage transition engine
pub mod transition;

/// Cleaning rule engine
pub mod clean;

/// Pipeline stages
pub mod stages;

/// Cycle orchestrator
pub mod orchestrator;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};

// Re-export commonly used types
pub use config::PipelineConfig;
pub use orchestrator::{run_pipeline, Orchestrator, OrchestratorState, RunSummary};
pub use schema::{Schema, SemanticType};
pub use storage::ObjectStorage;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
