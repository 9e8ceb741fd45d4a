//! CLI module
//!
//! Command-line interface for running pipeline stages.
//!
//! # Commands
//!
//! - `generate` - Write synthetic legacy files to the landing zone
//! - `ingest` - Convert landing files to raw Parquet
//! - `clean` - Clean one raw object or a notification document
//! - `orchestrate` - Run the full pipeline for a number of cycles
//! - `schema` - Print the legacy transaction schema

mod commands;
mod runner;

pub use commands::{Cli, Commands, StorageBackend};
pub use runner::Runner;
