//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ProcureFlow staged ETL pipeline
#[derive(Parser, Debug)]
#[command(name = "procureflow")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Pipeline configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Storage backend, overrides the config file
    #[arg(long, global = true)]
    pub storage: Option<StorageBackend>,

    /// Root directory for the local backend
    #[arg(long, global = true)]
    pub root: Option<String>,

    /// Bucket name, overrides the config file
    #[arg(short, long, global = true)]
    pub bucket: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write one batch of synthetic legacy files into the landing zone
    Generate,

    /// Convert landing files to raw Parquet files
    Ingest,

    /// Clean raw files into the clean zone
    Clean {
        /// Object-created notification document (JSON)
        #[arg(long, conflicts_with = "key", required_unless_present = "key")]
        event_json: Option<String>,

        /// Raw object key to clean
        #[arg(long)]
        key: Option<String>,
    },

    /// Run generate, ingest and clean for a number of cycles
    Orchestrate {
        /// Number of cycles, overrides the config file
        #[arg(long)]
        cycles: Option<u32>,

        /// Seconds between cycles, overrides the config file
        #[arg(long)]
        cooldown: Option<u64>,
    },

    /// Print the legacy transaction schema
    Schema,
}

/// Storage backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum StorageBackend {
    /// AWS S3
    S3,
    /// Google Cloud Storage
    Gcs,
    /// Azure Blob Storage
    Azure,
    /// Local filesystem (see --root)
    Local,
    /// In-process memory; nothing survives the command
    Memory,
}
