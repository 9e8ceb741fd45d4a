//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, StorageBackend};
use crate::config::{PipelineConfig, StorageConfig};
use crate::error::{Error, Result};
use crate::events::StorageEvent;
use crate::orchestrator::run_pipeline;
use crate::schema::Schema;
use crate::stages::{Cleaner, Generator, Ingestor};
use crate::storage::ObjectStorage;
use serde_json::{json, Value};

const DEFAULT_LOCAL_ROOT: &str = "./datalake";

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Generate => self.generate().await,
            Commands::Ingest => self.ingest().await,
            Commands::Clean { event_json, key } => {
                self.clean(event_json.as_deref(), key.as_deref()).await
            }
            Commands::Orchestrate { .. } => self.orchestrate().await,
            Commands::Schema => self.schema(),
        }
    }

    /// Load the config file (or defaults) and apply command-line overrides
    pub fn load_config(&self) -> Result<PipelineConfig> {
        let mut config = match &self.cli.config {
            Some(path) => PipelineConfig::load(path)?,
            None => PipelineConfig::default(),
        };

        if let Some(bucket) = &self.cli.bucket {
            config.bucket_name.clone_from(bucket);
        }

        if let Some(backend) = self.cli.storage {
            config.storage = match backend {
                StorageBackend::S3 => StorageConfig::S3,
                StorageBackend::Gcs => StorageConfig::Gcs,
                StorageBackend::Azure => StorageConfig::Azure,
                StorageBackend::Memory => StorageConfig::Memory,
                StorageBackend::Local => StorageConfig::Local {
                    root: self
                        .cli
                        .root
                        .clone()
                        .unwrap_or_else(|| DEFAULT_LOCAL_ROOT.to_string()),
                },
            };
        } else if let (Some(root), StorageConfig::Local { .. }) = (&self.cli.root, &config.storage) {
            config.storage = StorageConfig::Local { root: root.clone() };
        }

        if let Commands::Orchestrate { cycles, cooldown } = &self.cli.command {
            if let Some(cycles) = *cycles {
                config = config.with_target_cycles(cycles);
            }
            if let Some(seconds) = *cooldown {
                config = config.with_cooldown_seconds(seconds);
            }
        }

        config.validate()?;
        Ok(config)
    }

    fn storage(&self, config: &PipelineConfig) -> Result<ObjectStorage> {
        let storage = ObjectStorage::from_config(config)?;
        tracing::debug!(
            bucket = storage.bucket(),
            scheme = storage.scheme(),
            "Storage ready"
        );
        Ok(storage)
    }

    async fn generate(&self) -> Result<()> {
        let config = self.load_config()?;
        let generator = Generator::new(&config, self.storage(&config)?);
        let keys = generator.generate().await?;

        self.output(&json!({
            "type": "GENERATE",
            "files": keys,
        }));
        Ok(())
    }

    async fn ingest(&self) -> Result<()> {
        let config = self.load_config()?;
        let ingestor = Ingestor::new(&config, self.storage(&config)?);
        let report = ingestor.ingest().await;

        let failures: Vec<Value> = report
            .failures()
            .into_iter()
            .map(|(key, reason)| json!({ "key": key, "reason": reason }))
            .collect();

        self.output(&json!({
            "type": "INGEST",
            "processed": report.processed(),
            "skipped": report.skipped(),
            "written": report.written_keys(),
            "failures": failures,
            "duration_ms": report.duration_ms,
        }));
        Ok(())
    }

    async fn clean(&self, event_json: Option<&str>, key: Option<&str>) -> Result<()> {
        let config = self.load_config()?;
        let cleaner = Cleaner::new(&config, self.storage(&config)?);

        let written = match (event_json, key) {
            (Some(json), _) => cleaner.handle_notification(json).await?,
            (None, Some(key)) => {
                let event = StorageEvent::new(&config.bucket_name, key);
                cleaner.handle(&event).await?.into_iter().collect()
            }
            (None, None) => return Err(Error::missing_field("--event-json or --key")),
        };

        self.output(&json!({
            "type": "CLEAN",
            "status": "Cleaning Complete",
            "written": written,
        }));
        Ok(())
    }

    async fn orchestrate(&self) -> Result<()> {
        let config = self.load_config()?;
        let storage = self.storage(&config)?;
        let outcome = run_pipeline(&config, storage).await?;

        self.output(&json!({
            "type": "ORCHESTRATE",
            "summary": outcome.run,
            "cleaner": outcome.drain,
        }));

        if outcome.run.state.is_aborted() {
            return Err(Error::Other(format!("Pipeline {}", outcome.run.state)));
        }
        Ok(())
    }

    fn schema(&self) -> Result<()> {
        let schema = serde_json::to_value(Schema::legacy_transactions())?;
        self.output(&json!({
            "type": "SCHEMA",
            "schema": schema,
        }));
        Ok(())
    }

    fn output(&self, msg: &Value) {
        println!("{}", serde_json::to_string(msg).unwrap_or_default());
    }
}
