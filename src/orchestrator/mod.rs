//! Orchestrator module
//!
//! Runs a fixed number of cycles. Each cycle executes the planned stages in
//! order; the first failing stage aborts the whole run. Cycles are paced by
//! a cooldown.
//!
//! # Example
//!
//! ```ignore
//! use procureflow::orchestrator::Orchestrator;
//!
//! let mut orchestrator = Orchestrator::new(&config)
//!     .register(generator)
//!     .register(ingestor)
//!     .register(trigger);
//! let summary = orchestrator.run().await;
//! ```

mod types;

pub use types::{CycleRecord, OrchestratorState, PipelineOutcome, RunSummary};

use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::events::EventBus;
use crate::stages::{names, CleanTrigger, Cleaner, Generator, Ingestor, Stage};
use crate::storage::ObjectStorage;
use std::time::{Duration, Instant};

/// Drives stages through a fixed number of cycles
pub struct Orchestrator {
    target_cycles: u32,
    cooldown: Duration,
    stages: Vec<Box<dyn Stage>>,
    plan: Vec<String>,
    state: OrchestratorState,
}

impl Orchestrator {
    /// Create an orchestrator with the default plan: generate, ingest, clean
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            target_cycles: config.target_cycles,
            cooldown: config.cooldown(),
            stages: Vec::new(),
            plan: vec![
                names::GENERATE.to_string(),
                names::INGEST.to_string(),
                names::CLEAN.to_string(),
            ],
            state: OrchestratorState::Idle,
        }
    }

    /// Make a stage available to the plan
    #[must_use]
    pub fn register(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Stage names to run in every cycle, in order
    #[must_use]
    pub fn with_plan<I, S>(mut self, plan: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.plan = plan.into_iter().map(Into::into).collect();
        self
    }

    /// Override the number of cycles
    #[must_use]
    pub fn with_target_cycles(mut self, cycles: u32) -> Self {
        self.target_cycles = cycles;
        self
    }

    /// Override the pause between cycles
    #[must_use]
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Current state
    pub fn state(&self) -> &OrchestratorState {
        &self.state
    }

    /// Planned stage names
    pub fn plan(&self) -> &[String] {
        &self.plan
    }

    fn stage(&self, name: &str) -> Option<&dyn Stage> {
        self.stages
            .iter()
            .find(|s| s.name() == name)
            .map(|s| &**s)
    }

    /// Every planned stage must be registered before the first cycle
    fn check_plan(&self) -> Result<()> {
        match self.plan.iter().find(|name| self.stage(name).is_none()) {
            Some(missing) => Err(Error::MissingStage {
                stage: missing.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Run every cycle
    ///
    /// Never returns an error; failures end up in the summary's
    /// [`OrchestratorState::Aborted`] state.
    pub async fn run(&mut self) -> RunSummary {
        let start = Instant::now();
        let mut cycles = Vec::new();

        if let Err(e) = self.check_plan() {
            tracing::error!("Cannot start: {e}");
            self.state = OrchestratorState::Aborted {
                cycle: 0,
                reason: e.to_string(),
            };
            return self.summary(cycles, start);
        }

        tracing::info!(
            cycles = self.target_cycles,
            plan = ?self.plan,
            "Starting automated pipeline"
        );

        for cycle in 1..=self.target_cycles {
            self.state = OrchestratorState::Running { cycle };
            tracing::info!("CYCLE {cycle} / {}", self.target_cycles);

            let (record, failure) = self.run_cycle(cycle).await;
            cycles.push(record);

            if let Some(e) = failure {
                tracing::error!("Stopping pipeline in cycle {cycle}: {e}");
                self.state = OrchestratorState::Aborted {
                    cycle,
                    reason: e.to_string(),
                };
                return self.summary(cycles, start);
            }

            if cycle < self.target_cycles && !self.cooldown.is_zero() {
                tracing::info!("Cooling down for {}s...", self.cooldown.as_secs());
                tokio::time::sleep(self.cooldown).await;
            }
        }

        tracing::info!("Pipeline finished all {} cycles", self.target_cycles);
        self.state = OrchestratorState::Completed {
            cycles: self.target_cycles,
        };
        self.summary(cycles, start)
    }

    async fn run_cycle(&self, cycle: u32) -> (CycleRecord, Option<Error>) {
        let start = Instant::now();
        let mut record = CycleRecord {
            cycle,
            stages: Vec::new(),
            failed_stage: None,
            duration_ms: 0,
        };
        let mut failure = None;

        for name in &self.plan {
            let Some(stage) = self.stage(name) else {
                failure = Some(Error::MissingStage { stage: name.clone() });
                record.failed_stage = Some(name.clone());
                break;
            };

            tracing::debug!(cycle, stage = %name, "Running stage");
            match stage.run().await {
                Ok(()) => record.stages.push(name.clone()),
                Err(e) => {
                    failure = Some(Error::stage_failed(name, e.to_string()));
                    record.failed_stage = Some(name.clone());
                    break;
                }
            }
        }

        record.duration_ms = start.elapsed().as_millis() as u64;
        (record, failure)
    }

    fn summary(&self, cycles: Vec<CycleRecord>, start: Instant) -> RunSummary {
        RunSummary {
            state: self.state.clone(),
            cycles,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }
}

/// Wire the standard pipeline and run it to the end
///
/// Raw-zone writes publish events to a cleaner task. After the last cycle
/// the stages are dropped, which closes the channel, and the cleaner drains
/// whatever is still queued before this returns.
pub async fn run_pipeline(config: &PipelineConfig, storage: ObjectStorage) -> Result<PipelineOutcome> {
    let (publisher, receiver) = EventBus::unbounded();
    let publishing = storage
        .clone()
        .with_events(publisher.clone(), config.raw_prefix.clone());

    let cleaner = Cleaner::new(config, storage);
    let cleaning = tokio::spawn(async move { cleaner.run(receiver).await });

    let mut orchestrator = Orchestrator::new(config)
        .register(Generator::new(config, publishing.clone()))
        .register(Ingestor::new(config, publishing))
        .register(CleanTrigger::new(publisher));

    let run = orchestrator.run().await;
    drop(orchestrator);

    let drain = cleaning
        .await
        .map_err(|e| Error::Other(format!("Cleaner task failed: {e}")))?;

    Ok(PipelineOutcome { run, drain })
}

#[cfg(test)]
mod tests;
