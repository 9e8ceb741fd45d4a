//! Tests for orchestrator module

use super::*;
use crate::config::StorageConfig;
use crate::stages::Stage;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

/// Records every call into a shared log; fails on the configured call
struct ScriptedStage {
    name: &'static str,
    calls: AtomicU32,
    fail_on_call: Option<u32>,
    log: Arc<Mutex<Vec<String>>>,
}

impl ScriptedStage {
    fn new(name: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            name,
            calls: AtomicU32::new(0),
            fail_on_call: None,
            log: Arc::clone(log),
        }
    }

    fn failing_on(mut self, call: u32) -> Self {
        self.fail_on_call = Some(call);
        self
    }
}

#[async_trait]
impl Stage for ScriptedStage {
    fn name(&self) -> &str {
        self.name
    }

    async fn run(&self) -> crate::error::Result<()> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.log
            .lock()
            .unwrap()
            .push(format!("{}#{call}", self.name));
        if self.fail_on_call == Some(call) {
            return Err(Error::decode("unreadable batch"));
        }
        Ok(())
    }
}

fn quick_config(cycles: u32) -> PipelineConfig {
    PipelineConfig::default()
        .with_storage(StorageConfig::Memory)
        .with_target_cycles(cycles)
        .with_cooldown_seconds(0)
}

fn new_log() -> Arc<Mutex<Vec<String>>> {
    Arc::new(Mutex::new(Vec::new()))
}

#[tokio::test]
async fn test_runs_every_cycle_in_plan_order() {
    let log = new_log();
    let mut orchestrator = Orchestrator::new(&quick_config(3))
        .register(ScriptedStage::new("clean", &log))
        .register(ScriptedStage::new("ingest", &log))
        .with_plan(["ingest", "clean"]);

    let summary = orchestrator.run().await;

    assert!(summary.is_success());
    assert_eq!(summary.state, OrchestratorState::Completed { cycles: 3 });
    assert_eq!(summary.completed_cycles(), 3);
    assert_eq!(
        *log.lock().unwrap(),
        vec!["ingest#1", "clean#1", "ingest#2", "clean#2", "ingest#3", "clean#3"]
    );
    assert_eq!(orchestrator.state(), &summary.state);
}

#[tokio::test]
async fn test_aborts_on_first_failure() {
    let log = new_log();
    let mut orchestrator = Orchestrator::new(&quick_config(20))
        .register(ScriptedStage::new("ingest", &log).failing_on(3))
        .register(ScriptedStage::new("clean", &log))
        .with_plan(["ingest", "clean"]);

    let summary = orchestrator.run().await;

    assert!(!summary.is_success());
    match &summary.state {
        OrchestratorState::Aborted { cycle, reason } => {
            assert_eq!(*cycle, 3);
            assert!(reason.contains("ingest"));
        }
        other => panic!("expected abort, got {other:?}"),
    }

    // Cycle 3 never reached the clean stage, cycles 4..=20 never started
    let log = log.lock().unwrap();
    assert_eq!(log.last().map(String::as_str), Some("ingest#3"));
    assert_eq!(log.len(), 5);
    assert_eq!(summary.cycles.len(), 3);
    assert_eq!(summary.completed_cycles(), 2);
    assert_eq!(summary.cycles[2].failed_stage.as_deref(), Some("ingest"));
}

#[tokio::test]
async fn test_missing_stage_aborts_before_first_cycle() {
    let log = new_log();
    let mut orchestrator = Orchestrator::new(&quick_config(5))
        .register(ScriptedStage::new("ingest", &log));

    let summary = orchestrator.run().await;

    match &summary.state {
        OrchestratorState::Aborted { cycle, reason } => {
            assert_eq!(*cycle, 0);
            assert!(reason.contains("generate"));
        }
        other => panic!("expected abort, got {other:?}"),
    }
    assert!(summary.cycles.is_empty());
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn test_default_plan() {
    let orchestrator = Orchestrator::new(&quick_config(1));
    assert_eq!(orchestrator.plan(), ["generate", "ingest", "clean"]);
    assert_eq!(orchestrator.state(), &OrchestratorState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_cooldown_between_cycles_only() {
    let log = new_log();
    let mut orchestrator = Orchestrator::new(&quick_config(3))
        .register(ScriptedStage::new("ingest", &log))
        .with_plan(["ingest"])
        .with_cooldown(Duration::from_secs(10));

    let started = tokio::time::Instant::now();
    let summary = orchestrator.run().await;

    assert!(summary.is_success());
    // Two pauses for three cycles
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(20));
    assert!(elapsed < Duration::from_secs(30));
}

#[test]
fn test_state_display() {
    assert_eq!(
        OrchestratorState::Aborted {
            cycle: 3,
            reason: "boom".to_string()
        }
        .to_string(),
        "aborted in cycle 3: boom"
    );
    assert!(OrchestratorState::Completed { cycles: 1 }.is_terminal());
    assert!(!OrchestratorState::Running { cycle: 1 }.is_terminal());
}

#[tokio::test]
async fn test_run_pipeline_end_to_end() {
    let config = quick_config(2).with_batch_shape(2, 10).with_seed(11);
    let storage = ObjectStorage::in_memory(&config.bucket_name);

    let outcome = run_pipeline(&config, storage.clone()).await.unwrap();

    assert!(outcome.run.is_success());
    assert_eq!(outcome.drain.cleaned, 4);
    assert_eq!(outcome.drain.failed, 0);
    assert!(storage.list("landing_zone/").await.unwrap().is_empty());
    assert_eq!(storage.list("raw_data/").await.unwrap().len(), 4);
    assert_eq!(storage.list("clean_data/").await.unwrap().len(), 4);
}
