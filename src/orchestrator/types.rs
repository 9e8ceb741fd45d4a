//! Orchestrator types

use crate::stages::DrainSummary;
use serde::Serialize;

/// Lifecycle of an orchestrator run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum OrchestratorState {
    /// Not started
    Idle,
    /// Executing a cycle
    Running { cycle: u32 },
    /// Every cycle ran
    Completed { cycles: u32 },
    /// Stopped by a failing stage; cycle 0 means before the first cycle
    Aborted { cycle: u32, reason: String },
}

impl OrchestratorState {
    /// Check if the run has finished, successfully or not
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::Aborted { .. })
    }

    /// Check if the run aborted
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted { .. })
    }
}

impl std::fmt::Display for OrchestratorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Running { cycle } => write!(f, "running cycle {cycle}"),
            Self::Completed { cycles } => write!(f, "completed {cycles} cycles"),
            Self::Aborted { cycle, reason } => write!(f, "aborted in cycle {cycle}: {reason}"),
        }
    }
}

/// What happened in one cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleRecord {
    /// 1-based cycle number
    pub cycle: u32,
    /// Stages that ran successfully, in order
    pub stages: Vec<String>,
    /// Stage that failed, ending the run
    pub failed_stage: Option<String>,
    /// Duration in milliseconds, excluding the cooldown
    pub duration_ms: u64,
}

/// Result of an orchestrator run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Final state
    pub state: OrchestratorState,
    /// Cycles that started, in order
    pub cycles: Vec<CycleRecord>,
    /// Total duration in milliseconds
    pub duration_ms: u64,
}

impl RunSummary {
    /// Check if every cycle completed
    pub fn is_success(&self) -> bool {
        matches!(self.state, OrchestratorState::Completed { .. })
    }

    /// Number of cycles that ran without a failure
    pub fn completed_cycles(&self) -> usize {
        self.cycles
            .iter()
            .filter(|c| c.failed_stage.is_none())
            .count()
    }
}

/// Result of a full pipeline run: the cycles plus the cleaner's drain
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// Orchestrator summary
    pub run: RunSummary,
    /// Events handled by the cleaner
    pub drain: DrainSummary,
}
