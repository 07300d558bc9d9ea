// ============================================================
// Layer 3 - Collaborator Traits
// ============================================================
// The model itself is trained and evaluated outside this crate.
// The training driver only needs two things from the outside
// world, expressed as traits:
//
//   TrainingProcess → advance the model to a target step
//   Evaluator       → score the latest checkpoint
//
// Anything that can do that (a subprocess wrapper, a remote job
// queue, a test double) can be plugged into the driver.

use anyhow::Result;
use serde::{Deserialize, Serialize};

// ─── StepBudget ───────────────────────────────────────────────────────────────
/// One training window handed to the training process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepBudget {
    /// Global step the run resumes from
    pub start_step: u64,

    /// Global step the run must stop at
    pub target_step: u64,

    /// Run validation every this many steps
    pub steps_per_validation: u64,

    /// Write a checkpoint every this many steps
    pub steps_per_checkpoint: u64,
}

impl StepBudget {
    /// Number of steps in this window
    pub fn steps(&self) -> u64 {
        self.target_step.saturating_sub(self.start_step)
    }
}

// ─── TrainingProcess ──────────────────────────────────────────────────────────
/// Anything that can train the summarization model for a step budget.
pub trait TrainingProcess {
    /// Train until `budget.target_step`, persist a checkpoint, and
    /// return the global step actually reached.
    fn train(&mut self, budget: &StepBudget) -> Result<u64>;
}

// ─── Evaluator ────────────────────────────────────────────────────────────────
/// Anything that can evaluate the latest checkpoint.
/// Metrics are a side effect; nothing is returned to the driver.
pub trait Evaluator {
    fn evaluate(&mut self, global_step: u64) -> Result<()>;
}
