// ============================================================
// Layer 2 - Training Driver
// ============================================================
// Advances the external training process in bounded step
// windows and evaluates after each window:
//
//   step = persisted global step (0 if none)
//   while step < max_steps:
//       target = min(max(step + steps_per_checkpoint, test_threshold), max_steps)
//       trainer.train(step → target)
//       persist step
//       evaluator.evaluate(step)
//
// The first window jumps straight to `test_threshold`, so no
// evaluation happens before the model has trained that far.
// After that every window is `steps_per_checkpoint` long.
//
// With the defaults:
//   0 → 200000 → 220000 → 240000 → 260000 → 280000 → 300000
//
// Why persist the step after every window?
//   Training runs for days. If the process dies, the next run
//   reads global_step.json and resumes at the last completed
//   window rather than at step 0.
//
// Why bail when the trainer does not advance?
//   A trainer that keeps reporting the same step would make the
//   loop spin forever. A short window is only warned about; the
//   next window starts from whatever step was really reached.
//
// Reference: Rust Book §10 (Generic Types, Traits)
//            Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::traits::{Evaluator, StepBudget, TrainingProcess};
use crate::infra::checkpoint::CheckpointManager;

pub const DRIVER_CONFIG_FILE: &str = "driver_config.json";

// ─── Driver Configuration ────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Directory holding the model checkpoint and global_step.json
    pub model_dir:            String,
    pub max_steps:            u64,
    pub steps_per_validation: u64,
    pub steps_per_checkpoint: u64,
    /// Global step below which no evaluation is run
    pub test_threshold:       u64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            model_dir:            "model".to_string(),
            max_steps:            300_000,
            steps_per_validation: 1_000,
            steps_per_checkpoint: 20_000,
            test_threshold:       200_000,
        }
    }
}

impl DriverConfig {
    /// Reject settings that would make the driver stall
    pub fn validate(&self) -> Result<()> {
        if self.steps_per_checkpoint == 0 {
            anyhow::bail!("steps_per_checkpoint must be greater than 0");
        }
        if self.steps_per_validation == 0 {
            anyhow::bail!("steps_per_validation must be greater than 0");
        }
        Ok(())
    }

    /// Step the window starting at `global_step` trains up to
    pub fn next_target(&self, global_step: u64) -> u64 {
        global_step
            .saturating_add(self.steps_per_checkpoint)
            .max(self.test_threshold)
            .min(self.max_steps)
    }

    /// The window starting at `global_step`
    pub fn budget(&self, global_step: u64) -> StepBudget {
        StepBudget {
            start_step:           global_step,
            target_step:          self.next_target(global_step),
            steps_per_validation: self.steps_per_validation,
            steps_per_checkpoint: self.steps_per_checkpoint,
        }
    }

    /// All windows a run starting at `global_step` would go through,
    /// assuming every window reaches its target
    pub fn plan(&self, global_step: u64) -> Vec<StepBudget> {
        let mut windows = Vec::new();
        let mut step = global_step;
        while step < self.max_steps {
            let budget = self.budget(step);
            if budget.target_step <= step {
                break;
            }
            step = budget.target_step;
            windows.push(budget);
        }
        windows
    }
}

// ─── TrainingDriver ──────────────────────────────────────────────────────────
pub struct TrainingDriver<T, E> {
    config:      DriverConfig,
    checkpoints: CheckpointManager,
    trainer:     T,
    evaluator:   E,
}

impl<T: TrainingProcess, E: Evaluator> TrainingDriver<T, E> {
    pub fn new(config: DriverConfig, trainer: T, evaluator: E) -> Self {
        let checkpoints = CheckpointManager::new(&config.model_dir);
        Self { config, checkpoints, trainer, evaluator }
    }

    /// Train until `max_steps`, resuming from the persisted step.
    /// Returns the final global step.
    pub fn run(&mut self) -> Result<u64> {
        self.config.validate()?;
        self.checkpoints.save_config(DRIVER_CONFIG_FILE, &self.config)?;

        let mut step = self.checkpoints.global_step()?;
        tracing::info!("Training starts with global_step={}", step);

        while step < self.config.max_steps {
            let budget = self.config.budget(step);
            tracing::info!("Train from {} to {}", budget.start_step, budget.target_step);

            let reached = self
                .trainer
                .train(&budget)
                .with_context(|| format!("Training from step {} failed", step))?;
            if reached <= step {
                anyhow::bail!(
                    "Training process did not advance past step {} (reported {})",
                    step,
                    reached
                );
            }
            if reached < budget.target_step {
                tracing::warn!(
                    "Training stopped at step {} before target {}",
                    reached,
                    budget.target_step
                );
            }

            self.checkpoints.save_global_step(reached)?;
            step = reached;

            self.evaluator
                .evaluate(step)
                .with_context(|| format!("Evaluation at step {} failed", step))?;
        }

        tracing::info!("Training finished at global_step={}", step);
        Ok(step)
    }

    pub fn into_parts(self) -> (T, E) {
        (self.trainer, self.evaluator)
    }
}
