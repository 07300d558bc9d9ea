// ============================================================
// Layer 6 - Checkpoint Manager
// ============================================================
// The model weights themselves are written by the external
// training process. This crate only owns the bookkeeping that
// sits next to them:
//
//   model/
//     global_step.json     ← last completed training step
//     driver_config.json   ← step-window settings of the run
//
//   <output dir>/
//     prepare_config.json  ← corpus/dictionary paths of the run
//
// global_step.json holds a bare JSON integer, e.g. `220000`.
// A missing file means training has not started: step 0.
//
// Why is an unreadable step file an error and not step 0?
//   Falling back to 0 would make the driver restart the first
//   window from scratch and overwrite a long-trained checkpoint.
//   Only a file that does not exist at all means a fresh run.
//
// Why save the configs next to the run?
//   A resumed run must use the same dictionaries and step
//   windows as the run that produced the checkpoint. Keeping
//   the JSON beside the data makes it easy to compare.
//
// Reference: Rust Book §9 (Error Handling)
//            serde_json documentation (to_string_pretty, from_str)

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::{fs, io::ErrorKind, path::PathBuf};

const GLOBAL_STEP_FILE: &str = "global_step.json";

/// Reads and writes run bookkeeping inside one directory.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Last persisted global step, or 0 if training has not run yet
    pub fn global_step(&self) -> Result<u64> {
        let path = self.dir.join(GLOBAL_STEP_FILE);

        let s = match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!("No '{}' found, starting from step 0", path.display());
                return Ok(0);
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Cannot read '{}'", path.display()));
            }
        };

        serde_json::from_str::<u64>(s.trim())
            .with_context(|| format!("'{}' does not hold a step number", path.display()))
    }

    /// Persist the global step reached by the last training window
    pub fn save_global_step(&self, step: u64) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;

        let path = self.dir.join(GLOBAL_STEP_FILE);
        fs::write(&path, serde_json::to_string(&step)?)
            .with_context(|| format!("Cannot write '{}'", path.display()))?;

        tracing::debug!("Saved global step {}", step);
        Ok(())
    }

    /// Save any serialisable config as pretty JSON under `file_name`
    pub fn save_config<T: Serialize>(&self, file_name: &str, cfg: &T) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;

        let path = self.dir.join(file_name);
        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved config to '{}'", path.display());
        Ok(())
    }

    /// Load a config previously written by [`CheckpointManager::save_config`]
    pub fn load_config<T: DeserializeOwned>(&self, file_name: &str) -> Result<T> {
        let path = self.dir.join(file_name);
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read config from '{}'", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Cannot parse config '{}'", path.display()))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[test]
    fn test_missing_step_file_means_zero() {
        let dir  = TempDir::new().unwrap();
        let ckpt = CheckpointManager::new(dir.path().join("model"));
        assert_eq!(ckpt.global_step().unwrap(), 0);
    }

    #[test]
    fn test_step_roundtrip() {
        let dir  = TempDir::new().unwrap();
        let ckpt = CheckpointManager::new(dir.path().join("model"));
        ckpt.save_global_step(220_000).unwrap();
        assert_eq!(ckpt.global_step().unwrap(), 220_000);
    }

    #[test]
    fn test_garbage_step_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(GLOBAL_STEP_FILE), "not a number").unwrap();
        let ckpt = CheckpointManager::new(dir.path());
        assert!(ckpt.global_step().is_err());
    }

    #[test]
    fn test_config_roundtrip() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Cfg {
            name:  String,
            limit: Option<usize>,
        }

        let dir  = TempDir::new().unwrap();
        let ckpt = CheckpointManager::new(dir.path());
        let cfg  = Cfg { name: "doc".into(), limit: Some(30000) };
        ckpt.save_config("cfg.json", &cfg).unwrap();
        assert_eq!(ckpt.load_config::<Cfg>("cfg.json").unwrap(), cfg);
    }
}
