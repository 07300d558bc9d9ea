// ============================================================
// Layer 2 - PrepareUseCase
// ============================================================
// Prepares every dataset the summarization model trains on:
//
//   Step 1: Document dictionary (articles)   (Layer 4 - data)
//   Step 2: Summary dictionary (titles)      (Layer 4 - data)
//   Step 3: Encode training pairs            (Layer 4 - data)
//   Step 4: Encode validation pairs          (Layer 4 - data)
//   Step 5: Encode test articles             (Layer 4 - data)
//   Step 6: Log coverage + save config       (Layer 6 - infra)
//
// Articles and titles get separate dictionaries: the encoder
// and decoder of the model have separate embedding tables.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::data::{
    loader::{encode_corpus, load_or_build_dictionary, load_test_data},
    preprocessor::Preprocessor,
};
use crate::domain::{corpus::EncodedCorpus, dictionary::Dictionary};
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{CoverageLogger, SplitCoverage},
};

pub const PREPARE_CONFIG_FILE: &str = "prepare_config.json";

// ─── Prepare Configuration ───────────────────────────────────────────────────
// File names are relative to `data_dir`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrepareConfig {
    pub data_dir:      String,
    pub train_doc:     String,
    pub train_sum:     String,
    pub valid_doc:     Option<String>,
    pub valid_sum:     Option<String>,
    pub test_doc:      Option<String>,
    pub doc_dict:      String,
    pub sum_dict:      String,
    pub max_doc_vocab: Option<usize>,
    pub max_sum_vocab: Option<usize>,
}

impl Default for PrepareConfig {
    fn default() -> Self {
        Self {
            data_dir:      "data".to_string(),
            train_doc:     "train.article.txt".to_string(),
            train_sum:     "train.title.txt".to_string(),
            valid_doc:     Some("valid.article.filter.txt".to_string()),
            valid_sum:     Some("valid.title.filter.txt".to_string()),
            test_doc:      Some("test.giga.txt".to_string()),
            doc_dict:      "doc_dict.txt".to_string(),
            sum_dict:      "sum_dict.txt".to_string(),
            max_doc_vocab: Some(30000),
            max_sum_vocab: Some(30000),
        }
    }
}

impl PrepareConfig {
    /// Resolve a file name against `data_dir`
    pub fn path(&self, file: &str) -> PathBuf {
        Path::new(&self.data_dir).join(file)
    }
}

/// Everything produced by a prepare run
#[derive(Debug)]
pub struct PreparedData {
    pub doc_dict:   Dictionary,
    pub sum_dict:   Dictionary,
    pub train_docs: EncodedCorpus,
    pub train_sums: EncodedCorpus,
    pub valid_docs: Option<EncodedCorpus>,
    pub valid_sums: Option<EncodedCorpus>,
    pub test_docs:  Option<EncodedCorpus>,
}

// ─── PrepareUseCase ──────────────────────────────────────────────────────────
pub struct PrepareUseCase {
    config: PrepareConfig,
}

impl PrepareUseCase {
    pub fn new(config: PrepareConfig) -> Self {
        Self { config }
    }

    /// Run the full preparation pipeline end to end
    pub fn execute(&self) -> Result<PreparedData> {
        let cfg = &self.config;
        let coverage_log = CoverageLogger::new(&cfg.data_dir)?;

        // ── Step 1 + 2: Dictionaries ──────────────────────────────────────────
        let doc_dict = load_or_build_dictionary(
            "document",
            cfg.path(&cfg.train_doc),
            cfg.path(&cfg.doc_dict),
            cfg.max_doc_vocab,
        )?;
        let sum_dict = load_or_build_dictionary(
            "summary",
            cfg.path(&cfg.train_sum),
            cfg.path(&cfg.sum_dict),
            cfg.max_sum_vocab,
        )?;

        // ── Step 3: Training pairs ────────────────────────────────────────────
        let train_docs = encode_corpus(cfg.path(&cfg.train_doc), &doc_dict)?;
        let train_sums = encode_corpus(cfg.path(&cfg.train_sum), &sum_dict)?;
        check_pairs("train", &train_docs, &train_sums);
        coverage_log.log(&SplitCoverage::from_corpus("train", doc_dict.name(), &train_docs))?;
        coverage_log.log(&SplitCoverage::from_corpus("train", sum_dict.name(), &train_sums))?;

        // ── Step 4: Validation pairs ──────────────────────────────────────────
        let (valid_docs, valid_sums) = match (&cfg.valid_doc, &cfg.valid_sum) {
            (Some(doc), Some(sum)) => {
                tracing::info!("Load validation document from '{}'", cfg.path(doc).display());
                let docs = encode_corpus(cfg.path(doc), &doc_dict)?;
                let sums = encode_corpus(cfg.path(sum), &sum_dict)?;
                check_pairs("valid", &docs, &sums);
                coverage_log.log(&SplitCoverage::from_corpus("valid", doc_dict.name(), &docs))?;
                coverage_log.log(&SplitCoverage::from_corpus("valid", sum_dict.name(), &sums))?;
                (Some(docs), Some(sums))
            }
            (None, None) => (None, None),
            _ => anyhow::bail!("valid_doc and valid_sum must be given together"),
        };

        // ── Step 5: Test articles (digits normalised) ─────────────────────────
        let test_docs = match &cfg.test_doc {
            Some(doc) => {
                let docs = load_test_data(cfg.path(doc), &doc_dict, &Preprocessor::new())?;
                coverage_log.log(&SplitCoverage::from_corpus("test", doc_dict.name(), &docs))?;
                Some(docs)
            }
            None => None,
        };

        // ── Step 6: Save config next to the data ──────────────────────────────
        CheckpointManager::new(&cfg.data_dir)
            .save_config(PREPARE_CONFIG_FILE, cfg)
            .context("Cannot save prepare config")?;

        Ok(PreparedData {
            doc_dict,
            sum_dict,
            train_docs,
            train_sums,
            valid_docs,
            valid_sums,
            test_docs,
        })
    }
}

/// Articles and titles are line-aligned; a count mismatch usually
/// means one file was truncated.
fn check_pairs(split: &str, docs: &EncodedCorpus, sums: &EncodedCorpus) {
    if docs.len() != sums.len() {
        tracing::warn!(
            "{} split has {} documents but {} summaries",
            split,
            docs.len(),
            sums.len()
        );
    }
}
