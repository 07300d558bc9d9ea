// ============================================================
// Layer 6 - Coverage Logger
// ============================================================
// Records how well each dictionary covers each encoded split,
// one CSV row per split.
//
// Output file: <output dir>/coverage.csv
//
// Example CSV output:
//   split,dictionary,documents,tokens,unk,coverage
//   train,document,3803957,118325638,1290077,0.989097
//   valid,summary,189651,1665735,26342,0.984186
//   test,document,1951,60751,3712,0.938898
//
// An empty split has no defined coverage; its cell is left blank.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};

use crate::domain::corpus::EncodedCorpus;

const HEADER: &str = "split,dictionary,documents,tokens,unk,coverage";

/// One row of the coverage report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitCoverage {
    /// "train", "valid" or "test"
    pub split: String,

    /// Name of the dictionary the split was encoded with
    pub dictionary: String,

    pub documents: usize,
    pub tokens:    usize,
    pub unk:       usize,

    /// Fraction of tokens not mapped to <UNK>, None for an empty split
    pub coverage: Option<f64>,
}

impl SplitCoverage {
    /// Summarise an encoded split
    pub fn from_corpus(
        split:      impl Into<String>,
        dictionary: impl Into<String>,
        corpus:     &EncodedCorpus,
    ) -> Self {
        Self {
            split:      split.into(),
            dictionary: dictionary.into(),
            documents:  corpus.len(),
            tokens:     corpus.total_tokens(),
            unk:        corpus.unk_tokens(),
            coverage:   corpus.coverage(),
        }
    }
}

/// Appends coverage rows to a CSV file.
pub struct CoverageLogger {
    csv_path: PathBuf,
}

impl CoverageLogger {
    /// Create a new CoverageLogger.
    /// Writes the CSV header if the file doesn't exist yet.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create '{}'", dir.display()))?;

        let csv_path = dir.join("coverage.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)
                .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
            writeln!(f, "{HEADER}")?;
            tracing::debug!("Created coverage CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one split's coverage as a new row
    pub fn log(&self, row: &SplitCoverage) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;

        let coverage = row
            .coverage
            .map(|c| format!("{c:.6}"))
            .unwrap_or_default();
        writeln!(
            f,
            "{},{},{},{},{},{}",
            row.split, row.dictionary, row.documents, row.tokens, row.unk, coverage,
        )?;

        tracing::debug!(
            "Logged coverage for {} split ({}): {}",
            row.split,
            row.dictionary,
            coverage,
        );
        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}
