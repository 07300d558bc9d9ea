// ============================================================
// Layer 2 - EncodeUseCase
// ============================================================
// Encodes a single corpus file with a dictionary and either
// writes the ids out or shows one document for eyeballing.
//
// Output format, one line per document:
//
//   4 17 1 230 5
//   88 4 1021
//
// When the dictionary file is missing it is built from
// `corpus` (or from the input itself) and saved first.

use anyhow::{Context, Result};
use rand::Rng;
use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::PathBuf,
};

use crate::data::{
    loader::{encode_corpus, load_or_build_dictionary, load_test_data},
    preprocessor::Preprocessor,
};
use crate::domain::{
    corpus::EncodedCorpus,
    dictionary::{Dictionary, TokenId},
};

#[derive(Debug, Clone)]
pub struct EncodeConfig {
    /// Corpus to encode, one document per line
    pub input: PathBuf,
    /// Dictionary file to load, or to create if missing
    pub dict: PathBuf,
    /// Corpus to build the dictionary from; defaults to `input`
    pub corpus: Option<PathBuf>,
    /// Diagnostic name of the dictionary
    pub name: String,
    pub max_vocab: Option<usize>,
    /// Replace digits with '#' before lookup (test/inference data)
    pub normalize: bool,
}

/// A document picked from a corpus, with its decoded tokens
#[derive(Debug)]
pub struct Sample {
    pub index:  usize,
    pub ids:    Vec<TokenId>,
    pub tokens: Vec<String>,
}

pub struct EncodeUseCase {
    config: EncodeConfig,
    dict:   Dictionary,
}

impl EncodeUseCase {
    /// Load (or build) the dictionary the config points at
    pub fn new(config: EncodeConfig) -> Result<Self> {
        let corpus = config.corpus.as_ref().unwrap_or(&config.input);
        let dict = load_or_build_dictionary(&config.name, corpus, &config.dict, config.max_vocab)?;
        Ok(Self { config, dict })
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dict
    }

    /// Encode the configured input file
    pub fn encode(&self) -> Result<EncodedCorpus> {
        if self.config.normalize {
            load_test_data(&self.config.input, &self.dict, &Preprocessor::new())
        } else {
            encode_corpus(&self.config.input, &self.dict)
        }
    }

    /// Encode and write ids to `output`, or stdout when `None`
    pub fn encode_to(&self, output: Option<&PathBuf>) -> Result<EncodedCorpus> {
        let corpus = self.encode()?;
        match output {
            Some(path) => {
                let file = File::create(path)
                    .with_context(|| format!("Cannot create '{}'", path.display()))?;
                let mut out = BufWriter::new(file);
                write_encoded(&corpus, &mut out)?;
                out.flush()?;
                tracing::info!("Wrote {} encoded documents to '{}'", corpus.len(), path.display());
            }
            None => {
                let stdout = io::stdout();
                let mut out = stdout.lock();
                write_encoded(&corpus, &mut out)?;
            }
        }
        Ok(corpus)
    }

    /// Encode the input and return document `index`, or a random one
    pub fn sample(&self, index: Option<usize>) -> Result<Sample> {
        let corpus = self.encode()?;
        if corpus.is_empty() {
            anyhow::bail!("'{}' has no documents", self.config.input.display());
        }

        let index = match index {
            Some(i) if i < corpus.len() => i,
            Some(i) => anyhow::bail!(
                "Document {} out of range, corpus has {} documents",
                i,
                corpus.len()
            ),
            None => rand::thread_rng().gen_range(0..corpus.len()),
        };

        let ids = corpus.into_docs().swap_remove(index);
        let tokens = self
            .dict
            .decode(&ids)?
            .into_iter()
            .map(str::to_string)
            .collect();
        Ok(Sample { index, ids, tokens })
    }
}

/// Write one line per document, ids separated by single spaces
pub fn write_encoded<W: Write>(corpus: &EncodedCorpus, out: &mut W) -> io::Result<()> {
    for doc in corpus.docs() {
        let line = doc
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(out, "{line}")?;
    }
    Ok(())
}
