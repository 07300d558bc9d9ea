// ============================================================
// Layer 4 - Corpus Loader
// ============================================================
// Turns line-oriented text files into id-encoded datasets.
//
// Every line of a corpus file is one document. Documents are
// tokenised by splitting on whitespace, nothing more.
//
//   load_or_build_dictionary → reuse a saved dictionary file,
//                              or count the corpus and create one
//   encode_corpus            → training / validation splits
//   load_test_data           → test split, digits normalised first
//
// A missing dictionary file is expected on the first run and
// triggers construction. A missing corpus file is fatal.
//
// Why reuse a saved dictionary instead of always rebuilding?
//   The ids in a saved dictionary are the rows of the model's
//   embedding tables. Once training has started, every later
//   run (validation, test, decoding) must see the same ids, even
//   if the corpus files have been edited in the meantime.
//
// Why are only test documents normalised?
//   The training corpus has already had its digits replaced by
//   '#' upstream, so its dictionary contains '#'-shapes and no
//   raw numbers. Raw test text must get the same treatment or
//   almost every number in it would encode as <UNK>.
//
// Why log coverage for the test split?
//   Coverage is the quickest sign that the test corpus does not
//   match the training corpus (different tokenisation, casing
//   or language). A sharp drop is worth a look before decoding.
//
// Reference: Rust Book §12 (An I/O Project)
//            Rust Book §13 (Iterators)

use anyhow::{Context, Result};
use std::{
    fs::{self, File},
    io::{BufRead, BufReader, Lines},
    path::Path,
};

use crate::data::preprocessor::Preprocessor;
use crate::domain::corpus::EncodedCorpus;
use crate::domain::dictionary::{Dictionary, LoadStatus};

/// Return the dictionary stored at `dict_path`, or build it from
/// `corpus_path` and save it there if the file does not exist yet.
pub fn load_or_build_dictionary(
    name:        &str,
    corpus_path: impl AsRef<Path>,
    dict_path:   impl AsRef<Path>,
    max_vocab:   Option<usize>,
) -> Result<Dictionary> {
    let corpus_path = corpus_path.as_ref();
    let dict_path   = dict_path.as_ref();
    let mut dict    = Dictionary::new(name);

    if dict_path.is_file() {
        tracing::info!("Loading dictionary from '{}'", dict_path.display());
        let status = dict
            .load(dict_path, max_vocab)
            .with_context(|| format!("Cannot load dictionary from '{}'", dict_path.display()))?;
        if let LoadStatus::Loaded(_) = status {
            return Ok(dict);
        }
    }

    tracing::info!(
        "Creating dictionary '{}' from '{}'",
        name,
        corpus_path.display()
    );
    for line in open_lines(corpus_path)? {
        let line = line.with_context(|| format!("Cannot read '{}'", corpus_path.display()))?;
        dict.observe_many(line.split_whitespace());
    }
    dict.build(max_vocab)?;

    if let Some(parent) = dict_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create directory '{}'", parent.display()))?;
    }
    dict.save(dict_path)
        .with_context(|| format!("Cannot save dictionary to '{}'", dict_path.display()))?;

    Ok(dict)
}

/// Encode every line of `path` with an already-built dictionary
pub fn encode_corpus(path: impl AsRef<Path>, dict: &Dictionary) -> Result<EncodedCorpus> {
    let path = path.as_ref();
    tracing::info!("Loading data from '{}'", path.display());

    let mut corpus = EncodedCorpus::new();
    for line in open_lines(path)? {
        let line = line.with_context(|| format!("Cannot read '{}'", path.display()))?;
        let (ids, unk) = dict.encode_counting(line.split_whitespace())?;
        corpus.push(ids, unk);
    }

    tracing::info!(
        "Data ids list created: {} documents, {} tokens",
        corpus.len(),
        corpus.total_tokens()
    );
    Ok(corpus)
}

/// Encode a test corpus: digits are normalised before lookup and
/// the dictionary's coverage is logged.
pub fn load_test_data(
    path:         impl AsRef<Path>,
    dict:         &Dictionary,
    preprocessor: &Preprocessor,
) -> Result<EncodedCorpus> {
    let path = path.as_ref();
    tracing::info!("Load test document from '{}'", path.display());

    let text = fs::read_to_string(path)
        .with_context(|| format!("Cannot read test corpus '{}'", path.display()))?;
    let lines = preprocessor.normalize(text.lines());
    tracing::info!("Load {} testing documents", lines.len());

    let mut corpus = EncodedCorpus::new();
    for line in &lines {
        let (ids, unk) = dict.encode_counting(line.split_whitespace())?;
        corpus.push(ids, unk);
    }

    match corpus.coverage() {
        Some(cover) => tracing::info!(
            "Dictionary '{}' covers {:.2}% words",
            dict.name(),
            cover * 100.0
        ),
        None => tracing::warn!("Test corpus '{}' has no tokens", path.display()),
    }
    Ok(corpus)
}

fn open_lines(path: &Path) -> Result<Lines<BufReader<File>>> {
    let file = File::open(path)
        .with_context(|| format!("Cannot open corpus file '{}'", path.display()))?;
    Ok(BufReader::new(file).lines())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::reserved::ID_UNK;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_builds_and_saves_when_missing() {
        let dir    = TempDir::new().unwrap();
        let corpus = write(&dir, "train.txt", "a b a\nb c\n");
        let dict_path = dir.path().join("dicts/doc_dict.txt");

        let dict = load_or_build_dictionary("document", &corpus, &dict_path, None).unwrap();
        assert_eq!(dict.len(), 7);
        assert_eq!(dict.token_id("a"), Some(4));
        assert!(dict_path.is_file());
    }

    #[test]
    fn test_reuses_existing_dictionary_file() {
        let dir    = TempDir::new().unwrap();
        let corpus = write(&dir, "train.txt", "a b a\nb c\n");
        let dict_path = dir.path().join("doc_dict.txt");
        load_or_build_dictionary("document", &corpus, &dict_path, None).unwrap();

        // Changing the corpus must not change the dictionary on the second run
        write(&dir, "train.txt", "z z z z\n");
        let dict = load_or_build_dictionary("document", &corpus, &dict_path, None).unwrap();
        assert_eq!(dict.token_id("a"), Some(4));
        assert_eq!(dict.token_id("z"), None);
    }

    #[test]
    fn test_missing_corpus_is_fatal() {
        let dir = TempDir::new().unwrap();
        let result = load_or_build_dictionary(
            "document",
            dir.path().join("missing.txt"),
            dir.path().join("dict.txt"),
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_encode_corpus_line_per_document() {
        let dir    = TempDir::new().unwrap();
        let corpus = write(&dir, "train.txt", "a b a\nb c\n");
        let dict   = load_or_build_dictionary("document", &corpus, dir.path().join("d.txt"), None).unwrap();

        let valid   = write(&dir, "valid.txt", "a z\n\nc\n");
        let encoded = encode_corpus(&valid, &dict).unwrap();
        assert_eq!(encoded.docs(), &[vec![4, ID_UNK], vec![], vec![6]]);
        assert_eq!(encoded.unk_tokens(), 1);
        assert_eq!(encoded.total_tokens(), 3);
    }

    #[test]
    fn test_encode_missing_file_is_fatal() {
        let dir  = TempDir::new().unwrap();
        let corpus = write(&dir, "train.txt", "a\n");
        let dict = load_or_build_dictionary("document", &corpus, dir.path().join("d.txt"), None).unwrap();
        assert!(encode_corpus(dir.path().join("nope.txt"), &dict).is_err());
    }

    #[test]
    fn test_test_data_is_normalised() {
        let dir    = TempDir::new().unwrap();
        let corpus = write(&dir, "train.txt", "won ## games\n");
        let dict   = load_or_build_dictionary("document", &corpus, dir.path().join("d.txt"), None).unwrap();

        let test    = write(&dir, "test.txt", "won 12 games\n");
        let encoded = load_test_data(&test, &dict, &Preprocessor::new()).unwrap();
        assert_eq!(encoded.unk_tokens(), 0);
        assert_eq!(encoded.coverage(), Some(1.0));

        // The same file without normalisation misses the number
        let raw = encode_corpus(&test, &dict).unwrap();
        assert_eq!(raw.unk_tokens(), 1);
    }
}
