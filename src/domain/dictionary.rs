// ============================================================
// Layer 3 - Dictionary
// ============================================================
// A corpus-derived vocabulary with bidirectional token/id lookup.
//
// Lifecycle:
//
//   Dictionary::new(name)
//       │
//       ▼
//   observe / observe_many   → counts word frequencies
//       │
//       ▼
//   build(max_vocab)         → freezes token→id and id→token,
//       │                      drops the frequency counter
//       ▼
//   encode / decode / save
//
// A dictionary can also skip the counting phase entirely and be
// populated from a dictionary file with `load`.
//
// Why must ties keep first-seen order?
//   The dictionary file is written once and then reused by every
//   later run, and the model's embedding rows are indexed by id.
//   If two equally frequent words could swap places between runs,
//   a dictionary rebuilt from the same corpus would silently
//   disagree with a checkpoint trained on the old one. A stable
//   sort over first-seen order makes `build` deterministic.
//
// Why are the reserved tokens never truncated?
//   The training process hard-codes ids 0..3. A `max_vocab` below
//   four is raised to four, both when building and when loading,
//   so <UNK> always exists for `encode` to fall back on.
//
// File format, one entry per line in ascending id order:
//
//   0 <PAD>
//   1 <UNK>
//   2 <EOS>
//   3 <GO>
//   4 the
//   ...
//
// Tokens are whitespace-separated in the file, so a token that is
// empty or contains whitespace can never be stored. `observe`
// rejects such tokens up front instead of writing a file that
// `load` would refuse.
//
// Reference: Rust Book §8.3 (Storing Keys with Associated Values in Hash Maps)
//            Rust Book §9 (Error Handling)

use std::{
    collections::{HashMap, HashSet},
    fs,
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::Path,
};
use thiserror::Error;

use super::reserved::{is_reserved, ID_UNK, MARKS};

/// Integer id of a vocabulary entry
pub type TokenId = u32;

/// Errors that can occur while building, persisting or using a dictionary
#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("Dictionary '{0}' has not been built or loaded yet")]
    Unbuilt(String),

    #[error("Dictionary '{0}' has already been built")]
    AlreadyBuilt(String),

    #[error("Id not found in dictionary: {0}")]
    UnknownId(TokenId),

    #[error("Malformed dictionary file at line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Outcome of [`Dictionary::load`].
///
/// A missing file is not an error: callers fall back to
/// building the dictionary from a corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    /// The file was read; carries the number of entries
    Loaded(usize),
    /// The file does not exist or could not be opened
    NotFound,
}

/// Word counts in first-seen order.
#[derive(Debug, Default)]
struct FrequencyCounter {
    index: HashMap<String, usize>,
    entries: Vec<(String, u64)>,
}

impl FrequencyCounter {
    fn add(&mut self, word: &str) {
        if !is_storable(word) {
            tracing::warn!("Ignoring token {:?}: empty or contains whitespace", word);
            return;
        }
        match self.index.get(word) {
            Some(&i) => self.entries[i].1 += 1,
            None => {
                self.index.insert(word.to_string(), self.entries.len());
                self.entries.push((word.to_string(), 1));
            }
        }
    }
}

/// True if `word` survives a save/load cycle as a single field
fn is_storable(word: &str) -> bool {
    !word.is_empty() && !word.chars().any(char::is_whitespace)
}

/// Raise `max_vocab` so it never cuts into the reserved tokens
fn clamp_max_vocab(name: &str, max_vocab: Option<usize>) -> Option<usize> {
    max_vocab.map(|max| {
        if max < MARKS.len() {
            tracing::warn!(
                "max_vocab={} of dictionary '{}' is smaller than the {} reserved tokens, using {}",
                max,
                name,
                MARKS.len(),
                MARKS.len()
            );
            MARKS.len()
        } else {
            max
        }
    })
}

#[derive(Debug)]
pub struct Dictionary {
    /// Diagnostic label used in log lines ("document", "summary", ...)
    name: String,

    /// Present until the dictionary is finalized
    counter: Option<FrequencyCounter>,

    token_to_id: HashMap<String, TokenId>,

    /// Dense: the token with id `i` lives at index `i`
    id_to_token: Vec<String>,
}

impl Dictionary {
    /// Create an empty, unbuilt dictionary
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            counter: Some(FrequencyCounter::default()),
            token_to_id: HashMap::new(),
            id_to_token: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of entries, reserved tokens included. Zero until built.
    pub fn len(&self) -> usize {
        self.id_to_token.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_token.is_empty()
    }

    /// True once `build` or a successful `load` has run
    pub fn is_built(&self) -> bool {
        self.counter.is_none()
    }

    /// Count one occurrence of `word`.
    ///
    /// Observations after finalization are ignored with a warning, as are
    /// empty tokens and tokens containing whitespace.
    pub fn observe(&mut self, word: &str) {
        match self.counter.as_mut() {
            Some(counter) => counter.add(word),
            None => tracing::warn!(
                "Dictionary '{}' is already built, ignoring '{}'",
                self.name,
                word
            ),
        }
    }

    /// Count one occurrence of every word in `words`
    pub fn observe_many<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let Some(counter) = self.counter.as_mut() else {
            tracing::warn!(
                "Dictionary '{}' is already built, ignoring new observations",
                self.name
            );
            return;
        };
        for word in words {
            counter.add(word.as_ref());
        }
    }

    /// Finalize the vocabulary and return its size.
    ///
    /// Reserved tokens found in the corpus are dropped from the counts.
    /// The remaining words are ranked by descending frequency, ties kept
    /// in first-seen order, and placed after `<PAD> <UNK> <EOS> <GO>`.
    /// `max_vocab` caps the total size; it never cuts into the reserved
    /// tokens.
    pub fn build(&mut self, max_vocab: Option<usize>) -> Result<usize, DictionaryError> {
        let counter = self
            .counter
            .take()
            .ok_or_else(|| DictionaryError::AlreadyBuilt(self.name.clone()))?;

        tracing::info!("Start creating dictionary '{}'", self.name);

        let mut ranked = Vec::with_capacity(counter.entries.len());
        for (word, count) in counter.entries {
            if is_reserved(&word) {
                tracing::warn!(
                    "{} appears in corpus of dictionary '{}' ({} times)",
                    word,
                    self.name,
                    count
                );
                continue;
            }
            ranked.push((word, count));
        }

        // sort_by is stable, so equal counts keep first-seen order
        ranked.sort_by(|a, b| b.1.cmp(&a.1));

        let mut words: Vec<String> = MARKS
            .iter()
            .map(|m| m.to_string())
            .chain(ranked.into_iter().map(|(word, _)| word))
            .collect();

        if let Some(max) = clamp_max_vocab(&self.name, max_vocab) {
            words.truncate(max);
        }

        self.install(words);

        tracing::info!(
            "Dictionary '{}' has been created with {} tokens",
            self.name,
            self.len()
        );
        Ok(self.len())
    }

    /// Write the dictionary to `path`, one `"<id> <token>"` line per entry
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DictionaryError> {
        self.ensure_built()?;
        let path = path.as_ref();

        let mut out = BufWriter::new(fs::File::create(path)?);
        self.write_to(&mut out)?;
        out.flush()?;

        tracing::info!(
            "Dictionary '{}' has been saved in file '{}'",
            self.name,
            path.display()
        );
        Ok(())
    }

    /// Serialise the entries in ascending id order
    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<(), DictionaryError> {
        self.ensure_built()?;
        for (id, token) in self.id_to_token.iter().enumerate() {
            writeln!(out, "{id} {token}")?;
        }
        Ok(())
    }

    /// Populate the dictionary from a file written by [`Dictionary::save`].
    ///
    /// Entries with an id at or above `max_vocab` are skipped; the reserved
    /// tokens are always kept. A file that
    /// cannot be opened returns [`LoadStatus::NotFound`] and leaves the
    /// dictionary untouched; a malformed file is an error and also leaves
    /// it untouched.
    pub fn load(
        &mut self,
        path: impl AsRef<Path>,
        max_vocab: Option<usize>,
    ) -> Result<LoadStatus, DictionaryError> {
        let path = path.as_ref();
        tracing::info!("Try loading dictionary '{}' from '{}'", self.name, path.display());

        let file = match fs::File::open(path) {
            Ok(file) => file,
            Err(e) => {
                tracing::info!(
                    "Load dictionary '{}' from '{}' failed ({}), create later",
                    self.name,
                    path.display(),
                    e
                );
                return Ok(LoadStatus::NotFound);
            }
        };

        let size = self.read_from(BufReader::new(file), max_vocab)?;
        tracing::info!(
            "Load dictionary '{}' from '{}' with {} words",
            self.name,
            path.display(),
            size
        );
        Ok(LoadStatus::Loaded(size))
    }

    /// Parse dictionary lines from any reader; see [`Dictionary::load`]
    pub fn read_from<R: BufRead>(
        &mut self,
        reader: R,
        max_vocab: Option<usize>,
    ) -> Result<usize, DictionaryError> {
        let words = read_entries(reader, clamp_max_vocab(&self.name, max_vocab))?;
        self.install(words);
        Ok(self.len())
    }

    /// Map tokens to ids. Tokens outside the vocabulary become `<UNK>`.
    pub fn encode<I, S>(&self, tokens: I) -> Result<Vec<TokenId>, DictionaryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.encode_counting(tokens).map(|(ids, _)| ids)
    }

    /// Like [`Dictionary::encode`], also returning how many tokens fell back to `<UNK>`
    pub fn encode_counting<I, S>(&self, tokens: I) -> Result<(Vec<TokenId>, usize), DictionaryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ensure_built()?;
        let mut unk = 0usize;
        let ids = tokens
            .into_iter()
            .map(|token| match self.token_to_id.get(token.as_ref()) {
                Some(&id) => id,
                None => {
                    unk += 1;
                    ID_UNK
                }
            })
            .collect();
        Ok((ids, unk))
    }

    /// Map ids back to tokens. Unlike `encode` there is no fallback:
    /// an id outside the vocabulary is an error.
    pub fn decode(&self, ids: &[TokenId]) -> Result<Vec<&str>, DictionaryError> {
        self.ensure_built()?;
        ids.iter()
            .map(|&id| self.token(id).ok_or(DictionaryError::UnknownId(id)))
            .collect()
    }

    pub fn token_id(&self, token: &str) -> Option<TokenId> {
        self.token_to_id.get(token).copied()
    }

    pub fn token(&self, id: TokenId) -> Option<&str> {
        self.id_to_token.get(id as usize).map(String::as_str)
    }

    fn ensure_built(&self) -> Result<(), DictionaryError> {
        if self.is_built() {
            Ok(())
        } else {
            Err(DictionaryError::Unbuilt(self.name.clone()))
        }
    }

    /// Freeze `words` as the vocabulary, ids following list order
    fn install(&mut self, words: Vec<String>) {
        self.token_to_id = words
            .iter()
            .enumerate()
            .map(|(id, word)| (word.clone(), id as TokenId))
            .collect();
        self.id_to_token = words;
        self.counter = None;
    }
}

/// Read `"<id> <token>"` lines, checking the ids are dense from 0,
/// the tokens are unique, and the reserved tokens come first.
fn read_entries<R: BufRead>(
    reader: R,
    max_vocab: Option<usize>,
) -> Result<Vec<String>, DictionaryError> {
    let mut words: Vec<String> = Vec::new();
    let mut seen = HashSet::new();

    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        let lineno = n + 1;
        let malformed = |reason: String| DictionaryError::Malformed { line: lineno, reason };

        let mut fields = line.split_whitespace();
        let Some(id_field) = fields.next() else {
            continue;
        };
        let id: usize = id_field
            .parse()
            .map_err(|e| malformed(format!("invalid id '{id_field}': {e}")))?;
        let token = fields
            .next()
            .ok_or_else(|| malformed(format!("missing token after id {id}")))?;
        if fields.next().is_some() {
            return Err(malformed(format!("unexpected extra field after token '{token}'")));
        }

        if max_vocab.is_some_and(|max| id >= max) {
            continue;
        }
        if id != words.len() {
            return Err(malformed(format!("expected id {} but found {id}", words.len())));
        }
        if let Some(&mark) = MARKS.get(id) {
            if token != mark {
                return Err(malformed(format!("expected reserved token {mark} at id {id}, found '{token}'")));
            }
        }
        if !seen.insert(token.to_string()) {
            return Err(malformed(format!("duplicate token '{token}'")));
        }
        words.push(token.to_string());
    }

    if words.is_empty() {
        return Err(DictionaryError::Malformed {
            line: 0,
            reason: "no entries".to_string(),
        });
    }
    Ok(words)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::reserved::{ID_EOS, ID_GO, ID_PAD, MARK_PAD};
    use tempfile::TempDir;

    fn built_from(lines: &[&str], max_vocab: Option<usize>) -> Dictionary {
        let mut dict = Dictionary::new("test");
        for line in lines {
            dict.observe_many(line.split_whitespace());
        }
        dict.build(max_vocab).unwrap();
        dict
    }

    #[test]
    fn test_example_corpus_ids() {
        let dict = built_from(&["a b a", "b c"], None);
        let order: Vec<&str> = (0..dict.len() as TokenId)
            .map(|id| dict.token(id).unwrap())
            .collect();
        assert_eq!(order, ["<PAD>", "<UNK>", "<EOS>", "<GO>", "a", "b", "c"]);
        assert_eq!(dict.encode(["a", "z"]).unwrap(), vec![4, 1]);
    }

    #[test]
    fn test_reserved_ids_are_fixed() {
        // <GO> is frequent in the corpus but must not move
        let dict = built_from(&["x x x <GO> <GO> <GO> <GO>"], None);
        assert_eq!(dict.token_id("<PAD>"), Some(ID_PAD));
        assert_eq!(dict.token_id("<UNK>"), Some(ID_UNK));
        assert_eq!(dict.token_id("<EOS>"), Some(ID_EOS));
        assert_eq!(dict.token_id("<GO>"), Some(ID_GO));
        assert_eq!(dict.token_id("x"), Some(4));
        assert_eq!(dict.len(), 5);
    }

    #[test]
    fn test_reserved_token_in_corpus_is_stripped() {
        let dict = built_from(&["<PAD> hello <PAD> <PAD>"], None);
        assert_eq!(dict.len(), 5);
        assert_eq!(dict.token(4), Some("hello"));
        assert_eq!(dict.token_id(MARK_PAD), Some(ID_PAD));
    }

    #[test]
    fn test_lowercase_mark_is_an_ordinary_word() {
        let dict = built_from(&["<pad> <pad> word"], None);
        assert_eq!(dict.token_id("<pad>"), Some(4));
        assert_eq!(dict.token_id("word"), Some(5));
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let first = built_from(&["b a", "a b"], None);
        let second = built_from(&["b a", "a b"], None);
        assert_eq!(first.token_id("b"), Some(4));
        assert_eq!(first.token_id("a"), Some(5));
        assert_eq!(first.id_to_token, second.id_to_token);
    }

    #[test]
    fn test_truncation_keeps_most_frequent() {
        let dict = built_from(&["c c c b b a d d d d"], Some(6));
        assert_eq!(dict.len(), 6);
        assert_eq!(dict.token(4), Some("d"));
        assert_eq!(dict.token(5), Some("c"));
        assert_eq!(dict.token_id("b"), None);
    }

    #[test]
    fn test_tiny_max_vocab_keeps_reserved_tokens() {
        let dict = built_from(&["a b"], Some(2));
        assert_eq!(dict.len(), 4);
        assert_eq!(dict.token(3), Some("<GO>"));
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let dict = built_from(&["the cat sat on the mat"], None);
        let tokens = ["the", "mat", "cat"];
        let ids = dict.encode(tokens).unwrap();
        assert_eq!(dict.decode(&ids).unwrap(), tokens);
    }

    #[test]
    fn test_encode_counts_unknown() {
        let dict = built_from(&["a b"], None);
        let (ids, unk) = dict.encode_counting(["a", "q", "r"]).unwrap();
        assert_eq!(ids, vec![4, ID_UNK, ID_UNK]);
        assert_eq!(unk, 2);
    }

    #[test]
    fn test_decode_unknown_id_fails() {
        let dict = built_from(&["a"], None);
        assert!(matches!(dict.decode(&[4, 99]), Err(DictionaryError::UnknownId(99))));
    }

    #[test]
    fn test_unbuilt_dictionary_rejects_lookups() {
        let mut dict = Dictionary::new("raw");
        dict.observe("a");
        assert!(matches!(dict.encode(["a"]), Err(DictionaryError::Unbuilt(_))));
        assert!(matches!(dict.decode(&[0]), Err(DictionaryError::Unbuilt(_))));
    }

    #[test]
    fn test_build_twice_fails() {
        let mut dict = built_from(&["a"], None);
        assert!(matches!(dict.build(None), Err(DictionaryError::AlreadyBuilt(_))));
    }

    #[test]
    fn test_observe_after_build_is_ignored() {
        let mut dict = built_from(&["a"], None);
        dict.observe("zzz");
        dict.observe_many(["yyy"]);
        assert_eq!(dict.len(), 5);
        assert_eq!(dict.token_id("zzz"), None);
    }

    #[test]
    fn test_save_then_load_reproduces_mappings() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dict.txt");
        let dict = built_from(&["a b a", "b c"], None);
        dict.save(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "0 <PAD>\n1 <UNK>\n2 <EOS>\n3 <GO>\n4 a\n5 b\n6 c\n");

        let mut loaded = Dictionary::new("loaded");
        assert_eq!(loaded.load(&path, None).unwrap(), LoadStatus::Loaded(7));
        assert!(loaded.is_built());
        assert_eq!(loaded.token_to_id, dict.token_to_id);
        assert_eq!(loaded.id_to_token, dict.id_to_token);
    }

    #[test]
    fn test_load_with_max_vocab_drops_high_ids() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dict.txt");
        built_from(&["a b a", "b c"], None).save(&path).unwrap();

        let mut loaded = Dictionary::new("loaded");
        assert_eq!(loaded.load(&path, Some(5)).unwrap(), LoadStatus::Loaded(5));
        assert_eq!(loaded.token_id("b"), None);
    }

    #[test]
    fn test_load_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let mut dict = Dictionary::new("missing");
        let status = dict.load(dir.path().join("nope.txt"), None).unwrap();
        assert_eq!(status, LoadStatus::NotFound);
        assert!(!dict.is_built());
        assert!(dict.is_empty());
    }

    #[test]
    fn test_load_non_integer_id_is_malformed() {
        let mut dict = Dictionary::new("bad");
        let input = "0 <PAD>\n1 <UNK>\nx <EOS>\n";
        let err = dict.read_from(input.as_bytes(), None).unwrap_err();
        assert!(matches!(err, DictionaryError::Malformed { line: 3, .. }));
        assert!(!dict.is_built());
    }

    #[test]
    fn test_load_gap_in_ids_is_malformed() {
        let mut dict = Dictionary::new("gap");
        let input = "0 <PAD>\n1 <UNK>\n2 <EOS>\n3 <GO>\n5 a\n";
        assert!(matches!(
            dict.read_from(input.as_bytes(), None),
            Err(DictionaryError::Malformed { line: 5, .. })
        ));
    }

    #[test]
    fn test_load_duplicate_token_is_malformed() {
        let mut dict = Dictionary::new("dup");
        let input = "0 <PAD>\n1 <UNK>\n2 <EOS>\n3 <GO>\n4 a\n5 a\n";
        assert!(matches!(
            dict.read_from(input.as_bytes(), None),
            Err(DictionaryError::Malformed { line: 6, .. })
        ));
    }

    #[test]
    fn test_load_with_tiny_max_vocab_keeps_reserved_tokens() {
        let input = "0 <PAD>\n1 <UNK>\n2 <EOS>\n3 <GO>\n4 a\n";
        for max_vocab in [Some(0), Some(1)] {
            let mut dict = Dictionary::new("tiny");
            assert_eq!(dict.read_from(input.as_bytes(), max_vocab).unwrap(), 4);
            assert_eq!(dict.len(), 4);
            let ids = dict.encode(["zzz"]).unwrap();
            assert_eq!(dict.decode(&ids).unwrap(), ["<UNK>"]);
        }
    }

    #[test]
    fn test_reload_with_zero_max_vocab_matches_build() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dict.txt");
        built_from(&["a b"], Some(0)).save(&path).unwrap();

        let mut loaded = Dictionary::new("loaded");
        assert_eq!(loaded.load(&path, Some(0)).unwrap(), LoadStatus::Loaded(4));
        assert_eq!(loaded.token(3), Some("<GO>"));
    }

    #[test]
    fn test_unstorable_tokens_are_not_counted() {
        let mut dict = Dictionary::new("odd");
        dict.observe("");
        dict.observe("a b");
        dict.observe_many(["tab\there", "ok", "line\nbreak"]);
        dict.build(None).unwrap();
        assert_eq!(dict.len(), 5);
        assert_eq!(dict.token(4), Some("ok"));
    }

    #[test]
    fn test_save_then_load_after_unstorable_observations() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dict.txt");
        let mut dict = Dictionary::new("odd");
        dict.observe_many(["", "x", "a b", "x"]);
        dict.build(None).unwrap();
        dict.save(&path).unwrap();

        let mut loaded = Dictionary::new("loaded");
        assert_eq!(loaded.load(&path, None).unwrap(), LoadStatus::Loaded(5));
        assert_eq!(loaded.id_to_token, dict.id_to_token);
    }

    #[test]
    fn test_save_unbuilt_fails() {
        let dir = TempDir::new().unwrap();
        let dict = Dictionary::new("raw");
        assert!(matches!(
            dict.save(dir.path().join("d.txt")),
            Err(DictionaryError::Unbuilt(_))
        ));
    }
}
