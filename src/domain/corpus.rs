// ============================================================
// Layer 3 - Encoded Corpus
// ============================================================
// The output of the corpus loader: one id sequence per input
// line, plus the counts needed to report dictionary coverage.
//
// Coverage is the share of tokens that were found in the
// dictionary, i.e. did NOT fall back to <UNK>:
//
//   coverage = (total - unk) / total

use super::dictionary::TokenId;

/// Fraction of `total_count` tokens that were not mapped to `<UNK>`.
/// Returns `None` when there were no tokens at all.
pub fn coverage(unk_count: usize, total_count: usize) -> Option<f64> {
    if total_count == 0 {
        return None;
    }
    let known = total_count.saturating_sub(unk_count);
    Some(known as f64 / total_count as f64)
}

/// An ordered list of id-encoded documents
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncodedCorpus {
    docs: Vec<Vec<TokenId>>,
    total_tokens: usize,
    unk_tokens: usize,
}

impl EncodedCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one encoded document along with its `<UNK>` count
    pub fn push(&mut self, ids: Vec<TokenId>, unk: usize) {
        self.total_tokens += ids.len();
        self.unk_tokens += unk;
        self.docs.push(ids);
    }

    pub fn docs(&self) -> &[Vec<TokenId>] {
        &self.docs
    }

    pub fn into_docs(self) -> Vec<Vec<TokenId>> {
        self.docs
    }

    /// Number of documents
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn total_tokens(&self) -> usize {
        self.total_tokens
    }

    pub fn unk_tokens(&self) -> usize {
        self.unk_tokens
    }

    pub fn coverage(&self) -> Option<f64> {
        coverage(self.unk_tokens, self.total_tokens)
    }
}
