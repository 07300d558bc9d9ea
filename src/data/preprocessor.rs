// ============================================================
// Layer 4 - Text Preprocessor
// ============================================================
// Normalises raw test/inference text before tokenisation.
//
// Only one rule is applied: every decimal digit becomes '#'.
//
//   "sales rose 12.5% in 2019"  →  "sales rose ##.#% in ####"
//
// Numbers are rarely in the vocabulary verbatim, so collapsing
// them turns many distinct <UNK> tokens into a few shapes.
//
// Training and validation corpora are NOT passed through here;
// only the test path is.
//
// Why '#' and not a single <NUM> token?
//   The training corpus already uses '#' per digit, so "2019"
//   and "1999" share the entry "####" while still telling a year
//   apart from "##" or "#.#". Test text has to match that shape.
//
// Reference: regex crate documentation (Unicode classes, replace_all)
//            Rust Book §8 (Strings in Rust)

use regex::Regex;

pub struct Preprocessor {
    digits: Regex,
}

impl Preprocessor {
    /// Create a new Preprocessor instance
    pub fn new() -> Self {
        Self {
            // \d is Unicode-aware, so Arabic-Indic and other digits match too
            digits: Regex::new(r"\d").expect("digit pattern is valid"),
        }
    }

    /// Replace every digit in `line` with '#'
    pub fn normalize_line(&self, line: &str) -> String {
        self.digits.replace_all(line, "#").into_owned()
    }

    /// Apply [`Preprocessor::normalize_line`] to each line
    pub fn normalize<I, S>(&self, lines: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        lines
            .into_iter()
            .map(|line| self.normalize_line(line.as_ref()))
            .collect()
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}
