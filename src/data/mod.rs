// ============================================================
// Layer 4 - Data Pipeline
// ============================================================
// Everything between raw text files on disk and id-encoded
// datasets in memory.
//
//   train.article.txt / train.title.txt
//       │
//       ▼
//   loader::load_or_build_dictionary → Dictionary (loaded or built)
//       │
//       ▼
//   loader::encode_corpus            → EncodedCorpus
//
//   test.giga.txt
//       │
//       ▼
//   Preprocessor::normalize          → digits replaced by '#'
//       │
//       ▼
//   loader::load_test_data           → EncodedCorpus + coverage

/// Reads corpus files and encodes them with a Dictionary
pub mod loader;

/// Digit normalisation for the test path
pub mod preprocessor;
