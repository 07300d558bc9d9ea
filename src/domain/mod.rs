// ============================================================
// Layer 3 - Domain Layer
// ============================================================
// Plain Rust types that define the core concepts:
//
//   reserved.rs   - the four control tokens and their fixed ids
//   dictionary.rs - the token ↔ id vocabulary
//   corpus.rs     - id-encoded documents and coverage
//   traits.rs     - the external training / evaluation boundary
//
// Rules for this layer:
//   - No CLI types
//   - No knowledge of how corpora are laid out on disk
//   - The only file format here is the dictionary's own

pub mod reserved;

pub mod dictionary;

pub mod corpus;

pub mod traits;
