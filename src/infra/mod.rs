// ============================================================
// Layer 6 - Infrastructure Layer
// ============================================================
// Run bookkeeping that does not belong to any business layer:
//
//   checkpoint.rs - the persisted global step counter and the
//                   JSON configs saved next to a run
//
//   metrics.rs    - coverage of each encoded split, appended
//                   to a CSV file for later comparison
//
// The dictionary file format lives with the Dictionary itself
// (domain/dictionary.rs).

/// Global step counter and config persistence
pub mod checkpoint;

/// Per-split coverage CSV logger
pub mod metrics;
