// ============================================================
// Layer 2 - Application / Use Cases
// ============================================================
// Workflow coordination only: these modules tell the data,
// domain and infra layers what to do, in which order.
//
//   prepare_use_case.rs - dictionaries + train/valid/test encoding
//   encode_use_case.rs  - encode or inspect a single corpus file
//   train_use_case.rs   - step-window loop around external training

// Dataset preparation for a training run
pub mod prepare_use_case;

// Single-file encoding and inspection
pub mod encode_use_case;

// The training driver and its step schedule
pub mod train_use_case;
