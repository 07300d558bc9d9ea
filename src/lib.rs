//! Vocabulary building, corpus encoding and the step-window training
//! driver for an abstractive summarization model.
//!
//! The model itself is trained elsewhere; this crate prepares its inputs
//! (`data`, `domain::dictionary`) and drives it through the
//! [`domain::traits::TrainingProcess`] / [`domain::traits::Evaluator`]
//! boundary (`application::train_use_case`).

pub mod cli;
pub mod application;
pub mod domain;
pub mod data;
pub mod infra;
