//! Benchmark datasets
//!
//! Multiple-choice examples grouped by category, one line-delimited JSON file
//! per category, plus the reference answers of the long-form pass.

mod example;
mod loader;

pub use example::{Category, Example, REFERENCE_FILE_NAME, ReferenceAnswer};
pub use loader::{DatasetLoader, parse_examples, parse_jsonl, parse_references};
