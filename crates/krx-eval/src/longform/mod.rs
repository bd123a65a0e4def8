//! Long-form answer generation and reference scoring
//!
//! The model answers open-ended questions without any constraint; the answers
//! are scored against reference answers with text metrics and kept for the
//! pairwise judge.

mod generator;
mod metric;
mod record;

pub use generator::{LONGFORM_MAX_TOKENS, LongformGenerator, score_records};
pub use metric::{CharF, SentenceBleu, TextMetric, Tokenizer, corpus_score, default_metrics};
pub use record::{LongformRecord, LongformResult, MetricScore};

/// Result file of the long-form pass inside a model's result directory
pub const LONGFORM_RESULT_FILE: &str = "gpt4o_bleu.results.json";
