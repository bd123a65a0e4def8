//! Korean financial-domain LLM benchmark harness
//!
//! Evaluates a model on multiple-choice datasets with constrained decoding:
//! the model first writes a free-text rationale, then a single answer token
//! is forced from the example's legal label alphabet (`A`..`H`, truncated to
//! the number of choices). Accuracy is aggregated per dataset category and
//! written as one JSON file per category.
//!
//! A long-form pass answers open questions without constraints and scores the
//! answers against reference answers; a pairwise judge can then compare those
//! answers with another model's.
//!
//! # Example
//!
//! ```rust,ignore
//! use krx_eval::{BenchmarkRunner, EvalConfig, OpenAiCompatOracle};
//!
//! let config = EvalConfig::new("org/model-7b").with_batch_size(8);
//! let oracle = OpenAiCompatOracle::new(&config.model, config.oracle.clone())?;
//! let runner = BenchmarkRunner::new(config, oracle)?;
//! let summary = runner.run().await?;
//! ```

pub mod dataset;
pub mod error;
pub mod judge;
pub mod longform;
pub mod mcqa;
pub mod oracle;
pub mod report;
pub mod runner;

// Re-exports for convenience
pub use dataset::{Category, DatasetLoader, Example, ReferenceAnswer};
pub use error::{EvalError, EvalResult};
pub use judge::{
    JudgeTally, OracleJudge, PairwiseComparison, PairwiseJudge, SidePlacement, Verdict,
    parse_verdict,
};
pub use longform::{CharF, LongformGenerator, LongformResult, SentenceBleu, TextMetric};
pub use mcqa::{ChoiceAlphabet, EvaluationRecord, McqaEvaluator, ResultSet};
pub use oracle::{
    ConstrainedPrompt, InferenceOracle, LogitsBackend, LogitsOracle, OpenAiCompatOracle,
    SamplingParams,
};
pub use report::{CategorySummary, JudgeSummary, LongformSummary, RunSummary, render_table};
pub use runner::{
    Baseline, BenchmarkRunner, EvalConfig, JudgeRunner, LongformConfig, OracleConfig,
    ProgressCallback, RunProgress, RunStage, load_longform,
};
