//! Benchmark runner components
//!
//! Loads each category's dataset, evaluates it and writes the result file;
//! runs the long-form pass and judges its answers against a baseline.

mod config;
mod executor;
mod judge;
mod output;

pub use config::{EvalConfig, LongformConfig, OracleConfig};
pub use executor::{BenchmarkRunner, ProgressCallback, RunProgress, RunStage};
pub use judge::{Baseline, JudgeRunner, REFERENCE_BASELINE};
pub use output::{ResultWriter, load_longform, model_dir_name};
