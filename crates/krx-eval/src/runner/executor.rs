//! Benchmark runner over all selected categories
//!
//! Categories run one after another, then the long-form pass if enabled. A
//! failure aborts the run; result files of stages that already finished stay
//! on disk.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;

use super::{EvalConfig, ResultWriter};
use crate::dataset::{Category, DatasetLoader};
use crate::error::EvalResult;
use crate::longform::{LongformGenerator, TextMetric, default_metrics, score_records};
use crate::mcqa::McqaEvaluator;
use crate::oracle::InferenceOracle;
use crate::report::{CategorySummary, LongformSummary, RunSummary};

/// Callback for progress updates during a run
pub type ProgressCallback = Box<dyn Fn(RunProgress) + Send + Sync>;

/// Part of a run that progress refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    /// A multiple-choice category
    Category(Category),
    /// The long-form answer pass
    Longform,
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStage::Category(category) => write!(f, "{}", category),
            RunStage::Longform => f.write_str("longform"),
        }
    }
}

/// Progress update during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunProgress {
    /// Stage being evaluated
    pub stage: RunStage,
    /// Examples finished in this stage
    pub completed: usize,
    /// Examples in this stage
    pub total: usize,
}

/// Runs the benchmark for one model
pub struct BenchmarkRunner<O> {
    config: EvalConfig,
    loader: DatasetLoader,
    writer: ResultWriter,
    oracle: Arc<O>,
    evaluator: McqaEvaluator<Arc<O>>,
    metrics: Vec<Box<dyn TextMetric>>,
    progress_callback: Option<ProgressCallback>,
}

impl<O: InferenceOracle> BenchmarkRunner<O> {
    /// Create a new runner; the config is validated here
    pub fn new(config: EvalConfig, oracle: O) -> EvalResult<Self> {
        config.validate()?;

        let oracle = Arc::new(oracle);
        let evaluator = McqaEvaluator::new(
            Arc::clone(&oracle),
            config.batch_size,
            config.sampling_params(),
        )?;
        let loader = DatasetLoader::new(&config.data_dir);
        let writer = ResultWriter::new(&config.output_dir, &config.model);

        Ok(Self {
            config,
            loader,
            writer,
            oracle,
            evaluator,
            metrics: default_metrics(),
            progress_callback: None,
        })
    }

    /// Set progress callback
    pub fn set_progress_callback(&mut self, callback: ProgressCallback) {
        self.progress_callback = Some(callback);
    }

    /// Replace the long-form metrics
    pub fn set_metrics(&mut self, metrics: Vec<Box<dyn TextMetric>>) {
        self.metrics = metrics;
    }

    /// Run configuration
    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Result writer used for this run
    pub fn writer(&self) -> &ResultWriter {
        &self.writer
    }

    /// Run every selected category, then the long-form pass if enabled
    pub async fn run(&self) -> EvalResult<RunSummary> {
        let mut summary = RunSummary::new(&self.config.model, Utc::now());

        for category in self.config.selected_categories() {
            let category_summary = self.run_category(category).await?;
            summary.push(category_summary);
        }

        if self.config.longform.enabled {
            summary.longform = Some(self.run_longform().await?);
        }

        tracing::info!(
            model = %self.config.model,
            categories = summary.categories.len(),
            overall_accuracy = summary.overall_accuracy(),
            "Benchmark run complete"
        );
        Ok(summary)
    }

    /// Evaluate a single category and write its result file
    pub async fn run_category(&self, category: Category) -> EvalResult<CategorySummary> {
        tracing::info!(category = %category, "[EVALUATION] starting category");

        let dataset = self.loader.load_category(category)?;
        let stage = RunStage::Category(category);
        self.emit_progress(stage, 0, dataset.len());

        let results = self
            .evaluator
            .evaluate_with_progress(&dataset, |completed, total| {
                self.emit_progress(stage, completed, total)
            })
            .await?;

        tracing::info!(
            category = %category,
            examples = results.len(),
            accuracy = results.accuracy(),
            "Total Accuracy"
        );

        let output_path = self.writer.write(category, &results).await?;

        Ok(CategorySummary {
            category,
            examples: results.len(),
            correct: results.correct_count(),
            accuracy: results.accuracy(),
            output_path,
        })
    }

    /// Answer the reference questions freely, score and write the answers
    pub async fn run_longform(&self) -> EvalResult<LongformSummary> {
        let longform = &self.config.longform;
        tracing::info!(file = %longform.reference_file.display(), "[EVALUATION] starting long-form pass");

        let references = self.loader.load_references(&longform.reference_file)?;
        self.emit_progress(RunStage::Longform, 0, references.len());

        let generator = LongformGenerator::new(
            Arc::clone(&self.oracle),
            self.config.batch_size,
            longform.sampling_params(),
        )?;
        let records = generator
            .generate_with_progress(&self.config.model, &references, |completed, total| {
                self.emit_progress(RunStage::Longform, completed, total)
            })
            .await?;

        let result = score_records(records, &self.metrics)?;
        let output_path = self.writer.write_longform(&result).await?;

        Ok(LongformSummary {
            examples: result.len(),
            scores: result.scores().to_vec(),
            output_path,
        })
    }

    /// Emit progress update
    fn emit_progress(&self, stage: RunStage, completed: usize, total: usize) {
        if let Some(callback) = &self.progress_callback {
            callback(RunProgress {
                stage,
                completed,
                total,
            });
        }
    }
}
