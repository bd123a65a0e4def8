//! Batched two-pass evaluation loop

use super::{EvaluationRecord, PendingExample, ReasonedExample, ResultSet};
use crate::dataset::Example;
use crate::error::{EvalError, EvalResult};
use crate::oracle::{ConstrainedPrompt, InferenceOracle, SamplingParams, ensure_one_per_prompt};

/// Evaluator for constrained multiple-choice datasets
///
/// Batches only decide how many prompts go to the oracle per call; the
/// records are the same for any batch size.
pub struct McqaEvaluator<O> {
    oracle: O,
    batch_size: usize,
    sampling: SamplingParams,
}

impl<O: InferenceOracle> McqaEvaluator<O> {
    /// Create a new evaluator
    pub fn new(oracle: O, batch_size: usize, sampling: SamplingParams) -> EvalResult<Self> {
        if batch_size == 0 {
            return Err(EvalError::config("batch_size must be at least 1"));
        }

        Ok(Self {
            oracle,
            batch_size,
            sampling,
        })
    }

    /// The wrapped oracle
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Configured batch size
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Evaluate a dataset
    pub async fn evaluate(&self, dataset: &[Example]) -> EvalResult<ResultSet> {
        self.evaluate_with_progress(dataset, |_, _| {}).await
    }

    /// Evaluate a dataset, calling `on_batch(completed, total)` after each batch
    pub async fn evaluate_with_progress<F>(
        &self,
        dataset: &[Example],
        mut on_batch: F,
    ) -> EvalResult<ResultSet>
    where
        F: FnMut(usize, usize),
    {
        let total = dataset.len();
        let mut results = ResultSet::empty();

        for (batch_index, batch) in dataset.chunks(self.batch_size).enumerate() {
            tracing::debug!(batch = batch_index, size = batch.len(), "Evaluating batch");

            for record in self.evaluate_batch(batch).await? {
                results = results.with_record(record);
            }
            on_batch(results.len(), total);
        }

        tracing::debug!(
            examples = total,
            correct = results.correct_count(),
            accuracy = results.accuracy(),
            "Dataset evaluated"
        );
        Ok(results)
    }

    async fn evaluate_batch(&self, batch: &[Example]) -> EvalResult<Vec<EvaluationRecord>> {
        let pending = batch
            .iter()
            .map(PendingExample::new)
            .collect::<EvalResult<Vec<_>>>()?;

        let prompts: Vec<String> = pending.iter().map(|p| p.prompt().to_string()).collect();
        let reasonings = self.oracle.generate(&prompts, &self.sampling).await?;
        ensure_one_per_prompt("generate", prompts.len(), reasonings.len())?;

        let reasoned: Vec<ReasonedExample<'_>> = pending
            .into_iter()
            .zip(reasonings)
            .map(|(example, reasoning)| example.reason(reasoning))
            .collect();

        let requests: Vec<ConstrainedPrompt> =
            reasoned.iter().map(|r| r.constrained_prompt()).collect();
        let tokens = self.oracle.generate_constrained(&requests).await?;
        ensure_one_per_prompt("generate_constrained", requests.len(), tokens.len())?;

        reasoned
            .into_iter()
            .zip(tokens)
            .map(|(example, token)| example.score(&token))
            .collect()
    }
}
