//! Unconstrained answer generation over reference questions

use super::{LongformRecord, LongformResult, MetricScore, TextMetric, corpus_score};
use crate::dataset::ReferenceAnswer;
use crate::error::{EvalError, EvalResult};
use crate::oracle::{InferenceOracle, SamplingParams, ensure_one_per_prompt};

/// Length bound for long-form answers
pub const LONGFORM_MAX_TOKENS: u32 = 2048;

/// Generates one free-text answer per reference question
///
/// The question text is sent as the prompt with no template around it.
pub struct LongformGenerator<O> {
    oracle: O,
    batch_size: usize,
    sampling: SamplingParams,
}

impl<O: InferenceOracle> LongformGenerator<O> {
    /// Create a new generator
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

    /// Answer every question as `model`
    pub async fn generate(
        &self,
        model: &str,
        references: &[ReferenceAnswer],
    ) -> EvalResult<Vec<LongformRecord>> {
        self.generate_with_progress(model, references, |_, _| {}).await
    }

    /// Answer every question, calling `on_batch(completed, total)` after each batch
    pub async fn generate_with_progress<F>(
        &self,
        model: &str,
        references: &[ReferenceAnswer],
        mut on_batch: F,
    ) -> EvalResult<Vec<LongformRecord>>
    where
        F: FnMut(usize, usize),
    {
        let total = references.len();
        let mut records = Vec::with_capacity(total);

        for batch in references.chunks(self.batch_size) {
            let prompts: Vec<String> = batch.iter().map(|r| r.question.clone()).collect();
            let answers = self.oracle.generate(&prompts, &self.sampling).await?;
            ensure_one_per_prompt("generate", prompts.len(), answers.len())?;

            records.extend(batch.iter().zip(answers).map(|(reference, answer)| {
                LongformRecord::new(&reference.question, model, answer, &reference.reference)
            }));
            on_batch(records.len(), total);
        }

        tracing::debug!(model = %model, answers = records.len(), "Long-form answers generated");
        Ok(records)
    }
}

/// Score records against their references with every metric
pub fn score_records(
    records: Vec<LongformRecord>,
    metrics: &[Box<dyn TextMetric>],
) -> EvalResult<LongformResult> {
    let references: Vec<&str> = records.iter().map(|r| r.reference.as_str()).collect();
    let candidates: Vec<&str> = records.iter().map(|r| r.answer.as_str()).collect();

    let scores = metrics
        .iter()
        .map(|metric| {
            let value = corpus_score(metric.as_ref(), &references, &candidates)?;
            tracing::info!(metric = metric.name(), score = value, "Long-form score");
            Ok(MetricScore::new(metric.name(), value))
        })
        .collect::<EvalResult<Vec<_>>>()?;

    Ok(LongformResult::new(scores, records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::longform::CharF;
    use crate::oracle::ConstrainedPrompt;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Echoes the prompt back, optionally losing the last answer
    struct EchoOracle {
        lose_last: bool,
        seen_params: Mutex<Vec<SamplingParams>>,
    }

    impl EchoOracle {
        fn new(lose_last: bool) -> Self {
            Self {
                lose_last,
                seen_params: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl InferenceOracle for EchoOracle {
        async fn generate(
            &self,
            prompts: &[String],
            params: &SamplingParams,
        ) -> EvalResult<Vec<String>> {
            self.seen_params.lock().unwrap().push(*params);
            let mut out = prompts.to_vec();
            if self.lose_last {
                out.pop();
            }
            Ok(out)
        }

        async fn generate_constrained(
            &self,
            _requests: &[ConstrainedPrompt],
        ) -> EvalResult<Vec<String>> {
            unreachable!("long-form generation never constrains output")
        }
    }

    fn references() -> Vec<ReferenceAnswer> {
        vec![
            ReferenceAnswer::new("배당이란?", "배당이란?"),
            ReferenceAnswer::new("환율이란?", "외화 가격"),
            ReferenceAnswer::new("채권이란?", "채권이란?"),
        ]
    }

    #[tokio::test]
    async fn test_generate_keeps_dataset_order_across_batches() {
        let oracle = EchoOracle::new(false);
        let generator =
            LongformGenerator::new(oracle, 2, SamplingParams::greedy(LONGFORM_MAX_TOKENS)).unwrap();

        let mut seen = Vec::new();
        let records = generator
            .generate_with_progress("org/fin-7b", &references(), |done, total| {
                seen.push((done, total))
            })
            .await
            .unwrap();

        assert_eq!(seen, vec![(2, 3), (3, 3)]);
        let questions: Vec<&str> = records.iter().map(|r| r.question.as_str()).collect();
        assert_eq!(questions, vec!["배당이란?", "환율이란?", "채권이란?"]);
        assert_eq!(records[1].answer, "환율이란?");
        assert_eq!(records[1].reference, "외화 가격");
        assert!(records.iter().all(|r| r.model == "org/fin-7b"));

        let params = generator.oracle.seen_params.lock().unwrap();
        assert!(params.iter().all(|p| p.max_tokens == 2048 && p.temperature == 0.0));
    }

    #[tokio::test]
    async fn test_missing_answer_is_fatal() {
        let generator =
            LongformGenerator::new(EchoOracle::new(true), 4, SamplingParams::default()).unwrap();
        let err = generator.generate("m", &references()).await.unwrap_err();
        assert_eq!(err.error_code(), "ORACLE_CONTRACT");
    }

    #[tokio::test]
    async fn test_score_records_per_metric() {
        let generator =
            LongformGenerator::new(EchoOracle::new(false), 8, SamplingParams::default()).unwrap();
        let records = generator.generate("m", &references()).await.unwrap();

        let metrics: Vec<Box<dyn TextMetric>> = vec![Box::new(CharF::new(1, 1, 3.0))];
        let result = score_records(records, &metrics).unwrap();

        // two answers equal their reference, one shares no character with it
        assert_eq!(result.score("chrf"), Some(66.67));
        assert_eq!(result.len(), 3);
    }
}
