//! Batched pairwise comparison of two long-form results

use super::{
    JudgeRecord, JudgeTally, PairwiseJudge, SidePlacement, Verdict, extract_decision, judge_prompt,
};
use crate::error::{EvalError, EvalResult};
use crate::longform::{LongformRecord, LongformResult};
use crate::oracle::ensure_one_per_prompt;

/// Compares an evaluated model's answers with a baseline's, question by question
pub struct PairwiseComparison<J> {
    judge: J,
    batch_size: usize,
}

impl<J: PairwiseJudge> PairwiseComparison<J> {
    /// Create a new comparison
    pub fn new(judge: J, batch_size: usize) -> EvalResult<Self> {
        if batch_size == 0 {
            return Err(EvalError::config("batch_size must be at least 1"));
        }
        Ok(Self { judge, batch_size })
    }

    /// Judge every question answered by both `candidate` and `baseline`
    ///
    /// Both results must hold the same questions in the same order.
    pub async fn compare(
        &self,
        candidate: &LongformResult,
        baseline: &LongformResult,
        placement: SidePlacement,
    ) -> EvalResult<JudgeTally> {
        let pairs = align(candidate, baseline)?;

        let (model_a, model_b) = placement.arrange(
            candidate.model().unwrap_or_default(),
            baseline.model().unwrap_or_default(),
        );
        let mut tally = JudgeTally::new(model_a, model_b, placement);

        for batch in pairs.chunks(self.batch_size) {
            let prompts: Vec<_> = batch
                .iter()
                .map(|(ours, theirs)| {
                    let (answer_a, answer_b) = placement.arrange(&ours.answer, &theirs.answer);
                    judge_prompt(&ours.question, answer_a, answer_b)
                })
                .collect();

            let responses = self.judge.judge(&prompts).await?;
            ensure_one_per_prompt("judge", prompts.len(), responses.len())?;

            for ((ours, _), response) in batch.iter().zip(responses) {
                let decision = extract_decision(&response).map(str::to_string);
                let verdict = Verdict::from_decision(decision.as_deref());
                if verdict == Verdict::Invalid {
                    tracing::warn!(question = %ours.question, "Judge response has no usable verdict");
                }
                tally = tally.with_record(JudgeRecord {
                    question: ours.question.clone(),
                    judge_response: response,
                    decision,
                    verdict,
                });
            }
        }

        tracing::info!(
            placement = %placement,
            model_a = %tally.model_a,
            model_b = %tally.model_b,
            a_wins = tally.num_model_a_win,
            b_wins = tally.num_model_b_win,
            ties = tally.num_tie,
            invalid = tally.num_invalid,
            "Pairwise comparison complete"
        );
        Ok(tally)
    }
}

fn align<'a>(
    candidate: &'a LongformResult,
    baseline: &'a LongformResult,
) -> EvalResult<Vec<(&'a LongformRecord, &'a LongformRecord)>> {
    if candidate.len() != baseline.len() {
        return Err(EvalError::alignment(format!(
            "candidate has {} answers but baseline has {}",
            candidate.len(),
            baseline.len()
        )));
    }

    candidate
        .details()
        .iter()
        .zip(baseline.details())
        .enumerate()
        .map(|(index, (ours, theirs))| {
            if ours.question == theirs.question {
                Ok((ours, theirs))
            } else {
                Err(EvalError::alignment(format!(
                    "question {} differs between candidate and baseline",
                    index + 1
                )))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judge::JudgePrompt;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Prefers whichever answer slot holds `favorite`
    struct FavoriteJudge {
        favorite: &'static str,
        batches: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl PairwiseJudge for FavoriteJudge {
        async fn judge(&self, prompts: &[JudgePrompt]) -> EvalResult<Vec<String>> {
            self.batches.lock().unwrap().push(prompts.len());
            Ok(prompts
                .iter()
                .map(|p| {
                    let marker_a = format!("Assistant A's Answer]\n{}\n", self.favorite);
                    let marker_b = format!("Assistant B's Answer]\n{}\n", self.favorite);
                    if p.user.contains(&marker_a) {
                        "A가 낫습니다. FINAL ANSWER: [[A]]".to_string()
                    } else if p.user.contains(&marker_b) {
                        "FINAL ANSWER: [[B]]".to_string()
                    } else if p.user.contains("동점") {
                        "FINAL ANSWER: [[C]]".to_string()
                    } else {
                        "판단할 수 없습니다.".to_string()
                    }
                })
                .collect())
        }
    }

    fn judge(favorite: &'static str) -> FavoriteJudge {
        FavoriteJudge {
            favorite,
            batches: Mutex::new(Vec::new()),
        }
    }

    fn result(model: &str, answers: &[(&str, &str)]) -> LongformResult {
        let details = answers
            .iter()
            .map(|(q, a)| LongformRecord::new(*q, model, *a, "참고"))
            .collect();
        LongformResult::new(Vec::new(), details)
    }

    fn fixtures() -> (LongformResult, LongformResult) {
        let candidate = result(
            "org/fin-7b",
            &[("q1", "좋은 답"), ("q2", "좋은 답"), ("q3", "동점"), ("q4", "모름")],
        );
        let baseline = result(
            "baseline",
            &[("q1", "보통 답"), ("q2", "좋은 답"), ("q3", "동점"), ("q4", "모름")],
        );
        (candidate, baseline)
    }

    #[tokio::test]
    async fn test_upper_placement_tally() {
        let (candidate, baseline) = fixtures();
        let comparison = PairwiseComparison::new(judge("좋은 답"), 3).unwrap();

        let tally = comparison
            .compare(&candidate, &baseline, SidePlacement::Upper)
            .await
            .unwrap();

        assert_eq!(tally.model_a, "org/fin-7b");
        assert_eq!(tally.model_b, "baseline");
        // q2 has the favorite in both slots, A is checked first
        assert_eq!(tally.num_model_a_win, 2);
        assert_eq!(tally.num_model_b_win, 0);
        assert_eq!(tally.num_tie, 1);
        assert_eq!(tally.num_invalid, 1);
        assert_eq!(tally.details[3].decision, None);
        assert_eq!(tally.details[0].decision.as_deref(), Some("A"));
        assert_eq!(*comparison.judge.batches.lock().unwrap(), vec![3, 1]);
    }

    #[tokio::test]
    async fn test_lower_placement_swaps_slots() {
        let (candidate, baseline) = fixtures();
        let comparison = PairwiseComparison::new(judge("좋은 답"), 8).unwrap();

        let tally = comparison
            .compare(&candidate, &baseline, SidePlacement::Lower)
            .await
            .unwrap();

        assert_eq!(tally.model_a, "baseline");
        assert_eq!(tally.model_b, "org/fin-7b");
        // q1: candidate's answer now sits in slot B
        assert_eq!(tally.details[0].verdict, Verdict::AssistantB);
        assert_eq!(tally.num_model_a_win, 1);
        assert_eq!(tally.num_model_b_win, 1);
        assert_eq!(tally.candidate_wins(), 1);
        assert_eq!(tally.baseline_wins(), 1);
    }

    #[tokio::test]
    async fn test_misaligned_results_are_rejected() {
        let (candidate, _) = fixtures();
        let comparison = PairwiseComparison::new(judge("x"), 1).unwrap();

        let shorter = result("b", &[("q1", "a")]);
        let err = comparison
            .compare(&candidate, &shorter, SidePlacement::Upper)
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "ALIGNMENT");

        let reordered = result("b", &[("q2", "a"), ("q1", "a"), ("q3", "a"), ("q4", "a")]);
        let err = comparison
            .compare(&candidate, &reordered, SidePlacement::Upper)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("question 1"));
        assert!(comparison.judge.batches.lock().unwrap().is_empty());
    }
}
