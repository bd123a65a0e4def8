//! Pairwise LLM-as-judge comparison of long-form answers
//!
//! A judge model sees one question and two anonymous answers (assistant A and
//! assistant B) and ends its response with `FINAL ANSWER: [[A]]`, `[[B]]` or
//! `[[C]]` for a tie. Which model is shown as A is controlled by
//! [`SidePlacement`].

mod comparison;
mod tally;
mod verdict;

pub use comparison::PairwiseComparison;
pub use tally::{JudgeRecord, JudgeTally, SidePlacement};
pub use verdict::{Verdict, extract_decision, parse_verdict};

use async_trait::async_trait;

use crate::error::EvalResult;
use crate::oracle::{InferenceOracle, SamplingParams, ensure_one_per_prompt};

/// Length bound for one judge response
pub const JUDGE_MAX_TOKENS: u32 = 2048;

const JUDGE_SYSTEM_PROMPT: &str = "Please act as an impartial judge and evaluate the quality of the responses provided by two AI assistants to the user question displayed below. \
You should choose the assistant that follows the user's instructions and answers the user's question better. \
Your evaluation should consider factors such as the helpfulness, relevance, accuracy, depth, creativity, and level of detail of their responses. \
Begin your evaluation by comparing the two responses and provide a short explanation. \
Avoid any position biases and ensure that the order in which the responses were presented does not influence your decision. \
Do not allow the length of the responses to influence your evaluation. Do not favor certain names of the assistants. Be as objective as possible. \
After providing your explanation, output your final verdict by strictly following this format: \
\"FINAL ANSWER: [[A]]\" if assistant A is better, \"FINAL ANSWER: [[B]]\" if assistant B is better, and \"FINAL ANSWER: [[C]]\" for a tie. \
Generate answers in fluent Korean.";

/// System and user message for one comparison
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JudgePrompt {
    pub system: String,
    pub user: String,
}

impl JudgePrompt {
    /// Single-string form for completion-style backends
    pub fn render(&self) -> String {
        format!("{}\n\n{}", self.system, self.user)
    }
}

/// Build the comparison prompt for one question
pub fn judge_prompt(question: &str, answer_a: &str, answer_b: &str) -> JudgePrompt {
    JudgePrompt {
        system: JUDGE_SYSTEM_PROMPT.to_string(),
        user: format!(
            "[User Question]\n{question}\n\
             [The Start of Assistant A's Answer]\n{answer_a}\n[The End of Assistant A's Answer]\n\
             [The Start of Assistant B's Answer]\n{answer_b}\n[The End of Assistant B's Answer]"
        ),
    }
}

/// Backend that reads comparison prompts and writes free-text verdicts
#[async_trait]
pub trait PairwiseJudge: Send + Sync {
    /// One response per prompt, in input order
    async fn judge(&self, prompts: &[JudgePrompt]) -> EvalResult<Vec<String>>;
}

#[async_trait]
impl<T: PairwiseJudge + ?Sized> PairwiseJudge for std::sync::Arc<T> {
    async fn judge(&self, prompts: &[JudgePrompt]) -> EvalResult<Vec<String>> {
        (**self).judge(prompts).await
    }
}

/// Judge backed by any [`InferenceOracle`], e.g. a judge model on a
/// completion server
pub struct OracleJudge<O> {
    oracle: O,
    sampling: SamplingParams,
}

impl<O: InferenceOracle> OracleJudge<O> {
    pub fn new(oracle: O, sampling: SamplingParams) -> Self {
        Self { oracle, sampling }
    }
}

#[async_trait]
impl<O: InferenceOracle> PairwiseJudge for OracleJudge<O> {
    async fn judge(&self, prompts: &[JudgePrompt]) -> EvalResult<Vec<String>> {
        let rendered: Vec<String> = prompts.iter().map(JudgePrompt::render).collect();
        let responses = self.oracle.generate(&rendered, &self.sampling).await?;
        ensure_one_per_prompt("judge", rendered.len(), responses.len())?;
        Ok(responses)
    }
}
