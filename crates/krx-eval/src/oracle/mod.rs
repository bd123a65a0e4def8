//! Inference oracle boundary
//!
//! The evaluator only needs two capabilities from a text-generation backend:
//! bounded free-text generation and single-token generation restricted to a
//! legal label set. Both must return exactly one output per prompt, in input
//! order.

mod logits;
mod openai_compat;

pub use logits::{LogitsBackend, LogitsOracle};
pub use openai_compat::OpenAiCompatOracle;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{EvalError, EvalResult};
use crate::mcqa::ChoiceAlphabet;

/// Sampling settings for unconstrained generation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    /// Upper bound on generated tokens
    pub max_tokens: u32,

    /// Sampling temperature; 0 is greedy
    pub temperature: f32,
}

impl SamplingParams {
    /// Deterministic sampling with the given length bound
    pub fn greedy(max_tokens: u32) -> Self {
        Self {
            max_tokens,
            temperature: 0.0,
        }
    }
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self::greedy(1024)
    }
}

/// A prompt whose single output token must come from `alphabet`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstrainedPrompt {
    pub prompt: String,
    pub alphabet: ChoiceAlphabet,
}

impl ConstrainedPrompt {
    /// Create a new constrained prompt
    pub fn new(prompt: impl Into<String>, alphabet: ChoiceAlphabet) -> Self {
        Self {
            prompt: prompt.into(),
            alphabet,
        }
    }
}

/// Opaque batch-inference backend
#[async_trait]
pub trait InferenceOracle: Send + Sync {
    /// Generate free text for every prompt
    async fn generate(
        &self,
        prompts: &[String],
        params: &SamplingParams,
    ) -> EvalResult<Vec<String>>;

    /// Generate one token per request, drawn from that request's alphabet
    /// with temperature 0
    async fn generate_constrained(
        &self,
        requests: &[ConstrainedPrompt],
    ) -> EvalResult<Vec<String>>;
}

#[async_trait]
impl<T: InferenceOracle + ?Sized> InferenceOracle for std::sync::Arc<T> {
    async fn generate(
        &self,
        prompts: &[String],
        params: &SamplingParams,
    ) -> EvalResult<Vec<String>> {
        (**self).generate(prompts, params).await
    }

    async fn generate_constrained(
        &self,
        requests: &[ConstrainedPrompt],
    ) -> EvalResult<Vec<String>> {
        (**self).generate_constrained(requests).await
    }
}

/// Fail unless a batch call produced exactly one output per prompt
pub(crate) fn ensure_one_per_prompt(call: &str, prompts: usize, outputs: usize) -> EvalResult<()> {
    if prompts != outputs {
        return Err(EvalError::contract(format!(
            "{} returned {} outputs for {} prompts",
            call, outputs, prompts
        )));
    }
    Ok(())
}
