//! Oracle over a backend that exposes next-token logits
//!
//! Constrained decoding happens here rather than in the backend: the label
//! tokens are looked up in the vocabulary, every other logit is masked out
//! and the greedy pick is mapped back to its label.

use async_trait::async_trait;

use super::{ConstrainedPrompt, InferenceOracle, SamplingParams};
use crate::error::{EvalError, EvalResult};
use crate::mcqa::{argmax, mask_logits};

/// Local model backend with logit access
#[async_trait]
pub trait LogitsBackend: Send + Sync {
    /// Generate free text for one prompt
    async fn generate(&self, prompt: &str, params: &SamplingParams) -> EvalResult<String>;

    /// Logits over the full vocabulary for the token following `prompt`
    async fn next_token_logits(&self, prompt: &str) -> EvalResult<Vec<f32>>;

    /// Vocabulary id of a token, if the tokenizer knows it
    fn token_id(&self, token: &str) -> Option<usize>;
}

/// Adapter turning a [`LogitsBackend`] into an [`InferenceOracle`]
pub struct LogitsOracle<B> {
    backend: B,
}

impl<B: LogitsBackend> LogitsOracle<B> {
    /// Wrap a backend
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Access the wrapped backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    async fn pick_label(&self, request: &ConstrainedPrompt) -> EvalResult<String> {
        let labels = request.alphabet.labels();
        let legal_ids = labels
            .iter()
            .map(|label| {
                self.backend.token_id(&label.to_string()).ok_or_else(|| {
                    EvalError::oracle(format!("label {:?} is not in the vocabulary", label))
                })
            })
            .collect::<EvalResult<Vec<_>>>()?;

        let logits = self.backend.next_token_logits(&request.prompt).await?;
        let masked = mask_logits(&logits, &legal_ids)?;
        let best = argmax(&masked)
            .ok_or_else(|| EvalError::contract("every legal token has a masked-out logit"))?;

        let position = legal_ids
            .iter()
            .position(|&id| id == best)
            .ok_or_else(|| EvalError::contract("greedy pick is not a legal token"))?;

        Ok(labels[position].to_string())
    }
}

#[async_trait]
impl<B: LogitsBackend> InferenceOracle for LogitsOracle<B> {
    async fn generate(
        &self,
        prompts: &[String],
        params: &SamplingParams,
    ) -> EvalResult<Vec<String>> {
        let mut outputs = Vec::with_capacity(prompts.len());
        for prompt in prompts {
            outputs.push(self.backend.generate(prompt, params).await?);
        }
        Ok(outputs)
    }

    async fn generate_constrained(
        &self,
        requests: &[ConstrainedPrompt],
    ) -> EvalResult<Vec<String>> {
        let mut tokens = Vec::with_capacity(requests.len());
        for request in requests {
            tokens.push(self.pick_label(request).await?);
        }
        Ok(tokens)
    }
}
