//! Oracle backed by an OpenAI-compatible completions server (e.g. vLLM)
//!
//! Free-text generation sends the whole batch in one `/v1/completions`
//! request. Constrained generation relies on the server's `guided_choice`
//! extension with `max_tokens = 1`, one request per prompt since every
//! example may carry a different alphabet.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use super::{ConstrainedPrompt, InferenceOracle, SamplingParams};
use crate::error::{EvalError, EvalResult};
use crate::runner::OracleConfig;

/// HTTP oracle for OpenAI-compatible completion endpoints
pub struct OpenAiCompatOracle {
    config: OracleConfig,
    model: String,
    http_client: Client,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    #[serde(default)]
    index: usize,
    text: String,
}

impl OpenAiCompatOracle {
    /// Create a new oracle serving `model`
    pub fn new(model: impl Into<String>, config: OracleConfig) -> EvalResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            config,
            model: model.into(),
            http_client,
        })
    }

    /// Model name sent with every request
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Full URL of the completions endpoint
    pub fn completions_url(&self) -> String {
        let base = self.config.endpoint.trim_end_matches('/');
        if base.ends_with("/v1") {
            format!("{}/completions", base)
        } else {
            format!("{}/v1/completions", base)
        }
    }

    async fn complete(&self, body: Value) -> EvalResult<Vec<CompletionChoice>> {
        let mut request = self
            .http_client
            .post(self.completions_url())
            .header("Content-Type", "application/json")
            .json(&body);

        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| EvalError::oracle(format!("Completion request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(EvalError::oracle_status(
                format!("Completion API error (status {}): {}", status, error_text),
                status.as_u16(),
            ));
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| EvalError::oracle(format!("Failed to parse completion response: {}", e)))?;

        Ok(parsed.choices)
    }
}

/// Put completion choices back into prompt order, requiring exactly one
/// choice per prompt index.
fn order_by_index(choices: Vec<CompletionChoice>, expected: usize) -> EvalResult<Vec<String>> {
    if choices.len() != expected {
        return Err(EvalError::contract(format!(
            "expected {} completions, got {}",
            expected,
            choices.len()
        )));
    }

    let mut slots: Vec<Option<String>> = vec![None; expected];
    for choice in choices {
        let slot = slots.get_mut(choice.index).ok_or_else(|| {
            EvalError::contract(format!("completion index {} out of range", choice.index))
        })?;
        if slot.replace(choice.text).is_some() {
            return Err(EvalError::contract(format!(
                "duplicate completion index {}",
                choice.index
            )));
        }
    }

    // Lengths match and no index repeats, so every slot is filled.
    Ok(slots.into_iter().flatten().collect())
}

#[async_trait]
impl InferenceOracle for OpenAiCompatOracle {
    #[instrument(skip(self, prompts), fields(batch = prompts.len()), level = "debug")]
    async fn generate(
        &self,
        prompts: &[String],
        params: &SamplingParams,
    ) -> EvalResult<Vec<String>> {
        if prompts.is_empty() {
            return Ok(Vec::new());
        }

        let body = json!({
            "model": self.model,
            "prompt": prompts,
            "max_tokens": params.max_tokens,
            "temperature": params.temperature,
        });

        let choices = self.complete(body).await?;
        order_by_index(choices, prompts.len())
    }

    #[instrument(skip(self, requests), fields(batch = requests.len()), level = "debug")]
    async fn generate_constrained(
        &self,
        requests: &[ConstrainedPrompt],
    ) -> EvalResult<Vec<String>> {
        let mut tokens = Vec::with_capacity(requests.len());

        for request in requests {
            let body = json!({
                "model": self.model,
                "prompt": request.prompt,
                "max_tokens": 1,
                "temperature": 0.0,
                "guided_choice": request.alphabet.tokens(),
            });

            let mut texts = order_by_index(self.complete(body).await?, 1)?;
            tokens.append(&mut texts);
        }

        Ok(tokens)
    }
}
