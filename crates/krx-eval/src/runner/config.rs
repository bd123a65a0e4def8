//! Evaluation configuration
//!
//! Configuration options for benchmark runs and the oracle connection.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::model_dir_name;
use crate::dataset::{Category, REFERENCE_FILE_NAME};
use crate::error::{EvalError, EvalResult};
use crate::longform::LONGFORM_MAX_TOKENS;
use crate::oracle::SamplingParams;

/// Configuration for a benchmark run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Model identifier, e.g. `org/model-7b`
    #[serde(default)]
    pub model: String,

    /// Directory holding the `ko_eval_*.jsonl` datasets
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Directory under which the per-model result directory is created
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Prompts sent to the oracle per call
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Length bound for the rationale pass
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Temperature for the rationale pass
    #[serde(default)]
    pub temperature: f32,

    /// Categories to run (empty = all)
    #[serde(default)]
    pub categories: Vec<Category>,

    /// Oracle connection settings
    #[serde(default)]
    pub oracle: OracleConfig,

    /// Long-form answer pass
    #[serde(default)]
    pub longform: LongformConfig,
}

/// Settings for the long-form answer pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LongformConfig {
    /// Run the pass after the multiple-choice categories
    #[serde(default)]
    pub enabled: bool,

    /// Reference answer file, relative to `data_dir`
    #[serde(default = "default_reference_file")]
    pub reference_file: PathBuf,

    /// Length bound for each answer
    #[serde(default = "default_longform_max_tokens")]
    pub max_tokens: u32,
}

/// Connection settings for the HTTP oracle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Base URL of the completion server
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Bearer token, never written back to disk
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_batch_size() -> usize {
    1
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_reference_file() -> PathBuf {
    PathBuf::from(REFERENCE_FILE_NAME)
}

fn default_longform_max_tokens() -> u32 {
    LONGFORM_MAX_TOKENS
}

fn default_endpoint() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout() -> u64 {
    600
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            model: String::new(),
            data_dir: default_data_dir(),
            output_dir: default_output_dir(),
            batch_size: default_batch_size(),
            max_tokens: default_max_tokens(),
            temperature: 0.0,
            categories: Vec::new(),
            oracle: OracleConfig::default(),
            longform: LongformConfig::default(),
        }
    }
}

impl Default for LongformConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            reference_file: default_reference_file(),
            max_tokens: default_longform_max_tokens(),
        }
    }
}

impl LongformConfig {
    /// Sampling settings for long-form answers
    pub fn sampling_params(&self) -> SamplingParams {
        SamplingParams::greedy(self.max_tokens)
    }
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: None,
            timeout_secs: default_timeout(),
        }
    }
}

impl EvalConfig {
    /// Create a new config for the given model
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Load a config from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> EvalResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| EvalError::io("Failed to read config file", path, e))?;
        serde_json::from_str(&content).map_err(|e| {
            EvalError::config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Set the model identifier
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the dataset directory
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Set the output directory
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Set the batch size
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the rationale length bound
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set categories to run
    pub fn with_categories(mut self, categories: Vec<Category>) -> Self {
        self.categories = categories;
        self
    }

    /// Enable or disable the long-form pass
    pub fn with_longform(mut self, enabled: bool) -> Self {
        self.longform.enabled = enabled;
        self
    }

    /// Set oracle settings
    pub fn with_oracle(mut self, oracle: OracleConfig) -> Self {
        self.oracle = oracle;
        self
    }

    /// Categories this run covers, in run order
    pub fn selected_categories(&self) -> Vec<Category> {
        Category::all()
            .iter()
            .copied()
            .filter(|c| self.categories.is_empty() || self.categories.contains(c))
            .collect()
    }

    /// Sampling settings for the rationale pass
    pub fn sampling_params(&self) -> SamplingParams {
        SamplingParams {
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }

    /// Check values that would make a run meaningless
    pub fn validate(&self) -> EvalResult<()> {
        if self.model.trim().is_empty() {
            return Err(EvalError::config("model identifier is required"));
        }
        if model_dir_name(&self.model).trim().is_empty() {
            return Err(EvalError::config(format!(
                "model identifier `{}` has no name segment for the result directory",
                self.model
            )));
        }
        if self.batch_size == 0 {
            return Err(EvalError::config("batch_size must be at least 1"));
        }
        if self.max_tokens == 0 {
            return Err(EvalError::config("max_tokens must be at least 1"));
        }
        if self.temperature.is_nan() || self.temperature < 0.0 {
            return Err(EvalError::config("temperature must be non-negative"));
        }
        if self.longform.enabled && self.longform.max_tokens == 0 {
            return Err(EvalError::config("longform.max_tokens must be at least 1"));
        }
        Ok(())
    }
}

impl OracleConfig {
    /// Set the endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}
