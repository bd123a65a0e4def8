//! CLI argument definitions using clap
//!
//! ```text
//! krx-bench org/model-7b                         # all categories
//! krx-bench org/model-7b --category kmmlu_accounting --batch-size 8
//! krx-bench org/model-7b --config eval.json --endpoint http://gpu:8000
//! krx-bench org/model-7b --longform-only --judge-baseline reference
//! krx-bench org/model-7b --judge-only --judge-baseline results/other-model --placement upper
//! ```

use clap::Parser;
use krx_eval::{Baseline, Category, EvalConfig, OracleConfig, SidePlacement};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "krx-bench")]
#[command(about = "Constrained multiple-choice benchmark for Korean financial LLMs")]
#[command(version)]
pub struct Cli {
    /// Model identifier served by the completion endpoint (e.g. org/model-7b)
    pub model: String,

    /// Directory holding ko_eval_<category>.jsonl files
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Directory under which the per-model result directory is created
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Prompts sent to the oracle per call
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Length bound for the rationale pass
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Category to run; repeat for several (default: all)
    #[arg(long = "category", value_parser = parse_category)]
    pub categories: Vec<Category>,

    /// Base URL of the OpenAI-compatible completion server
    #[arg(long, env = "KRX_ORACLE_URL")]
    pub endpoint: Option<String>,

    /// Bearer token for the completion server
    #[arg(long, env = "KRX_ORACLE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Also answer the reference questions without constraints and score them
    #[arg(long)]
    pub longform: bool,

    /// Run only the long-form pass, skipping the multiple-choice categories
    #[arg(long, conflicts_with = "judge_only")]
    pub longform_only: bool,

    /// Judge the long-form answers against another result directory, or
    /// against the reference answers with `reference`
    #[arg(long, value_name = "DIR|reference")]
    pub judge_baseline: Option<String>,

    /// Judge existing long-form answers without generating anything
    #[arg(long, requires = "judge_baseline")]
    pub judge_only: bool,

    /// Model that acts as the judge
    #[arg(long, default_value = "gpt-4o")]
    pub judge_model: String,

    /// Base URL of the judge's completion server (default: --endpoint)
    #[arg(long, env = "KRX_JUDGE_URL")]
    pub judge_endpoint: Option<String>,

    /// Bearer token for the judge's completion server
    #[arg(long, env = "KRX_JUDGE_API_KEY", hide_env_values = true)]
    pub judge_api_key: Option<String>,

    /// Answer placement to judge; repeat for both (default: upper and lower)
    #[arg(long = "placement", value_parser = parse_placement)]
    pub placements: Vec<SidePlacement>,

    /// JSON config file; flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short)]
    pub verbose: bool,
}

fn parse_category(s: &str) -> Result<Category, String> {
    s.parse().map_err(|e: krx_eval::EvalError| e.to_string())
}

fn parse_placement(s: &str) -> Result<SidePlacement, String> {
    s.parse().map_err(|e: krx_eval::EvalError| e.to_string())
}

impl Cli {
    /// Merge flags over a base config (file or defaults)
    pub fn apply(&self, base: EvalConfig) -> EvalConfig {
        let mut config = base.with_model(&self.model);

        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if let Some(max_tokens) = self.max_tokens {
            config.max_tokens = max_tokens;
        }
        if !self.categories.is_empty() {
            config.categories = self.categories.clone();
        }
        if let Some(endpoint) = &self.endpoint {
            config.oracle.endpoint = endpoint.clone();
        }
        if let Some(api_key) = &self.api_key {
            config.oracle.api_key = Some(api_key.clone());
        }
        if let Some(timeout) = self.timeout_secs {
            config.oracle.timeout_secs = timeout;
        }
        if self.longform || self.longform_only {
            config.longform.enabled = true;
        }

        config
    }

    /// Baseline to judge against, if judging was requested
    pub fn baseline(&self) -> Option<Baseline> {
        self.judge_baseline.as_deref().map(Baseline::parse)
    }

    /// Placements to judge, both when none were given
    pub fn placements(&self) -> Vec<SidePlacement> {
        if self.placements.is_empty() {
            SidePlacement::all().to_vec()
        } else {
            self.placements.clone()
        }
    }

    /// Connection settings of the judge, falling back to the evaluated model's
    pub fn judge_oracle(&self, config: &EvalConfig) -> OracleConfig {
        let mut oracle = config.oracle.clone();
        if let Some(endpoint) = &self.judge_endpoint {
            oracle.endpoint = endpoint.clone();
        }
        if let Some(api_key) = &self.judge_api_key {
            oracle.api_key = Some(api_key.clone());
        }
        oracle
    }
}
