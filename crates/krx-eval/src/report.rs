//! Run summaries and terminal report
//!
//! The result files are the durable output; this module only condenses a run
//! for the operator.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dataset::Category;
use crate::judge::{JudgeTally, SidePlacement};
use crate::longform::MetricScore;
use crate::mcqa::accuracy_percent;

/// Outcome of one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: Category,
    pub examples: usize,
    pub correct: usize,
    pub accuracy: f64,
    pub output_path: PathBuf,
}

/// Outcome of the long-form pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongformSummary {
    pub examples: usize,
    pub scores: Vec<MetricScore>,
    pub output_path: PathBuf,
}

/// Outcome of one pairwise comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JudgeSummary {
    pub placement: SidePlacement,
    pub model_a: String,
    pub model_b: String,
    pub num_model_a_win: usize,
    pub num_model_b_win: usize,
    pub num_tie: usize,
    pub num_invalid: usize,
    pub output_path: PathBuf,
}

impl JudgeSummary {
    /// Condense a tally written to `output_path`
    pub fn from_tally(tally: &JudgeTally, output_path: PathBuf) -> Self {
        Self {
            placement: tally.placement,
            model_a: tally.model_a.clone(),
            model_b: tally.model_b.clone(),
            num_model_a_win: tally.num_model_a_win,
            num_model_b_win: tally.num_model_b_win,
            num_tie: tally.num_tie,
            num_invalid: tally.num_invalid,
            output_path,
        }
    }
}

/// Outcome of a whole run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub model: String,
    pub started_at: DateTime<Utc>,
    pub categories: Vec<CategorySummary>,
    #[serde(default)]
    pub longform: Option<LongformSummary>,
    #[serde(default)]
    pub judgements: Vec<JudgeSummary>,
}

impl RunSummary {
    /// Empty summary for a run starting now
    pub fn new(model: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            model: model.into(),
            started_at,
            categories: Vec::new(),
            longform: None,
            judgements: Vec::new(),
        }
    }

    /// Add a finished category
    pub fn push(&mut self, category: CategorySummary) {
        self.categories.push(category);
    }

    /// Examples across all categories
    pub fn total_examples(&self) -> usize {
        self.categories.iter().map(|c| c.examples).sum()
    }

    /// Correct answers across all categories
    pub fn total_correct(&self) -> usize {
        self.categories.iter().map(|c| c.correct).sum()
    }

    /// Micro-averaged accuracy over every example of the run
    pub fn overall_accuracy(&self) -> f64 {
        accuracy_percent(self.total_correct(), self.total_examples())
    }
}

/// Render a plain-text table for terminal output
pub fn render_table(summary: &RunSummary) -> String {
    let mut output = String::new();

    output.push_str(&format!("\n{:=<70}\n", "= KRX Benchmark Results "));
    output.push_str(&format!("Model: {}\n", summary.model));
    output.push_str(&format!(
        "Started: {}\n",
        summary.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    output.push_str(&format!("{:=<70}\n\n", ""));

    output.push_str(&format!(
        "{:<26} {:>10} {:>10} {:>12}\n",
        "Category", "Examples", "Correct", "Accuracy"
    ));
    output.push_str(&format!("{:-<70}\n", ""));

    for category in &summary.categories {
        output.push_str(&format!(
            "{:<26} {:>10} {:>10} {:>11.2}%\n",
            category.category.file_stem(),
            category.examples,
            category.correct,
            category.accuracy
        ));
    }

    output.push_str(&format!("{:-<70}\n", ""));
    output.push_str(&format!(
        "{:<26} {:>10} {:>10} {:>11.2}%\n",
        "overall",
        summary.total_examples(),
        summary.total_correct(),
        summary.overall_accuracy()
    ));
    output.push_str(&format!("{:=<70}\n", ""));

    if let Some(longform) = &summary.longform {
        output.push_str(&format!("\nLong-form answers: {}\n", longform.examples));
        for score in &longform.scores {
            output.push_str(&format!("  {:<24} {:>10.2}\n", score.metric, score.value));
        }
    }

    if !summary.judgements.is_empty() {
        output.push_str(&format!(
            "\n{:<8} {:<20} {:<20} {:>5} {:>5} {:>5} {:>7}\n",
            "Judge", "Model A", "Model B", "A", "B", "Tie", "Invalid"
        ));
        output.push_str(&format!("{:-<70}\n", ""));
        for judgement in &summary.judgements {
            output.push_str(&format!(
                "{:<8} {:<20} {:<20} {:>5} {:>5} {:>5} {:>7}\n",
                judgement.placement.as_str(),
                judgement.model_a,
                judgement.model_b,
                judgement.num_model_a_win,
                judgement.num_model_b_win,
                judgement.num_tie,
                judgement.num_invalid
            ));
        }
    }

    output
}
