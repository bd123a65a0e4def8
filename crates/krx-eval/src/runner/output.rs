//! Result file layout and writing

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::dataset::Category;
use crate::error::{EvalError, EvalResult};
use crate::judge::{JudgeTally, SidePlacement};
use crate::longform::{LONGFORM_RESULT_FILE, LongformResult};
use crate::mcqa::ResultSet;

/// Directory name for a model identifier: its last `/`-separated segment
pub fn model_dir_name(model: &str) -> &str {
    let trimmed = model.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// Writes result files under `{output_dir}/{model_dir}`
pub struct ResultWriter {
    root: PathBuf,
}

impl ResultWriter {
    /// Writer for `model` rooted at `output_dir`
    pub fn new(output_dir: impl AsRef<Path>, model: &str) -> Self {
        Self {
            root: output_dir.as_ref().join(model_dir_name(model)),
        }
    }

    /// Per-model result directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Result file path for a category
    pub fn path_for(&self, category: Category) -> PathBuf {
        self.root.join(category.result_file_name())
    }

    /// Long-form result file path
    pub fn longform_path(&self) -> PathBuf {
        self.root.join(LONGFORM_RESULT_FILE)
    }

    /// Judge result file path for a placement
    pub fn judge_path(&self, placement: SidePlacement) -> PathBuf {
        self.root.join(placement.result_file_name())
    }

    /// Write a category's results, creating directories as needed
    pub async fn write(&self, category: Category, results: &ResultSet) -> EvalResult<PathBuf> {
        let path = self.write_json(&category.result_file_name(), results).await?;
        tracing::info!(category = %category, path = %path.display(), "Saved results");
        Ok(path)
    }

    /// Write the long-form answers and their scores
    pub async fn write_longform(&self, result: &LongformResult) -> EvalResult<PathBuf> {
        let path = self.write_json(LONGFORM_RESULT_FILE, result).await?;
        tracing::info!(path = %path.display(), "Saved long-form results");
        Ok(path)
    }

    /// Write a pairwise comparison tally
    pub async fn write_judge(&self, tally: &JudgeTally) -> EvalResult<PathBuf> {
        let path = self
            .write_json(&tally.placement.result_file_name(), tally)
            .await?;
        tracing::info!(placement = %tally.placement, path = %path.display(), "Saved judge results");
        Ok(path)
    }

    /// Write any value as a result file in the model directory
    pub async fn write_json<T: Serialize>(&self, file_name: &str, value: &T) -> EvalResult<PathBuf> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| EvalError::io("Failed to create result directory", &self.root, e))?;

        let path = self.root.join(file_name);
        let json = to_pretty_json(value)?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| EvalError::io("Failed to write result file", &path, e))?;
        Ok(path)
    }
}

/// Read a long-form result file written by [`ResultWriter::write_longform`]
///
/// `dir` is a model result directory, e.g. `results/model-7b`.
pub async fn load_longform(dir: impl AsRef<Path>) -> EvalResult<LongformResult> {
    let path = dir.as_ref().join(LONGFORM_RESULT_FILE);
    let content = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| EvalError::io("Failed to read long-form results", &path, e))?;
    serde_json::from_str(&content)
        .map_err(|e| EvalError::json(format!("Failed to parse {}", path.display()), e))
}

/// Four-space indented JSON; non-ASCII text stays unescaped
fn to_pretty_json<T: Serialize>(value: &T) -> EvalResult<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcqa::EvaluationRecord;
    use tempfile::TempDir;

    #[test]
    fn test_model_dir_name() {
        assert_eq!(model_dir_name("org/model-7b"), "model-7b");
        assert_eq!(model_dir_name("model-7b"), "model-7b");
        assert_eq!(model_dir_name("/models/org/ckpt/"), "ckpt");
    }

    #[tokio::test]
    async fn test_write_creates_namespaced_file() {
        let dir = TempDir::new().unwrap();
        let writer = ResultWriter::new(dir.path(), "org/model-7b");
        let results = ResultSet::from_records(vec![EvaluationRecord {
            question: "금리는?".to_string(),
            model_reasoning: "r".to_string(),
            final_prompt: "p".to_string(),
            predicted_choice: 'A',
            correct_answer: 'A',
            is_correct: true,
        }]);

        let path = writer
            .write(Category::FinancialMarket, &results)
            .await
            .unwrap();
        assert_eq!(
            path,
            dir.path()
                .join("model-7b")
                .join("financial_market.results.json")
        );

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("금리는?"));
        assert!(content.contains("\n    \"accuracy\": 100.0"));

        let back: ResultSet = serde_json::from_str(&content).unwrap();
        assert_eq!(back, results);
    }

    #[tokio::test]
    async fn test_longform_file_round_trip() {
        use crate::longform::{LongformRecord, MetricScore};

        let dir = TempDir::new().unwrap();
        let writer = ResultWriter::new(dir.path(), "org/model-7b");
        let result = LongformResult::new(
            vec![MetricScore::new("bleu", 3.12)],
            vec![LongformRecord::new("배당락이란?", "org/model-7b", "답", "참고 답")],
        );

        let path = writer.write_longform(&result).await.unwrap();
        assert_eq!(path, dir.path().join("model-7b").join("gpt4o_bleu.results.json"));

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"org/model-7b_answer\": \"답\""));

        let back = load_longform(writer.root()).await.unwrap();
        assert_eq!(back, result);
    }

    #[tokio::test]
    async fn test_load_longform_reports_bad_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("gpt4o_bleu.results.json"), "{\"details\": 3}").unwrap();

        let err = load_longform(dir.path()).await.unwrap_err();
        assert_eq!(err.error_code(), "JSON");
        assert!(err.to_string().contains("gpt4o_bleu.results.json"));

        let missing = load_longform(dir.path().join("nope")).await.unwrap_err();
        assert_eq!(missing.error_code(), "IO");
    }
}
