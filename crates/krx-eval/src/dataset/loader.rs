//! Dataset loading from line-delimited JSON files
//!
//! Malformed lines abort the load; nothing is skipped.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use super::{Category, Example, ReferenceAnswer};
use crate::error::{EvalError, EvalResult};

/// Loader for per-category dataset files
pub struct DatasetLoader {
    /// Directory holding the `ko_eval_*.jsonl` files
    data_dir: PathBuf,
}

impl DatasetLoader {
    /// Create a new loader rooted at the given data directory
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    /// Path of the dataset file for a category
    pub fn path_for(&self, category: Category) -> PathBuf {
        self.data_dir.join(category.dataset_file_name())
    }

    /// Load every example of a category
    pub fn load_category(&self, category: Category) -> EvalResult<Vec<Example>> {
        self.load_file(self.path_for(category))
    }

    /// Load examples from an arbitrary JSONL file
    pub fn load_file(&self, path: impl AsRef<Path>) -> EvalResult<Vec<Example>> {
        let path = path.as_ref();
        let content = read_dataset(path)?;

        let examples = parse_examples(&content, path)?;
        tracing::debug!(path = %path.display(), examples = examples.len(), "Loaded dataset");
        Ok(examples)
    }

    /// Load reference answers for the long-form pass
    ///
    /// Relative paths are resolved against the data directory.
    pub fn load_references(&self, file: impl AsRef<Path>) -> EvalResult<Vec<ReferenceAnswer>> {
        let path = self.data_dir.join(file);
        let content = read_dataset(&path)?;

        let references = parse_references(&content, &path)?;
        tracing::debug!(path = %path.display(), references = references.len(), "Loaded references");
        Ok(references)
    }
}

fn read_dataset(path: &Path) -> EvalResult<String> {
    std::fs::read_to_string(path).map_err(|e| EvalError::io("Failed to read dataset file", path, e))
}

/// Decode one JSON value per non-blank line, checking each with `check`
///
/// `path` is only used for error messages. Line numbers are 1-based.
pub fn parse_jsonl<T, F>(content: &str, path: &Path, check: F) -> EvalResult<Vec<T>>
where
    T: DeserializeOwned,
    F: Fn(&T) -> Result<(), &'static str>,
{
    let mut items = Vec::new();

    for (index, line) in content.lines().enumerate() {
        let line_no = index + 1;
        if line.trim().is_empty() {
            continue;
        }

        let item: T = serde_json::from_str(line)
            .map_err(|e| EvalError::dataset(e.to_string(), path, line_no))?;
        check(&item).map_err(|message| EvalError::dataset(message, path, line_no))?;

        items.push(item);
    }

    Ok(items)
}

/// Parse JSONL content into examples
pub fn parse_examples(content: &str, path: &Path) -> EvalResult<Vec<Example>> {
    parse_jsonl(content, path, |example: &Example| match example.correct_label() {
        Some(_) => Ok(()),
        None => Err("empty `answer` field"),
    })
}

/// Parse JSONL content into long-form reference answers
pub fn parse_references(content: &str, path: &Path) -> EvalResult<Vec<ReferenceAnswer>> {
    parse_jsonl(content, path, |reference: &ReferenceAnswer| {
        if reference.question.trim().is_empty() {
            Err("empty `question` field")
        } else {
            Ok(())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const TWO_LINES: &str = r#"{"question": "주식이란?", "choices": ["A. 지분", "B. 채권"], "answer": "A"}

{"question": "부채란?", "choices": ["A. 자산", "B. 의무", "C. 자본"], "answer": "B. 의무", "source": "kmmlu"}
"#;

    #[test]
    fn test_parse_skips_blank_lines_and_extra_fields() {
        let examples = parse_examples(TWO_LINES, Path::new("mem.jsonl")).unwrap();
        assert_eq!(examples.len(), 2);
        assert_eq!(examples[1].choices.len(), 3);
        assert_eq!(examples[1].correct_label(), Some('B'));
    }

    #[test]
    fn test_parse_reports_line_of_missing_field() {
        let content = "{\"question\": \"q\", \"choices\": [\"A. x\"], \"answer\": \"A\"}\n{\"question\": \"q\", \"choices\": [\"A. x\"]}\n";
        let err = parse_examples(content, Path::new("mem.jsonl")).unwrap_err();
        match err {
            EvalError::Dataset { line, message, .. } => {
                assert_eq!(line, 2);
                assert!(message.contains("answer"));
            }
            other => panic!("Expected dataset error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_empty_answer() {
        let content = "{\"question\": \"q\", \"choices\": [\"A. x\"], \"answer\": \"\"}\n";
        assert!(parse_examples(content, Path::new("mem.jsonl")).is_err());
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        let err = parse_examples("not json\n", Path::new("mem.jsonl")).unwrap_err();
        assert_eq!(err.error_code(), "DATASET");
    }

    #[test]
    fn test_parse_references_reads_chosen_answer() {
        let content = "{\"question\": \"ETF란?\", \"chosen\": \"상장지수펀드입니다.\", \"rejected\": \"x\"}\n\n{\"question\": \"\", \"chosen\": \"y\"}\n";
        let err = parse_references(content, Path::new("refs.jsonl")).unwrap_err();
        match err {
            EvalError::Dataset { line, message, .. } => {
                assert_eq!(line, 3);
                assert!(message.contains("question"));
            }
            other => panic!("Expected dataset error, got {other:?}"),
        }

        let first_line = content.lines().next().unwrap();
        let references = parse_references(first_line, Path::new("refs.jsonl")).unwrap();
        assert_eq!(references[0].question, "ETF란?");
        assert_eq!(references[0].reference, "상장지수펀드입니다.");
    }

    #[test]
    fn test_load_references_relative_to_data_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("answers.jsonl"),
            "{\"question\": \"q\", \"chosen\": \"a\"}\n",
        )
        .unwrap();

        let loader = DatasetLoader::new(dir.path());
        assert_eq!(loader.load_references("answers.jsonl").unwrap().len(), 1);
        assert!(matches!(
            loader.load_references("missing.jsonl"),
            Err(EvalError::Io { .. })
        ));
    }

    #[test]
    fn test_load_category_from_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("ko_eval_financial_market.jsonl"), TWO_LINES).unwrap();

        let loader = DatasetLoader::new(dir.path());
        let examples = loader.load_category(Category::FinancialMarket).unwrap();
        assert_eq!(examples.len(), 2);

        let missing = loader.load_category(Category::KmmluAccounting);
        assert!(matches!(missing, Err(EvalError::Io { .. })));
    }
}
