//! Example and category types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EvalError;

/// Category of the benchmark, one dataset file each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Financial market knowledge
    FinancialMarket,
    /// Financial accounting
    FinancialAccounting,
    /// KMMLU accounting subset
    KmmluAccounting,
    /// KMMLU accounting, hard split
    KmmluAccountingHard,
}

impl Category {
    /// Name used for dataset and result file names
    pub fn file_stem(&self) -> &'static str {
        match self {
            Category::FinancialMarket => "financial_market",
            Category::FinancialAccounting => "financial_accounting",
            Category::KmmluAccounting => "kmmlu_accounting",
            Category::KmmluAccountingHard => "kmmlu_accounting_hard",
        }
    }

    /// Dataset file name, e.g. `ko_eval_financial_market.jsonl`
    pub fn dataset_file_name(&self) -> String {
        format!("ko_eval_{}.jsonl", self.file_stem())
    }

    /// Result file name, e.g. `financial_market.results.json`
    pub fn result_file_name(&self) -> String {
        format!("{}.results.json", self.file_stem())
    }

    /// All categories in run order
    pub fn all() -> &'static [Category] {
        &[
            Category::FinancialMarket,
            Category::FinancialAccounting,
            Category::KmmluAccounting,
            Category::KmmluAccountingHard,
        ]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_stem())
    }
}

impl FromStr for Category {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::all()
            .iter()
            .copied()
            .find(|c| c.file_stem() == s)
            .ok_or_else(|| {
                let known: Vec<_> = Category::all().iter().map(|c| c.file_stem()).collect();
                EvalError::config(format!(
                    "unknown category '{}' (expected one of: {})",
                    s,
                    known.join(", ")
                ))
            })
    }
}

/// A single multiple-choice question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    /// Question text
    pub question: String,

    /// Choices, each already prefixed with its label (`"A. ..."`)
    pub choices: Vec<String>,

    /// Answer text; its first character is the ground-truth label
    pub answer: String,
}

impl Example {
    /// Create a new example
    pub fn new(
        question: impl Into<String>,
        choices: Vec<String>,
        answer: impl Into<String>,
    ) -> Self {
        Self {
            question: question.into(),
            choices,
            answer: answer.into(),
        }
    }

    /// Ground-truth label (first character of the answer)
    pub fn correct_label(&self) -> Option<char> {
        self.answer.chars().next()
    }
}

/// Default file holding the long-form reference answers
pub const REFERENCE_FILE_NAME: &str = "gpt4o_answers.jsonl";

/// An open-ended question with the reference answer it is scored against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceAnswer {
    pub question: String,

    /// Reference answer, stored as `chosen` in the source file
    #[serde(rename = "chosen")]
    pub reference: String,
}

impl ReferenceAnswer {
    /// Create a new reference answer
    pub fn new(question: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            reference: reference.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_file_names() {
        assert_eq!(
            Category::FinancialMarket.dataset_file_name(),
            "ko_eval_financial_market.jsonl"
        );
        assert_eq!(
            Category::KmmluAccountingHard.result_file_name(),
            "kmmlu_accounting_hard.results.json"
        );
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!(
            "kmmlu_accounting".parse::<Category>().unwrap(),
            Category::KmmluAccounting
        );
        assert!("stock_picking".parse::<Category>().is_err());
    }

    #[test]
    fn test_correct_label() {
        let example = Example::new("q", vec!["A. 예".into(), "B. 아니오".into()], "A. 예");
        assert_eq!(example.correct_label(), Some('A'));

        let empty = Example::new("q", vec![], "");
        assert_eq!(empty.correct_label(), None);
    }
}
