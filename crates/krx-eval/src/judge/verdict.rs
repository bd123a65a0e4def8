//! Verdict extraction from judge responses

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// First `[[...]]` marker in a judge response
static DECISION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[(.*?)\]\]").unwrap());

/// Outcome of one pairwise comparison, by presentation slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Assistant A answered better
    AssistantA,
    /// Assistant B answered better
    AssistantB,
    Tie,
    /// No usable decision in the response
    Invalid,
}

impl Verdict {
    /// Classify a decision marker's content
    ///
    /// `A` wins over `B`, which wins over `C`, when several letters appear.
    pub fn from_decision(decision: Option<&str>) -> Self {
        match decision {
            Some(d) if d.contains('A') => Verdict::AssistantA,
            Some(d) if d.contains('B') => Verdict::AssistantB,
            Some(d) if d.contains('C') => Verdict::Tie,
            _ => Verdict::Invalid,
        }
    }
}

/// Content of the first `[[...]]` marker, if any
pub fn extract_decision(response: &str) -> Option<&str> {
    DECISION_PATTERN
        .captures(response)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Verdict of a full judge response
pub fn parse_verdict(response: &str) -> Verdict {
    Verdict::from_decision(extract_decision(response))
}
