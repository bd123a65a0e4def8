//! Win/tie/invalid counts of a pairwise comparison run

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Verdict;
use crate::error::EvalError;

/// Which slot the evaluated model is shown in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SidePlacement {
    /// Evaluated model is assistant A, baseline is B
    Upper,
    /// Baseline is assistant A, evaluated model is B
    Lower,
}

impl SidePlacement {
    pub fn as_str(&self) -> &'static str {
        match self {
            SidePlacement::Upper => "upper",
            SidePlacement::Lower => "lower",
        }
    }

    /// Both placements, upper first
    pub fn all() -> &'static [SidePlacement] {
        &[SidePlacement::Upper, SidePlacement::Lower]
    }

    /// Order `(candidate, baseline)` into `(assistant_a, assistant_b)`
    pub fn arrange<T>(&self, candidate: T, baseline: T) -> (T, T) {
        match self {
            SidePlacement::Upper => (candidate, baseline),
            SidePlacement::Lower => (baseline, candidate),
        }
    }

    /// Result file name for this placement
    pub fn result_file_name(&self) -> String {
        format!("llm_judge_results_{}.json", self.as_str())
    }
}

impl fmt::Display for SidePlacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SidePlacement {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upper" => Ok(SidePlacement::Upper),
            "lower" => Ok(SidePlacement::Lower),
            other => Err(EvalError::config(format!(
                "unknown placement '{}' (expected upper or lower)",
                other
            ))),
        }
    }
}

/// One judged pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JudgeRecord {
    pub question: String,
    /// Full judge response
    pub judge_response: String,
    /// Content of the `[[...]]` marker, if one was found
    pub decision: Option<String>,
    pub verdict: Verdict,
}

/// Counts over every judged pair, by presentation slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JudgeTally {
    pub model_a: String,
    pub model_b: String,
    pub placement: SidePlacement,
    pub num_model_a_win: usize,
    pub num_model_b_win: usize,
    pub num_tie: usize,
    pub num_invalid: usize,
    pub details: Vec<JudgeRecord>,
}

impl JudgeTally {
    /// Empty tally with slot names already arranged for `placement`
    pub fn new(
        model_a: impl Into<String>,
        model_b: impl Into<String>,
        placement: SidePlacement,
    ) -> Self {
        Self {
            model_a: model_a.into(),
            model_b: model_b.into(),
            placement,
            num_model_a_win: 0,
            num_model_b_win: 0,
            num_tie: 0,
            num_invalid: 0,
            details: Vec::new(),
        }
    }

    /// Fold step: count one record
    pub fn with_record(mut self, record: JudgeRecord) -> Self {
        match record.verdict {
            Verdict::AssistantA => self.num_model_a_win += 1,
            Verdict::AssistantB => self.num_model_b_win += 1,
            Verdict::Tie => self.num_tie += 1,
            Verdict::Invalid => self.num_invalid += 1,
        }
        self.details.push(record);
        self
    }

    /// Pairs judged
    pub fn total(&self) -> usize {
        self.details.len()
    }

    /// Wins of the evaluated model, whichever slot it was shown in
    pub fn candidate_wins(&self) -> usize {
        match self.placement {
            SidePlacement::Upper => self.num_model_a_win,
            SidePlacement::Lower => self.num_model_b_win,
        }
    }

    /// Wins of the baseline, whichever slot it was shown in
    pub fn baseline_wins(&self) -> usize {
        match self.placement {
            SidePlacement::Upper => self.num_model_b_win,
            SidePlacement::Lower => self.num_model_a_win,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(verdict: Verdict) -> JudgeRecord {
        JudgeRecord {
            question: "q".to_string(),
            judge_response: "r".to_string(),
            decision: None,
            verdict,
        }
    }

    #[test]
    fn test_tally_counts_each_verdict() {
        let tally = [
            Verdict::AssistantA,
            Verdict::AssistantA,
            Verdict::AssistantB,
            Verdict::Tie,
            Verdict::Invalid,
        ]
        .into_iter()
        .map(record)
        .fold(
            JudgeTally::new("cand", "base", SidePlacement::Upper),
            JudgeTally::with_record,
        );

        assert_eq!(tally.num_model_a_win, 2);
        assert_eq!(tally.num_model_b_win, 1);
        assert_eq!(tally.num_tie, 1);
        assert_eq!(tally.num_invalid, 1);
        assert_eq!(tally.total(), 5);
        assert_eq!(tally.candidate_wins(), 2);
        assert_eq!(tally.baseline_wins(), 1);
    }

    #[test]
    fn test_lower_placement_maps_wins_back() {
        let tally = JudgeTally::new("base", "cand", SidePlacement::Lower)
            .with_record(record(Verdict::AssistantB))
            .with_record(record(Verdict::AssistantB))
            .with_record(record(Verdict::AssistantA));

        assert_eq!(tally.candidate_wins(), 2);
        assert_eq!(tally.baseline_wins(), 1);
    }

    #[test]
    fn test_placement_arrange_and_names() {
        assert_eq!(SidePlacement::Upper.arrange("c", "b"), ("c", "b"));
        assert_eq!(SidePlacement::Lower.arrange("c", "b"), ("b", "c"));
        assert_eq!(
            SidePlacement::Lower.result_file_name(),
            "llm_judge_results_lower.json"
        );
        assert_eq!("upper".parse::<SidePlacement>().unwrap(), SidePlacement::Upper);
        assert!("middle".parse::<SidePlacement>().is_err());
    }

    #[test]
    fn test_serialized_counts() {
        let tally = JudgeTally::new("a", "b", SidePlacement::Upper).with_record(record(Verdict::Tie));
        let json = serde_json::to_value(&tally).unwrap();
        assert_eq!(json["num_tie"], 1);
        assert_eq!(json["placement"], "upper");
        assert_eq!(json["details"][0]["verdict"], "tie");
    }
}
