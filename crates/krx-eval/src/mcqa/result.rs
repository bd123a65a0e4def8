//! Per-example records and the aggregated result set

use serde::{Deserialize, Serialize};

/// Outcome of one example, written verbatim into the result file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub question: String,
    pub model_reasoning: String,
    pub final_prompt: String,
    pub predicted_choice: char,
    pub correct_answer: char,
    pub is_correct: bool,
}

/// Accuracy plus every record of a dataset, in dataset order
///
/// Built by folding records with [`ResultSet::with_record`]; `accuracy` is
/// always derived from `details`, so neither is mutable from outside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawResultSet")]
pub struct ResultSet {
    accuracy: f64,
    details: Vec<EvaluationRecord>,

    #[serde(skip)]
    correct: usize,
}

#[derive(Deserialize)]
struct RawResultSet {
    details: Vec<EvaluationRecord>,
}

impl From<RawResultSet> for ResultSet {
    fn from(raw: RawResultSet) -> Self {
        ResultSet::from_records(raw.details)
    }
}

impl ResultSet {
    /// Result set with no records
    pub fn empty() -> Self {
        Self {
            accuracy: 0.0,
            details: Vec::new(),
            correct: 0,
        }
    }

    /// Fold step: append one record and recompute accuracy
    pub fn with_record(mut self, record: EvaluationRecord) -> Self {
        if record.is_correct {
            self.correct += 1;
        }
        self.details.push(record);
        self.accuracy = accuracy_percent(self.correct, self.details.len());
        self
    }

    /// Fold a sequence of records
    pub fn from_records(records: impl IntoIterator<Item = EvaluationRecord>) -> Self {
        records
            .into_iter()
            .fold(ResultSet::empty(), ResultSet::with_record)
    }

    /// Percentage of correct records, rounded to two decimals
    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    /// Records in dataset order
    pub fn details(&self) -> &[EvaluationRecord] {
        &self.details
    }

    /// Consume the set, keeping only the records
    pub fn into_details(self) -> Vec<EvaluationRecord> {
        self.details
    }

    /// Number of correct records
    pub fn correct_count(&self) -> usize {
        self.correct
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.details.len()
    }

    /// Whether no records were folded in
    pub fn is_empty(&self) -> bool {
        self.details.is_empty()
    }
}

impl Default for ResultSet {
    fn default() -> Self {
        Self::empty()
    }
}

/// `100 * correct / total`, rounded to two decimals with [`round_cents`].
///
/// An empty total yields 0.
pub fn accuracy_percent(correct: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round_cents(correct as f64 / total as f64 * 100.0)
}

/// Round to two decimals, ties to even, judged on the exact binary value.
///
/// `3.125` is exactly representable and rounds to `3.12`; `0.125` does too
/// and rounds to `0.12`. Values whose binary form sits just below a decimal
/// tie round down even when their shortest decimal form looks like a tie.
pub fn round_cents(value: f64) -> f64 {
    if !value.is_finite() || value == 0.0 {
        return value;
    }

    let bits = value.abs().to_bits();
    let exponent_bits = ((bits >> 52) & 0x7ff) as i32;
    let fraction = bits & ((1u64 << 52) - 1);
    let (mantissa, exponent) = if exponent_bits == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1u64 << 52), exponent_bits - 1075)
    };

    if exponent >= 0 {
        return value;
    }

    // |value| * 100 == mantissa * 100 * 2^exponent, exactly
    let scaled = mantissa as u128 * 100;
    let shift = (-exponent) as u32;
    let cents = if shift >= 120 {
        0
    } else {
        let quotient = scaled >> shift;
        let remainder = scaled & ((1u128 << shift) - 1);
        let half = 1u128 << (shift - 1);
        if remainder > half || (remainder == half && quotient & 1 == 1) {
            quotient + 1
        } else {
            quotient
        }
    };

    (cents as f64 / 100.0).copysign(value)
}
