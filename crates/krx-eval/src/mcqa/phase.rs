//! Per-example phases: pending, reasoned, scored
//!
//! The phases are separate types so an example cannot be scored before it
//! has a rationale, and each consumes the previous one. Scoring yields an
//! [`EvaluationRecord`], which is the terminal phase.

use super::prompt::{final_prompt, question_prompt};
use super::{ChoiceAlphabet, EvaluationRecord};
use crate::dataset::Example;
use crate::error::{EvalError, EvalResult};
use crate::oracle::ConstrainedPrompt;

/// An example waiting for its rationale
#[derive(Debug, Clone)]
pub struct PendingExample<'a> {
    example: &'a Example,
    alphabet: ChoiceAlphabet,
    correct_label: char,
    prompt: String,
}

impl<'a> PendingExample<'a> {
    /// Validate an example and render its first-pass prompt
    pub fn new(example: &'a Example) -> EvalResult<Self> {
        let alphabet = ChoiceAlphabet::for_choice_count(example.choices.len())?;
        let correct_label = example
            .correct_label()
            .ok_or_else(|| EvalError::invalid_example("empty answer"))?;

        Ok(Self {
            example,
            alphabet,
            correct_label,
            prompt: question_prompt(example),
        })
    }

    /// First-pass prompt
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Legal labels for this example
    pub fn alphabet(&self) -> ChoiceAlphabet {
        self.alphabet
    }

    /// Attach the oracle's rationale
    pub fn reason(self, reasoning: String) -> ReasonedExample<'a> {
        let final_prompt = final_prompt(&self.prompt, &reasoning);
        ReasonedExample {
            example: self.example,
            alphabet: self.alphabet,
            correct_label: self.correct_label,
            reasoning,
            final_prompt,
        }
    }
}

/// An example with a rationale, waiting for its forced label
#[derive(Debug, Clone)]
pub struct ReasonedExample<'a> {
    example: &'a Example,
    alphabet: ChoiceAlphabet,
    correct_label: char,
    reasoning: String,
    final_prompt: String,
}

impl ReasonedExample<'_> {
    /// The model's rationale
    pub fn reasoning(&self) -> &str {
        &self.reasoning
    }

    /// Second-pass prompt
    pub fn final_prompt(&self) -> &str {
        &self.final_prompt
    }

    /// Constrained request for the second pass
    pub fn constrained_prompt(&self) -> ConstrainedPrompt {
        ConstrainedPrompt::new(self.final_prompt.clone(), self.alphabet)
    }

    /// Score the forced token against the ground truth.
    ///
    /// A token outside the alphabet is an oracle contract violation.
    pub fn score(self, token: &str) -> EvalResult<EvaluationRecord> {
        let predicted = self.alphabet.resolve(token).ok_or_else(|| {
            EvalError::contract_with_context(
                format!(
                    "constrained token {:?} is not one of {:?}",
                    token,
                    self.alphabet.labels()
                ),
                self.example.question.clone(),
            )
        })?;

        Ok(EvaluationRecord {
            question: self.example.question.clone(),
            model_reasoning: self.reasoning,
            final_prompt: self.final_prompt,
            predicted_choice: predicted,
            correct_answer: self.correct_label,
            is_correct: predicted == self.correct_label,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yes_no() -> Example {
        Example::new("질문", vec!["A. Yes".into(), "B. No".into()], "A")
    }

    #[test]
    fn test_phases_produce_record() {
        let example = yes_no();
        let pending = PendingExample::new(&example).unwrap();
        assert!(pending.prompt().ends_with("### 정답:"));

        let reasoned = pending.reason(" 이유".to_string());
        assert!(reasoned.final_prompt().ends_with(" 이유\n### 정답:"));
        assert_eq!(reasoned.constrained_prompt().alphabet.len(), 2);

        let record = reasoned.score("A").unwrap();
        assert_eq!(record.predicted_choice, 'A');
        assert_eq!(record.correct_answer, 'A');
        assert!(record.is_correct);
        assert_eq!(record.model_reasoning, " 이유");
    }

    #[test]
    fn test_score_rejects_label_beyond_choice_count() {
        let example = yes_no();
        let reasoned = PendingExample::new(&example)
            .unwrap()
            .reason(String::new());

        let err = reasoned.score("C").unwrap_err();
        assert_eq!(err.error_code(), "ORACLE_CONTRACT");
    }

    #[test]
    fn test_pending_rejects_nine_choices() {
        let choices = (0..9).map(|i| format!("{i}. x")).collect();
        let example = Example::new("q", choices, "A");
        assert!(matches!(
            PendingExample::new(&example),
            Err(EvalError::AlphabetOverflow { .. })
        ));
    }
}
