//! Constrained multiple-choice evaluation
//!
//! Each example goes through two oracle passes: a free-text rationale, then a
//! single token restricted to the example's legal label alphabet. The forced
//! label is compared with the ground truth and folded into a [`ResultSet`].

mod alphabet;
mod evaluator;
mod mask;
mod phase;
mod prompt;
mod result;

pub use alphabet::{CHOICE_LABELS, ChoiceAlphabet};
pub use evaluator::McqaEvaluator;
pub use mask::{argmax, mask_logits};
pub use phase::{PendingExample, ReasonedExample};
pub use prompt::{final_prompt, question_prompt};
pub use result::{EvaluationRecord, ResultSet, accuracy_percent, round_cents};
