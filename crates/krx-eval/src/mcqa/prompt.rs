//! Prompt templates

use crate::dataset::Example;

const INSTRUCTION: &str = "다음 문제를 읽고 정답으로 가장 알맞은 것을 고르시오.";
const ANSWER_CUE: &str = "### 정답:";

/// First-pass prompt: instruction, question and the labelled choices
pub fn question_prompt(example: &Example) -> String {
    format!(
        "{INSTRUCTION}\n### 질문: {}\n### 선택지:\n{}\n{ANSWER_CUE}",
        example.question,
        example.choices.join("\n")
    )
}

/// Second-pass prompt: the first prompt, the model's rationale, then a fresh
/// answer cue for the forced single-label decode
pub fn final_prompt(question_prompt: &str, reasoning: &str) -> String {
    format!("{question_prompt}{reasoning}\n{ANSWER_CUE}")
}
