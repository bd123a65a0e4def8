//! Reference-based text metrics
//!
//! Metrics score one candidate against one reference; [`corpus_score`]
//! averages them over a dataset and reports a percentage. Tokenization for
//! [`SentenceBleu`] is pluggable so a morphological analyzer can stand in for
//! whitespace splitting.

use std::collections::HashMap;
use std::hash::Hash;

use crate::error::{EvalError, EvalResult};
use crate::mcqa::round_cents;

/// A sentence-level similarity metric in `[0, 1]`
pub trait TextMetric: Send + Sync {
    /// Short name, used as the `{name}_score` key
    fn name(&self) -> &str;

    /// Score `candidate` against `reference`
    fn sentence_score(&self, reference: &str, candidate: &str) -> f64;
}

/// Mean sentence score over aligned pairs, as a percentage with two decimals
///
/// Empty input scores 0.
pub fn corpus_score(
    metric: &dyn TextMetric,
    references: &[&str],
    candidates: &[&str],
) -> EvalResult<f64> {
    if references.len() != candidates.len() {
        return Err(EvalError::alignment(format!(
            "{} references but {} candidates",
            references.len(),
            candidates.len()
        )));
    }
    if references.is_empty() {
        return Ok(0.0);
    }

    let total: f64 = references
        .iter()
        .zip(candidates)
        .map(|(reference, candidate)| metric.sentence_score(reference, candidate))
        .sum();
    Ok(round_cents(total / references.len() as f64 * 100.0))
}

/// Splits text into tokens
pub type Tokenizer = Box<dyn Fn(&str) -> Vec<String> + Send + Sync>;

/// Sentence BLEU with uniform n-gram weights and epsilon smoothing
///
/// Orders with no matches use `epsilon / candidate_ngrams` as precision; a
/// candidate without a single unigram match scores 0.
pub struct SentenceBleu {
    max_order: usize,
    epsilon: f64,
    tokenizer: Tokenizer,
}

impl SentenceBleu {
    /// BLEU-`max_order` over whitespace tokens
    pub fn new(max_order: usize) -> Self {
        Self {
            max_order: max_order.max(1),
            epsilon: 0.1,
            tokenizer: Box::new(|text| text.split_whitespace().map(str::to_string).collect()),
        }
    }

    /// Replace the tokenizer
    pub fn with_tokenizer(
        mut self,
        tokenizer: impl Fn(&str) -> Vec<String> + Send + Sync + 'static,
    ) -> Self {
        self.tokenizer = Box::new(tokenizer);
        self
    }

    fn score_tokens(&self, reference: &[String], candidate: &[String]) -> f64 {
        if candidate.is_empty() {
            return 0.0;
        }

        let mut log_sum = 0.0;
        for order in 1..=self.max_order {
            let (matches, total) = clipped_matches(reference, candidate, order);
            if order == 1 && matches == 0 {
                return 0.0;
            }
            let precision = if matches == 0 {
                self.epsilon / total.max(1) as f64
            } else {
                matches as f64 / total as f64
            };
            log_sum += precision.ln() / self.max_order as f64;
        }

        brevity_penalty(reference.len(), candidate.len()) * log_sum.exp()
    }
}

impl Default for SentenceBleu {
    fn default() -> Self {
        Self::new(4)
    }
}

impl TextMetric for SentenceBleu {
    fn name(&self) -> &str {
        "bleu"
    }

    fn sentence_score(&self, reference: &str, candidate: &str) -> f64 {
        let reference = (self.tokenizer)(reference);
        let candidate = (self.tokenizer)(candidate);
        self.score_tokens(&reference, &candidate)
    }
}

/// Candidate n-grams also found in the reference (clipped), and all candidate n-grams
fn clipped_matches(reference: &[String], candidate: &[String], order: usize) -> (usize, usize) {
    let reference_counts = ngram_counts(reference, order);
    let candidate_counts = ngram_counts(candidate, order);

    let matches = candidate_counts
        .iter()
        .map(|(gram, count)| (*count).min(reference_counts.get(gram).copied().unwrap_or(0)))
        .sum();
    let total = candidate_counts.values().sum();
    (matches, total)
}

fn brevity_penalty(reference_len: usize, candidate_len: usize) -> f64 {
    if candidate_len > reference_len {
        1.0
    } else if candidate_len == 0 {
        0.0
    } else {
        (1.0 - reference_len as f64 / candidate_len as f64).exp()
    }
}

/// Character n-gram F-score (chrF), whitespace ignored
///
/// Averages the F-beta score of every order in `min_order..=max_order`. An
/// order with nothing to compare contributes a negligible constant instead of
/// failing.
pub struct CharF {
    min_order: usize,
    max_order: usize,
    beta: f64,
}

const CHRF_EMPTY_ORDER: f64 = 1e-16;

impl CharF {
    pub fn new(min_order: usize, max_order: usize, beta: f64) -> Self {
        let min_order = min_order.max(1);
        Self {
            min_order,
            max_order: max_order.max(min_order),
            beta,
        }
    }

    fn order_fscore(&self, reference: &[char], candidate: &[char], order: usize) -> f64 {
        let reference_counts = ngram_counts(reference, order);
        let candidate_counts = ngram_counts(candidate, order);

        let overlap: usize = candidate_counts
            .iter()
            .map(|(gram, count)| (*count).min(reference_counts.get(gram).copied().unwrap_or(0)))
            .sum();
        let candidate_total: usize = candidate_counts.values().sum();
        let reference_total: usize = reference_counts.values().sum();
        if candidate_total == 0 || reference_total == 0 {
            return CHRF_EMPTY_ORDER;
        }

        let precision = overlap as f64 / candidate_total as f64;
        let recall = overlap as f64 / reference_total as f64;
        let factor = self.beta * self.beta;
        let denominator = factor * precision + recall;
        if denominator == 0.0 {
            return CHRF_EMPTY_ORDER;
        }
        (1.0 + factor) * precision * recall / denominator
    }
}

impl Default for CharF {
    fn default() -> Self {
        Self::new(1, 6, 3.0)
    }
}

impl TextMetric for CharF {
    fn name(&self) -> &str {
        "chrf"
    }

    fn sentence_score(&self, reference: &str, candidate: &str) -> f64 {
        let reference: Vec<char> = reference.chars().filter(|c| !c.is_whitespace()).collect();
        let candidate: Vec<char> = candidate.chars().filter(|c| !c.is_whitespace()).collect();

        let orders = self.min_order..=self.max_order;
        let count = orders.clone().count();
        let total: f64 = orders
            .map(|order| self.order_fscore(&reference, &candidate, order))
            .sum();
        total / count as f64
    }
}

fn ngram_counts<T: Eq + Hash>(tokens: &[T], order: usize) -> HashMap<&[T], usize> {
    let mut counts = HashMap::new();
    for gram in tokens.windows(order) {
        *counts.entry(gram).or_insert(0) += 1;
    }
    counts
}

/// BLEU and chrF with their usual settings
pub fn default_metrics() -> Vec<Box<dyn TextMetric>> {
    vec![Box::new(SentenceBleu::default()), Box::new(CharF::default())]
}
