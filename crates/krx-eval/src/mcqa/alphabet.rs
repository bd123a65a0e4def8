//! Legal answer labels

use crate::error::{EvalError, EvalResult};

/// Every label an example can use, in order
pub const CHOICE_LABELS: [char; 8] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H'];

/// The labels a single example may answer with: the first `n` entries of
/// [`CHOICE_LABELS`] for an example with `n` choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChoiceAlphabet {
    labels: &'static [char],
}

impl ChoiceAlphabet {
    /// Alphabet for an example with `choices` options.
    ///
    /// More than eight choices is unsupported and rejected rather than
    /// wrapped or extended.
    pub fn for_choice_count(choices: usize) -> EvalResult<Self> {
        if choices == 0 {
            return Err(EvalError::invalid_example("example has no choices"));
        }
        if choices > CHOICE_LABELS.len() {
            return Err(EvalError::AlphabetOverflow {
                choices,
                max: CHOICE_LABELS.len(),
            });
        }

        Ok(Self {
            labels: &CHOICE_LABELS[..choices],
        })
    }

    /// Labels in order
    pub fn labels(&self) -> &'static [char] {
        self.labels
    }

    /// Number of legal labels
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always false for a constructed alphabet
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Whether `label` is legal
    pub fn contains(&self, label: char) -> bool {
        self.labels.contains(&label)
    }

    /// Labels as token strings, the form oracles consume
    pub fn tokens(&self) -> Vec<String> {
        self.labels.iter().map(|c| c.to_string()).collect()
    }

    /// Resolve an oracle token to a legal label.
    ///
    /// The token must be exactly one legal character; surrounding whitespace
    /// is tolerated since some tokenizers attach a leading space.
    pub fn resolve(&self, token: &str) -> Option<char> {
        let mut chars = token.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if self.contains(c) => Some(c),
            _ => None,
        }
    }
}
