//! Error types for the evaluation harness
//!
//! Every failure in this crate is fatal for the run that hit it: there is no
//! skip-and-continue policy, so the variants only need to carry enough context
//! for the operator to find the offending input.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for evaluation operations
pub type EvalResult<T> = Result<T, EvalError>;

/// Main error type for the evaluation harness
#[derive(Error, Debug)]
pub enum EvalError {
    /// The oracle broke its input/output contract
    #[error("Oracle contract violation: {message}")]
    OracleContract {
        message: String,
        context: Option<String>,
    },

    /// The oracle could not be reached or answered with garbage
    #[error("Oracle error: {message}")]
    Oracle {
        message: String,
        status_code: Option<u16>,
    },

    /// A dataset line failed to decode or is missing a field
    #[error("Dataset error in {}:{line}: {message}", .path.display())]
    Dataset {
        message: String,
        path: PathBuf,
        line: usize,
    },

    /// An example cannot be evaluated as given
    #[error("Invalid example: {message}")]
    InvalidExample { message: String },

    /// An example has more choices than there are labels
    #[error("Example has {choices} choices but only {max} labels are available")]
    AlphabetOverflow { choices: usize, max: usize },

    /// Inputs that must pair up one-to-one do not
    #[error("Alignment error: {message}")]
    Alignment { message: String },

    /// Invalid configuration values
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },
}

impl EvalError {
    /// Create an oracle contract violation
    pub fn contract(message: impl Into<String>) -> Self {
        Self::OracleContract {
            message: message.into(),
            context: None,
        }
    }

    /// Create an oracle contract violation with context
    pub fn contract_with_context(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self::OracleContract {
            message: message.into(),
            context: Some(context.into()),
        }
    }

    /// Create a new oracle error
    pub fn oracle(message: impl Into<String>) -> Self {
        Self::Oracle {
            message: message.into(),
            status_code: None,
        }
    }

    /// Create an oracle error for a non-success HTTP status
    pub fn oracle_status(message: impl Into<String>, status_code: u16) -> Self {
        Self::Oracle {
            message: message.into(),
            status_code: Some(status_code),
        }
    }

    /// Create a dataset error pointing at a specific line
    pub fn dataset(message: impl Into<String>, path: impl Into<PathBuf>, line: usize) -> Self {
        Self::Dataset {
            message: message.into(),
            path: path.into(),
            line,
        }
    }

    /// Create an invalid example error
    pub fn invalid_example(message: impl Into<String>) -> Self {
        Self::InvalidExample {
            message: message.into(),
        }
    }

    /// Create an alignment error
    pub fn alignment(message: impl Into<String>) -> Self {
        Self::Alignment {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Wrap an IO error with the path it concerns
    pub fn io(message: impl Into<String>, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            path: Some(path.into()),
            source,
        }
    }

    /// Wrap a JSON error with a description of what was being decoded
    pub fn json(message: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            message: format!("{}: {}", message.into(), source),
            source,
        }
    }

    /// Short machine-readable code for the error kind
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::OracleContract { .. } => "ORACLE_CONTRACT",
            Self::Oracle { .. } => "ORACLE",
            Self::Dataset { .. } => "DATASET",
            Self::InvalidExample { .. } => "INVALID_EXAMPLE",
            Self::AlphabetOverflow { .. } => "ALPHABET_OVERFLOW",
            Self::Alignment { .. } => "ALIGNMENT",
            Self::Config { .. } => "CONFIG",
            Self::Io { .. } => "IO",
            Self::Json { .. } => "JSON",
        }
    }
}

impl From<std::io::Error> for EvalError {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            message: source.to_string(),
            path: None,
            source,
        }
    }
}

impl From<serde_json::Error> for EvalError {
    fn from(source: serde_json::Error) -> Self {
        Self::Json {
            message: source.to_string(),
            source,
        }
    }
}

impl From<reqwest::Error> for EvalError {
    fn from(err: reqwest::Error) -> Self {
        Self::Oracle {
            message: err.to_string(),
            status_code: err.status().map(|s| s.as_u16()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_error_display() {
        let err = EvalError::dataset("missing field `answer`", "data/ko_eval_x.jsonl", 3);
        assert_eq!(
            err.to_string(),
            "Dataset error in data/ko_eval_x.jsonl:3: missing field `answer`"
        );
        assert_eq!(err.error_code(), "DATASET");
    }

    #[test]
    fn test_alphabet_overflow_display() {
        let err = EvalError::AlphabetOverflow { choices: 9, max: 8 };
        assert!(err.to_string().contains("9 choices"));
    }

    #[test]
    fn test_json_error_keeps_context() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = EvalError::json("Failed to parse model-7b/gpt4o_bleu.results.json", source);
        assert_eq!(err.error_code(), "JSON");
        assert!(err.to_string().contains("gpt4o_bleu.results.json"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: EvalError = io.into();
        assert_eq!(err.error_code(), "IO");
    }
}
