//! Error types for Mglda operations.
//!
//! Provides rich error context for library consumers.

use std::fmt;

/// Main error type for Mglda operations.
///
/// Covers invalid hyperparameters, malformed corpora, and dimension
/// mismatches between the model and caller-supplied data.
///
/// # Examples
///
/// ```
/// use mglda::error::MgldaError;
///
/// let err = MgldaError::InvalidHyperparameter {
///     param: "gamma".to_string(),
///     value: "0".to_string(),
///     constraint: "> 0".to_string(),
/// };
/// assert!(err.to_string().contains("gamma"));
/// ```
#[derive(Debug)]
pub enum MgldaError {
    /// Invalid hyperparameter value provided.
    InvalidHyperparameter {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Dimensions of caller-supplied data don't match the model.
    DimensionMismatch {
        /// Expected dimensions description
        expected: String,
        /// Actual dimensions found
        actual: String,
    },

    /// Corpus contains no documents or an empty vocabulary.
    EmptyCorpus,

    /// A word id is outside the vocabulary range.
    WordIdOutOfRange {
        /// Offending word id
        word: usize,
        /// Vocabulary size
        vocab_size: usize,
    },

    /// Generic error with string message.
    Other(String),
}

impl fmt::Display for MgldaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MgldaError::InvalidHyperparameter {
                param,
                value,
                constraint,
            } => {
                write!(
                    f,
                    "Invalid hyperparameter: {param} = {value}, expected {constraint}"
                )
            }
            MgldaError::DimensionMismatch { expected, actual } => {
                write!(f, "Dimension mismatch: expected {expected}, got {actual}")
            }
            MgldaError::EmptyCorpus => {
                write!(f, "Corpus must contain at least one document and a non-empty vocabulary")
            }
            MgldaError::WordIdOutOfRange { word, vocab_size } => {
                write!(
                    f,
                    "Word id {word} out of range for vocabulary of size {vocab_size}"
                )
            }
            MgldaError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for MgldaError {}

impl From<&str> for MgldaError {
    fn from(msg: &str) -> Self {
        MgldaError::Other(msg.to_string())
    }
}

impl From<String> for MgldaError {
    fn from(msg: String) -> Self {
        MgldaError::Other(msg)
    }
}

impl MgldaError {
    /// Create an invalid hyperparameter error from a parameter name and value.
    #[must_use]
    pub fn invalid_hyperparameter(param: &str, value: impl fmt::Display, constraint: &str) -> Self {
        Self::InvalidHyperparameter {
            param: param.to_string(),
            value: value.to_string(),
            constraint: constraint.to_string(),
        }
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, MgldaError>;
