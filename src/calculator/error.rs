//! Error types for expression validation and evaluation.

use thiserror::Error;

/// Reason an expression was rejected by the syntactic pre-check.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Unbalanced parentheses")]
    UnbalancedParens,
    #[error("Invalid operator sequence")]
    OperatorSequence,
    #[error("Empty parentheses")]
    EmptyParens,
    #[error("Malformed expression")]
    MalformedExpression,
}

/// Reason an evaluation produced no number.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalcError {
    /// The expression failed validation and was never interpreted.
    #[error("Calculation error: {0}")]
    Invalid(#[from] ValidationError),
    /// The expression was computed but the result is infinite or NaN.
    #[error("Calculation error: result is not a finite number")]
    NonFinite,
    /// The interpreter could not make sense of the expression.
    #[error("Calculation error: {0}")]
    Evaluation(String),
}

impl CalcError {
    /// The validation reason, if this failure came from the pre-check.
    pub fn validation_reason(&self) -> Option<ValidationError> {
        match self {
            Self::Invalid(reason) => Some(*reason),
            _ => None,
        }
    }
}
