//! Syntactic pre-check for calculator expressions.
//!
//! Rejects a few classes of malformed input cheaply, before any tokenizing
//! or interpretation happens. Passing this check does not guarantee the
//! expression can be evaluated (unknown identifiers are caught later).

use super::error::ValidationError;
use lazy_static::lazy_static;
use regex::Regex;
use std::panic;
use tracing::{debug, error};

lazy_static! {
    /// Two or more operator characters in a row, whitespace allowed in between.
    static ref OPERATOR_RUN: Regex = Regex::new(
        r"[+\-*/^](?:\s*[+\-*/^])+"
    ).unwrap();

    /// A parenthesis pair with nothing but whitespace inside.
    static ref EMPTY_PARENS: Regex = Regex::new(
        r"\(\s*\)"
    ).unwrap();
}

/// Outcome of [`validate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    Invalid(ValidationError),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Convert into a `Result` so callers can use `?`.
    pub fn into_result(self) -> Result<(), ValidationError> {
        match self {
            Self::Valid => Ok(()),
            Self::Invalid(reason) => Err(reason),
        }
    }
}

/// Check the raw text of an expression.
///
/// Checks run in order and the first failure wins:
/// 1. `(` and `)` counts match
/// 2. no run of consecutive operators (except a unary minus after `*`, `/` or `^`)
/// 3. no empty `()` pair
pub fn validate(expr: &str) -> ValidationResult {
    match panic::catch_unwind(|| run_checks(expr)) {
        Ok(Ok(())) => ValidationResult::Valid,
        Ok(Err(reason)) => {
            debug!(expression = expr, %reason, "Expression rejected");
            ValidationResult::Invalid(reason)
        }
        Err(_) => {
            error!(expression = expr, "Validator panicked");
            ValidationResult::Invalid(ValidationError::MalformedExpression)
        }
    }
}

fn run_checks(expr: &str) -> Result<(), ValidationError> {
    if !parens_balanced(expr) {
        return Err(ValidationError::UnbalancedParens);
    }

    if OPERATOR_RUN
        .find_iter(expr)
        .any(|m| !is_unary_minus_run(m.as_str()))
    {
        return Err(ValidationError::OperatorSequence);
    }

    if EMPTY_PARENS.is_match(expr) {
        return Err(ValidationError::EmptyParens);
    }

    Ok(())
}

/// Only the counts are compared; ordering is left to the parser.
fn parens_balanced(expr: &str) -> bool {
    let open = expr.chars().filter(|&c| c == '(').count();
    let close = expr.chars().filter(|&c| c == ')').count();
    open == close
}

/// A two-operator run like `*-`, `/-` or `^-` negates the right operand.
fn is_unary_minus_run(run: &str) -> bool {
    let ops: Vec<char> = run.chars().filter(|c| !c.is_whitespace()).collect();
    matches!(ops.as_slice(), ['*' | '/' | '^', '-'])
}
