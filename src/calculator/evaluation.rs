//! Expression evaluation.
//!
//! Validates the raw text, tokenizes and parses it, then walks the tree
//! resolving names through the symbol tables. Every failure is returned as
//! a value; nothing escapes to the caller.

use super::ast::{BinaryOp, Expr};
use super::error::CalcError;
use super::lexer::tokenize;
use super::parser::parse;
use super::symbols;
use super::validation::validate;
use tracing::debug;

/// Result of evaluating a calculator expression.
#[derive(Clone, Debug, PartialEq)]
pub enum EvaluationResult {
    /// A finite numeric value.
    Number(f64),
    /// The expression was rejected or produced no usable number.
    Failure(CalcError),
}

impl EvaluationResult {
    /// Check if this is a successful result.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Number(_))
    }

    /// The numeric value, if any.
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Failure(_) => None,
        }
    }

    /// The failure reason, if any.
    pub fn error(&self) -> Option<&CalcError> {
        match self {
            Self::Number(_) => None,
            Self::Failure(err) => Some(err),
        }
    }

    pub fn into_result(self) -> Result<f64, CalcError> {
        match self {
            Self::Number(value) => Ok(value),
            Self::Failure(err) => Err(err),
        }
    }
}

impl From<Result<f64, CalcError>> for EvaluationResult {
    fn from(result: Result<f64, CalcError>) -> Self {
        match result {
            Ok(value) => Self::Number(value),
            Err(err) => Self::Failure(err),
        }
    }
}

/// Evaluate a mathematical expression.
pub fn evaluate(input: &str) -> EvaluationResult {
    let result = evaluate_checked(input);
    match &result {
        Ok(value) => debug!(expression = input, value, "Expression evaluated"),
        Err(e) => debug!(expression = input, error = %e, "Expression evaluation failed"),
    }
    result.into()
}

fn evaluate_checked(input: &str) -> Result<f64, CalcError> {
    validate(input).into_result()?;

    let tokens = tokenize(input)?;
    let tree = parse(&tokens)?;
    debug!(tree = %tree, "Parsed expression");

    let value = tree.evaluate()?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalcError::NonFinite)
    }
}

impl Expr {
    /// Compute the value of this tree.
    ///
    /// # Errors
    ///
    /// Returns [`CalcError::Evaluation`] for unknown constants or functions.
    /// Non-finite intermediate values are allowed; the caller checks the
    /// final result.
    pub fn evaluate(&self) -> Result<f64, CalcError> {
        match self {
            Expr::Number(n) => Ok(*n),
            Expr::Symbol(name) => symbols::constant(name).ok_or_else(|| {
                if symbols::function(name).is_some() {
                    CalcError::Evaluation(format!("Function '{name}' needs an argument"))
                } else {
                    CalcError::Evaluation(format!("Unknown symbol '{name}'"))
                }
            }),
            Expr::Neg(inner) => Ok(-inner.evaluate()?),
            Expr::Binary(op, l, r) => {
                let left = l.evaluate()?;
                let right = r.evaluate()?;
                Ok(match op {
                    BinaryOp::Add => left + right,
                    BinaryOp::Sub => left - right,
                    BinaryOp::Mul => left * right,
                    BinaryOp::Div => left / right,
                    BinaryOp::Pow => left.powf(right),
                })
            }
            Expr::Call(name, arg) => {
                let f = symbols::function(name).ok_or_else(|| {
                    CalcError::Evaluation(format!("Unknown function '{name}'"))
                })?;
                Ok(f(arg.evaluate()?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::ValidationError;
    use std::f64::consts::PI;

    fn number(input: &str) -> f64 {
        evaluate(input)
            .value()
            .unwrap_or_else(|| panic!("{input} should evaluate"))
    }

    #[test]
    fn test_basic_evaluation() {
        assert_eq!(evaluate("1+2*3"), EvaluationResult::Number(7.0));
        assert_eq!(number("(1+2)*3"), 9.0);
        assert_eq!(number("10 / 4"), 2.5);
        assert_eq!(number("2^10"), 1024.0);
        assert_eq!(number("2^3^2"), 512.0);
    }

    #[test]
    fn test_unary_minus() {
        assert_eq!(number("-5"), -5.0);
        assert_eq!(number("3*-2"), -6.0);
        assert_eq!(number("-2^2"), -4.0);
        assert_eq!(number("2^-1"), 0.5);
        assert_eq!(number("(-5)+1"), -4.0);
    }

    #[test]
    fn test_constants() {
        assert!((number("PI") - PI).abs() < 1e-12);
        assert!((number("Math.PI") - PI).abs() < 1e-12);
        assert!((number("2*pi") - 2.0 * PI).abs() < 1e-12);
        assert!((number("PHI") - 1.618_033_988_749_895).abs() < 1e-12);
    }

    #[test]
    fn test_functions() {
        assert_eq!(number("sqrt(16)"), 4.0);
        assert_eq!(number("Math.sqrt(16)"), 4.0);
        assert_eq!(number("abs(-3) + floor(2.7)"), 5.0);
        assert!(number("sin(0)").abs() < 1e-12);
        assert!((number("log(E)") - 1.0).abs() < 1e-12);
        assert!((number("log10(1000)") - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(evaluate("1/0"), EvaluationResult::Failure(CalcError::NonFinite));
    }

    #[test]
    fn test_domain_error_is_non_finite() {
        assert_eq!(
            evaluate("sqrt(-1)"),
            EvaluationResult::Failure(CalcError::NonFinite)
        );
    }

    #[test]
    fn test_validation_errors_are_surfaced() {
        assert_eq!(
            evaluate("(1+2").error().and_then(CalcError::validation_reason),
            Some(ValidationError::UnbalancedParens)
        );
        assert_eq!(
            evaluate("1++2").error().and_then(CalcError::validation_reason),
            Some(ValidationError::OperatorSequence)
        );
        assert_eq!(
            evaluate("()").error().and_then(CalcError::validation_reason),
            Some(ValidationError::EmptyParens)
        );
    }

    #[test]
    fn test_interpreter_errors() {
        for input in ["foo + 1", "sqrt", "nope(2)", "1 2", ")1(", "", "1 $ 2"] {
            match evaluate(input) {
                EvaluationResult::Failure(CalcError::Evaluation(detail)) => {
                    assert!(!detail.is_empty(), "{input}")
                }
                other => panic!("{input}: unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn test_long_sum_fails_without_overflowing() {
        assert_eq!(
            evaluate(&vec!["1"; 200_000].join("+")),
            EvaluationResult::Failure(CalcError::Evaluation(
                "Expression is nested too deeply".to_string()
            ))
        );
        assert_eq!(number(&vec!["1"; 1000].join("+")), 1000.0);
    }

    #[test]
    fn test_result_helpers() {
        let ok = evaluate("2+2");
        assert!(ok.is_success());
        assert_eq!(ok.clone().into_result(), Ok(4.0));
        assert!(ok.error().is_none());

        let err = evaluate("1/0");
        assert!(!err.is_success());
        assert_eq!(err.value(), None);
    }
}
