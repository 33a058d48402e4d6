//! Calculator module for validating and evaluating mathematical expressions.
//!
//! This module provides functionality to:
//! - Reject malformed input with a cheap syntactic pre-check
//! - Tokenize, parse and evaluate arithmetic over named constants and functions
//! - Copy results to the clipboard

mod ast;
mod clipboard;
mod error;
mod evaluation;
mod lexer;
mod parser;
pub mod symbols;
mod validation;

pub use ast::{BinaryOp, Expr};
pub use clipboard::{ClipboardError, copy_to_clipboard};
pub use error::{CalcError, ValidationError};
pub use evaluation::{EvaluationResult, evaluate};
pub use lexer::{Token, tokenize};
pub use parser::parse;
pub use validation::{ValidationResult, validate};
