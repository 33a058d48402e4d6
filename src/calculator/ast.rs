//! Expression tree produced by the parser.
//!
//! Trees are built with a bounded height, so the recursive walks here and
//! in evaluation stay shallow.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinaryOp {
    pub fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
            Self::Div => '/',
            Self::Pow => '^',
        }
    }
}

/// Parsed arithmetic expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Number(f64),
    /// A bare name, resolved against the constant table at evaluation time.
    Symbol(String),
    Neg(Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    /// A unary function applied to one argument.
    Call(String, Box<Expr>),
}

impl fmt::Display for Expr {
    /// Fully parenthesised form, used in debug logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Symbol(name) => write!(f, "{name}"),
            Self::Neg(inner) => write!(f, "(-{inner})"),
            Self::Binary(op, l, r) => write!(f, "({l} {} {r})", op.symbol()),
            Self::Call(name, arg) => write!(f, "{name}({arg})"),
        }
    }
}
