//! Precedence-climbing parser producing an [`Expr`] tree.
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('-' | '+') unary | power
//! power   := primary ('^' unary)?
//! primary := NUMBER | IDENT '(' expr ')' | IDENT | '(' expr ')'
//! ```
//!
//! `^` binds tighter than unary minus and is right-associative, so
//! `-2^2` is `-(2^2)` and `2^3^2` is `2^(3^2)`.

use super::ast::{BinaryOp, Expr};
use super::error::CalcError;
use super::lexer::Token;

type ParseResult<T> = Result<T, CalcError>;

/// Limit on parser recursion (parentheses and unary operators).
const MAX_DEPTH: usize = 256;

/// Limit on the height of the finished tree. Evaluating, displaying and
/// dropping an [`Expr`] all recurse once per level, so a long flat chain
/// like `1+1+...+1` is bounded here.
const MAX_HEIGHT: usize = 1024;

fn too_deep() -> CalcError {
    CalcError::Evaluation("Expression is nested too deeply".to_string())
}

/// Parse a complete token stream. Trailing tokens are an error.
pub fn parse(tokens: &[Token]) -> ParseResult<Expr> {
    if tokens.is_empty() {
        return Err(CalcError::Evaluation("Empty expression".to_string()));
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let node = parser.expr()?;

    if let Some(token) = parser.peek() {
        return Err(CalcError::Evaluation(format!("Unexpected '{token}'")));
    }

    Ok(node.expr)
}

/// A subtree together with its height.
struct Node {
    expr: Expr,
    height: usize,
}

impl Node {
    fn leaf(expr: Expr) -> Self {
        Self { expr, height: 1 }
    }

    fn parent(expr: Expr, child_height: usize) -> ParseResult<Self> {
        let height = child_height + 1;
        if height > MAX_HEIGHT {
            return Err(too_deep());
        }
        Ok(Self { expr, height })
    }

    fn binary(op: BinaryOp, lhs: Node, rhs: Node) -> ParseResult<Self> {
        let child_height = lhs.height.max(rhs.height);
        Self::parent(
            Expr::Binary(op, Box::new(lhs.expr), Box::new(rhs.expr)),
            child_height,
        )
    }
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_rparen(&mut self) -> ParseResult<()> {
        match self.advance() {
            Some(Token::RParen) => Ok(()),
            Some(other) => Err(CalcError::Evaluation(format!(
                "Expected ')' but found '{other}'"
            ))),
            None => Err(CalcError::Evaluation("Expected ')'".to_string())),
        }
    }

    fn expr(&mut self) -> ParseResult<Node> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.term()?;
            lhs = Node::binary(op, lhs, rhs)?;
        }
    }

    fn term(&mut self) -> ParseResult<Node> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = Node::binary(op, lhs, rhs)?;
        }
    }

    fn unary(&mut self) -> ParseResult<Node> {
        if self.depth >= MAX_DEPTH {
            return Err(too_deep());
        }
        self.depth += 1;
        let result = self.unary_inner();
        self.depth -= 1;
        result
    }

    fn unary_inner(&mut self) -> ParseResult<Node> {
        if self.eat(&Token::Minus) {
            let inner = self.unary()?;
            return Node::parent(Expr::Neg(Box::new(inner.expr)), inner.height);
        }
        if self.eat(&Token::Plus) {
            return self.unary();
        }
        self.power()
    }

    fn power(&mut self) -> ParseResult<Node> {
        let base = self.primary()?;
        if self.eat(&Token::Caret) {
            let exponent = self.unary()?;
            return Node::binary(BinaryOp::Pow, base, exponent);
        }
        Ok(base)
    }

    fn primary(&mut self) -> ParseResult<Node> {
        match self.advance().cloned() {
            Some(Token::Number(n)) => Ok(Node::leaf(Expr::Number(n))),
            Some(Token::Ident(name)) => {
                if self.eat(&Token::LParen) {
                    let arg = self.expr()?;
                    self.expect_rparen()?;
                    Node::parent(Expr::Call(name, Box::new(arg.expr)), arg.height)
                } else {
                    Ok(Node::leaf(Expr::Symbol(name)))
                }
            }
            Some(Token::LParen) => {
                let inner = self.expr()?;
                self.expect_rparen()?;
                Ok(inner)
            }
            Some(other) => Err(CalcError::Evaluation(format!("Unexpected '{other}'"))),
            None => Err(CalcError::Evaluation(
                "Unexpected end of expression".to_string(),
            )),
        }
    }
}
