//! Tokenizer for calculator expressions.

use super::error::CalcError;
use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    Number(f64),
    /// Constant or function name, possibly `Math.`-qualified.
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Ident(name) => write!(f, "{name}"),
            Self::Plus => write!(f, "+"),
            Self::Minus => write!(f, "-"),
            Self::Star => write!(f, "*"),
            Self::Slash => write!(f, "/"),
            Self::Caret => write!(f, "^"),
            Self::LParen => write!(f, "("),
            Self::RParen => write!(f, ")"),
        }
    }
}

/// Split an expression into tokens.
///
/// Supports:
/// - decimal numbers with optional fraction and exponent (`12`, `.5`, `1.5e-3`)
/// - identifiers `[A-Za-z_][A-Za-z0-9_.]*`
/// - operators `+ - * / ^` and parentheses
pub fn tokenize(input: &str) -> Result<Vec<Token>, CalcError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        let single = match c {
            '+' => Some(Token::Plus),
            '-' => Some(Token::Minus),
            '*' => Some(Token::Star),
            '/' => Some(Token::Slash),
            '^' => Some(Token::Caret),
            '(' => Some(Token::LParen),
            ')' => Some(Token::RParen),
            _ => None,
        };
        if let Some(token) = single {
            tokens.push(token);
            i += 1;
            continue;
        }

        if c.is_ascii_digit() || c == '.' {
            let (value, next) = read_number(&chars, i)?;
            tokens.push(Token::Number(value));
            i = next;
            continue;
        }

        if c.is_ascii_alphabetic() || c == '_' {
            let start = i;
            i += 1;
            while i < chars.len()
                && (chars[i].is_ascii_alphanumeric() || chars[i] == '_' || chars[i] == '.')
            {
                i += 1;
            }
            tokens.push(Token::Ident(chars[start..i].iter().collect()));
            continue;
        }

        return Err(CalcError::Evaluation(format!("Unexpected character '{c}'")));
    }

    Ok(tokens)
}

/// Read a numeric literal starting at `start`. Returns the value and the
/// index just past it.
fn read_number(chars: &[char], start: usize) -> Result<(f64, usize), CalcError> {
    let mut i = start;
    let digits = |i: &mut usize| {
        while *i < chars.len() && chars[*i].is_ascii_digit() {
            *i += 1;
        }
    };

    digits(&mut i);
    if i < chars.len() && chars[i] == '.' {
        i += 1;
        digits(&mut i);
    }

    // Exponent only counts when digits follow, so `2e` stays `2` then `e`.
    if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
        let mut j = i + 1;
        if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
            j += 1;
        }
        if j < chars.len() && chars[j].is_ascii_digit() {
            i = j;
            digits(&mut i);
        }
    }

    let text: String = chars[start..i].iter().collect();
    text.parse::<f64>()
        .map(|value| (value, i))
        .map_err(|_| CalcError::Evaluation(format!("Invalid number '{text}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operators_and_numbers() {
        let tokens = tokenize("1 + 2.5*(3^2)").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Number(1.0),
                Token::Plus,
                Token::Number(2.5),
                Token::Star,
                Token::LParen,
                Token::Number(3.0),
                Token::Caret,
                Token::Number(2.0),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn test_exponent_literals() {
        assert_eq!(tokenize("1.5e3").unwrap(), vec![Token::Number(1500.0)]);
        assert_eq!(tokenize("2E-2").unwrap(), vec![Token::Number(0.02)]);
        assert_eq!(tokenize(".5").unwrap(), vec![Token::Number(0.5)]);
        assert_eq!(
            tokenize("2e").unwrap(),
            vec![Token::Number(2.0), Token::Ident("e".into())]
        );
    }

    #[test]
    fn test_qualified_identifiers() {
        assert_eq!(
            tokenize("Math.sqrt(4)").unwrap(),
            vec![
                Token::Ident("Math.sqrt".into()),
                Token::LParen,
                Token::Number(4.0),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn test_invalid_input() {
        assert!(tokenize("1 $ 2").is_err());
        assert!(tokenize(".").is_err());
    }
}
