//! Arithmetic expressions
//!
//! Numeric inputs accept small sums such as `12.50 + 3` or `(4 * 6.25) / 3`.
//! Only decimal literals, `+ - * /`, unary signs and parentheses are
//! understood; anything else is rejected.

use std::{fmt, iter::Peekable, str::FromStr, vec};

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

/// Nesting limit for parentheses and unary signs.
const MAX_DEPTH: usize = 64;

/// Errors raised while evaluating an expression.
#[derive(Debug, Error, PartialEq)]
pub enum ExpressionError {
    /// Input was empty or whitespace.
    #[error("expression is empty")]
    Empty,

    /// A character outside the grammar (character, byte offset).
    #[error("unexpected character {0:?} at position {1}")]
    UnexpectedCharacter(char, usize),

    /// A number literal could not be parsed.
    #[error("invalid number {literal:?}")]
    InvalidNumber {
        /// Literal as written
        literal: String,

        /// Parse failure
        #[source]
        source: rust_decimal::Error,
    },

    /// A token appeared where it is not allowed.
    #[error("unexpected {0}")]
    UnexpectedToken(String),

    /// Input ended before the expression was complete.
    #[error("unexpected end of expression")]
    UnexpectedEnd,

    /// An opening parenthesis was never closed.
    #[error("unclosed parenthesis")]
    UnclosedParenthesis,

    /// Parentheses or signs nested deeper than allowed.
    #[error("expression nested too deeply")]
    TooDeep,

    /// Division by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// Result left the decimal range.
    #[error("arithmetic overflow")]
    Overflow,
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Number(Decimal),
    Plus,
    Minus,
    Star,
    Slash,
    Open,
    Close,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(value) => write!(f, "number {value}"),
            Token::Plus => f.write_str("'+'"),
            Token::Minus => f.write_str("'-'"),
            Token::Star => f.write_str("'*'"),
            Token::Slash => f.write_str("'/'"),
            Token::Open => f.write_str("'('"),
            Token::Close => f.write_str("')'"),
        }
    }
}

/// Evaluates an arithmetic expression.
///
/// # Errors
///
/// Returns an [`ExpressionError`] if the input is not a well-formed expression
/// or its value cannot be computed (division by zero, overflow).
pub fn evaluate(input: &str) -> Result<Decimal, ExpressionError> {
    let tokens = tokenize(input)?;

    if tokens.is_empty() {
        return Err(ExpressionError::Empty);
    }

    let mut parser = Parser {
        tokens: tokens.into_iter().peekable(),
        depth: 0,
    };

    let value = parser.expression()?;

    match parser.tokens.next() {
        None => Ok(value),
        Some(token) => Err(ExpressionError::UnexpectedToken(token.to_string())),
    }
}

/// Evaluates an expression, falling back to `default` when it cannot be evaluated.
pub fn evaluate_or(input: &str, default: Decimal) -> Decimal {
    evaluate(input).unwrap_or_else(|error| {
        debug!(%error, input, "using default for unparseable expression");

        default
    })
}

fn tokenize(input: &str) -> Result<Vec<Token>, ExpressionError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(position, c)) = chars.peek() {
        let token = match c {
            c if c.is_whitespace() => {
                chars.next();
                continue;
            }
            '0'..='9' | '.' => {
                let mut literal = String::new();

                while let Some(&(_, c)) = chars.peek() {
                    if !(c.is_ascii_digit() || c == '.') {
                        break;
                    }

                    literal.push(c);
                    chars.next();
                }

                let parsed = match literal.strip_prefix('.') {
                    Some(fraction) => Decimal::from_str(&format!("0.{fraction}")),
                    None => Decimal::from_str(&literal),
                };

                let value = parsed
                    .map_err(|source| ExpressionError::InvalidNumber { literal, source })?;

                tokens.push(Token::Number(value));
                continue;
            }
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '(' => Token::Open,
            ')' => Token::Close,
            other => return Err(ExpressionError::UnexpectedCharacter(other, position)),
        };

        tokens.push(token);
        chars.next();
    }

    Ok(tokens)
}

/// Recursive-descent evaluator:
///
/// ```text
/// expression := term (('+' | '-') term)*
/// term       := factor (('*' | '/') factor)*
/// factor     := ('+' | '-') factor | number | '(' expression ')'
/// ```
struct Parser {
    tokens: Peekable<vec::IntoIter<Token>>,
    depth: usize,
}

impl Parser {
    fn expression(&mut self) -> Result<Decimal, ExpressionError> {
        let mut value = self.term()?;

        loop {
            value = match self.tokens.peek() {
                Some(Token::Plus) => {
                    self.tokens.next();
                    let rhs = self.term()?;
                    value.checked_add(rhs).ok_or(ExpressionError::Overflow)?
                }
                Some(Token::Minus) => {
                    self.tokens.next();
                    let rhs = self.term()?;
                    value.checked_sub(rhs).ok_or(ExpressionError::Overflow)?
                }
                _ => return Ok(value),
            };
        }
    }

    fn term(&mut self) -> Result<Decimal, ExpressionError> {
        let mut value = self.factor()?;

        loop {
            value = match self.tokens.peek() {
                Some(Token::Star) => {
                    self.tokens.next();
                    let rhs = self.factor()?;
                    value.checked_mul(rhs).ok_or(ExpressionError::Overflow)?
                }
                Some(Token::Slash) => {
                    self.tokens.next();
                    let rhs = self.factor()?;

                    if rhs.is_zero() {
                        return Err(ExpressionError::DivisionByZero);
                    }

                    value.checked_div(rhs).ok_or(ExpressionError::Overflow)?
                }
                _ => return Ok(value),
            };
        }
    }

    fn factor(&mut self) -> Result<Decimal, ExpressionError> {
        match self.tokens.next() {
            Some(Token::Number(value)) => Ok(value),
            Some(Token::Plus) => self.nested(Self::factor),
            Some(Token::Minus) => self.nested(Self::factor).map(|value| -value),
            Some(Token::Open) => {
                let value = self.nested(Self::expression)?;

                match self.tokens.next() {
                    Some(Token::Close) => Ok(value),
                    Some(token) => Err(ExpressionError::UnexpectedToken(token.to_string())),
                    None => Err(ExpressionError::UnclosedParenthesis),
                }
            }
            Some(token) => Err(ExpressionError::UnexpectedToken(token.to_string())),
            None => Err(ExpressionError::UnexpectedEnd),
        }
    }

    fn nested(
        &mut self,
        rule: fn(&mut Self) -> Result<Decimal, ExpressionError>,
    ) -> Result<Decimal, ExpressionError> {
        if self.depth >= MAX_DEPTH {
            return Err(ExpressionError::TooDeep);
        }

        self.depth += 1;
        let value = rule(self);
        self.depth -= 1;

        value
    }
}
