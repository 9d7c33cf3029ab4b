//! `${...}` placeholder handling and a small integer expression evaluator:
//! `+ - * /`, parentheses, literals and dotted variables such as
//! `wells.endRow`, looked up in a name-to-value environment.
use std::collections::HashMap;

use regex::Regex;
use thiserror::Error;

/// Errors raised while evaluating a position expression.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EvalError {
    #[error("Unknown variable '{0}'")]
    UnknownVariable(String),

    #[error("Malformed expression '{0}'")]
    Malformed(String),

    #[error("Division by zero in '{0}'")]
    DivisionByZero(String),
}

fn placeholder_pattern() -> Regex {
    Regex::new(r"\$\{([^}]*)\}").expect("Hardcode regex pattern")
}

/// The body of the first `${...}` placeholder, if any.
pub fn extract_expression(input: &str) -> Option<String> {
    placeholder_pattern()
        .captures(input)
        .and_then(|captures| captures.get(1))
        .map(|body| body.as_str().to_owned())
}

/// Replaces every `${...}` placeholder with the given text.
pub fn replace_expression(input: &str, value: &str) -> String {
    placeholder_pattern()
        .replace_all(input, value)
        .into_owned()
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(i64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

fn tokenize(expr: &str) -> Result<Vec<Token>, EvalError> {
    let mut tokens = Vec::new();
    let mut chars = expr.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' => {
                chars.next();
            }
            '0'..='9' => {
                let mut digits = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() {
                        digits.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value = digits
                    .parse::<i64>()
                    .map_err(|_| EvalError::Malformed(expr.to_owned()))?;
                tokens.push(Token::Number(value));
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_alphanumeric() || d == '_' || d == '.' {
                        ident.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident));
            }
            '+' => {
                chars.next();
                tokens.push(Token::Plus);
            }
            '-' => {
                chars.next();
                tokens.push(Token::Minus);
            }
            '*' => {
                chars.next();
                tokens.push(Token::Star);
            }
            '/' => {
                chars.next();
                tokens.push(Token::Slash);
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            _ => return Err(EvalError::Malformed(expr.to_owned())),
        }
    }
    Ok(tokens)
}

struct Parser<'a> {
    tokens: Vec<Token>,
    position: usize,
    expr: &'a str,
    env: &'a HashMap<String, i64>,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn expression(&mut self) -> Result<i64, EvalError> {
        let mut value = self.term()?;
        while let Some(op) = self.peek().cloned() {
            match op {
                Token::Plus => {
                    self.advance();
                    value += self.term()?;
                }
                Token::Minus => {
                    self.advance();
                    value -= self.term()?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<i64, EvalError> {
        let mut value = self.factor()?;
        while let Some(op) = self.peek().cloned() {
            match op {
                Token::Star => {
                    self.advance();
                    value *= self.factor()?;
                }
                Token::Slash => {
                    self.advance();
                    let divisor = self.factor()?;
                    if divisor == 0 {
                        return Err(EvalError::DivisionByZero(self.expr.to_owned()));
                    }
                    value /= divisor;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn factor(&mut self) -> Result<i64, EvalError> {
        match self.advance() {
            Some(Token::Number(value)) => Ok(value),
            Some(Token::Ident(name)) => self
                .env
                .get(&name)
                .copied()
                .ok_or(EvalError::UnknownVariable(name)),
            Some(Token::Minus) => Ok(-self.factor()?),
            Some(Token::Plus) => self.factor(),
            Some(Token::LParen) => {
                let value = self.expression()?;
                match self.advance() {
                    Some(Token::RParen) => Ok(value),
                    _ => Err(EvalError::Malformed(self.expr.to_owned())),
                }
            }
            _ => Err(EvalError::Malformed(self.expr.to_owned())),
        }
    }
}

/// Evaluates an expression body (without the `${...}` wrapper) against the
/// variable environment.
pub fn evaluate(expr: &str, env: &HashMap<String, i64>) -> Result<i64, EvalError> {
    let tokens = tokenize(expr)?;
    if tokens.is_empty() {
        return Err(EvalError::Malformed(expr.to_owned()));
    }
    let mut parser = Parser {
        tokens,
        position: 0,
        expr,
        env,
    };
    let value = parser.expression()?;
    if parser.position != parser.tokens.len() {
        return Err(EvalError::Malformed(expr.to_owned()));
    }
    Ok(value)
}
