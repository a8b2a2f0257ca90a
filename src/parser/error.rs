use thiserror::Error;

use crate::token::Token;

/// A recoverable syntax error with the 1-based position of the token that
/// triggered it. The parser records these and keeps going; callers must
/// treat a non-empty error list as a compilation failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message} at line {line}, column {column}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    pub fn at(token: &Token, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: token.line,
            column: token.column,
        }
    }
}
