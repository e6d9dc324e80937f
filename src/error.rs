//! Error types shared by the lexer, parser and evaluator.
//!
//! Each stage gets its own fatal error type, matching the teacher's
//! hand-written `Display`/`Error` impls rather than a derive-macro crate.

use std::error::Error;
use std::fmt::{self, Display, Formatter};

use crate::lexer::Position;

/// Error raised by the lexer on an unexpected character.
#[derive(Debug, Clone, PartialEq)]
pub struct LexerError {
    pub message: String,
    pub position: Position,
}

impl LexerError {
    pub fn new(message: impl Into<String>, position: Position) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

impl Display for LexerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LexerError at {}:{}: {}",
            self.position.0, self.position.1, self.message
        )
    }
}

impl Error for LexerError {}

/// Error raised by the parser on a token mismatch or unexpected token.
#[derive(Debug, Clone, PartialEq)]
pub struct ParserError {
    pub message: String,
    pub position: Position,
}

impl ParserError {
    pub fn new(message: impl Into<String>, position: Position) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

impl Display for ParserError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ParserError at {}:{}: {}",
            self.position.0, self.position.1, self.message
        )
    }
}

impl Error for ParserError {}

/// Error raised by the evaluator: unresolved identifier, call to an
/// undefined function, assignment to an undefined variable, `return`
/// outside a function, unknown comparison operator, out-of-bounds array
/// index, type mismatch in arithmetic.
#[derive(Debug, Clone, PartialEq)]
pub struct InterpreterError {
    pub message: String,
}

impl InterpreterError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Display for InterpreterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "InterpreterError: {}", self.message)
    }
}

impl Error for InterpreterError {}

/// Top-level error uniting all three stages, so `main` has a single
/// `Result` to match on.
#[derive(Debug, Clone, PartialEq)]
pub enum YError {
    Lexer(LexerError),
    Parser(ParserError),
    Interpreter(InterpreterError),
}

impl Display for YError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            YError::Lexer(e) => Display::fmt(e, f),
            YError::Parser(e) => Display::fmt(e, f),
            YError::Interpreter(e) => Display::fmt(e, f),
        }
    }
}

impl Error for YError {}

impl From<LexerError> for YError {
    fn from(value: LexerError) -> Self {
        YError::Lexer(value)
    }
}

impl From<ParserError> for YError {
    fn from(value: ParserError) -> Self {
        YError::Parser(value)
    }
}

impl From<InterpreterError> for YError {
    fn from(value: InterpreterError) -> Self {
        YError::Interpreter(value)
    }
}
