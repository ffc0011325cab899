// ABOUTME: Error types for lex, parse, type and evaluation failures

use thiserror::Error;

/// Every diagnostic the lexer, parser, type checker, or evaluator can raise.
///
/// `VibeError` doubles as the payload of a runtime `Value::Error` (it
/// short-circuits evaluation as a first-class value, spec.md §3.3) and as
/// the parser's accumulated diagnostics type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VibeError {
    #[error("{message}")]
    LexError {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("{message}")]
    ParseError {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("type mismatch: {message}")]
    TypeError {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("identifier not found: {name}")]
    NameError {
        name: String,
        line: usize,
        column: usize,
    },

    #[error("wrong number of arguments: got={actual}, want={expected}")]
    ArityError {
        expected: String,
        actual: usize,
        line: usize,
        column: usize,
    },

    #[error("{message}")]
    IndexError {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("division by zero")]
    DivisionByZero { line: usize, column: usize },

    #[error("value is not callable")]
    NotCallable { line: usize, column: usize },

    #[error("value of type {type_name} is not iterable")]
    NotIterable {
        type_name: String,
        line: usize,
        column: usize,
    },

    #[error("{message}")]
    AttributeError {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("{message}")]
    RequireError {
        message: String,
        line: usize,
        column: usize,
    },
}

impl VibeError {
    pub fn line(&self) -> usize {
        match self {
            VibeError::LexError { line, .. }
            | VibeError::ParseError { line, .. }
            | VibeError::TypeError { line, .. }
            | VibeError::NameError { line, .. }
            | VibeError::ArityError { line, .. }
            | VibeError::IndexError { line, .. }
            | VibeError::DivisionByZero { line, .. }
            | VibeError::NotCallable { line, .. }
            | VibeError::NotIterable { line, .. }
            | VibeError::AttributeError { line, .. }
            | VibeError::RequireError { line, .. } => *line,
        }
    }

    pub fn column(&self) -> usize {
        match self {
            VibeError::LexError { column, .. }
            | VibeError::ParseError { column, .. }
            | VibeError::TypeError { column, .. }
            | VibeError::NameError { column, .. }
            | VibeError::ArityError { column, .. }
            | VibeError::IndexError { column, .. }
            | VibeError::DivisionByZero { column, .. }
            | VibeError::NotCallable { column, .. }
            | VibeError::NotIterable { column, .. }
            | VibeError::AttributeError { column, .. }
            | VibeError::RequireError { column, .. } => *column,
        }
    }

    /// Short kind name, used by `type()`-style introspection and tests.
    pub fn kind(&self) -> &'static str {
        match self {
            VibeError::LexError { .. } => "LexError",
            VibeError::ParseError { .. } => "ParseError",
            VibeError::TypeError { .. } => "TypeError",
            VibeError::NameError { .. } => "NameError",
            VibeError::ArityError { .. } => "ArityError",
            VibeError::IndexError { .. } => "IndexError",
            VibeError::DivisionByZero { .. } => "DivisionByZero",
            VibeError::NotCallable { .. } => "NotCallable",
            VibeError::NotIterable { .. } => "NotIterable",
            VibeError::AttributeError { .. } => "AttributeError",
            VibeError::RequireError { .. } => "RequireError",
        }
    }

    pub fn type_error(message: impl Into<String>, line: usize, column: usize) -> Self {
        VibeError::TypeError {
            message: message.into(),
            line,
            column,
        }
    }

    pub fn name_error(name: impl Into<String>, line: usize, column: usize) -> Self {
        VibeError::NameError {
            name: name.into(),
            line,
            column,
        }
    }

    pub fn arity_error(expected: impl Into<String>, actual: usize, line: usize, column: usize) -> Self {
        VibeError::ArityError {
            expected: expected.into(),
            actual,
            line,
            column,
        }
    }

    pub fn index_error(message: impl Into<String>, line: usize, column: usize) -> Self {
        VibeError::IndexError {
            message: message.into(),
            line,
            column,
        }
    }

    pub fn attribute_error(message: impl Into<String>, line: usize, column: usize) -> Self {
        VibeError::AttributeError {
            message: message.into(),
            line,
            column,
        }
    }

    pub fn require_error(message: impl Into<String>, line: usize, column: usize) -> Self {
        VibeError::RequireError {
            message: message.into(),
            line,
            column,
        }
    }
}
