//! Error handling for Tally

use crate::utils::Location;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Toolchain error. Every variant is fatal for the stage that raised it.
#[derive(Error, Debug, Clone)]
pub enum Error {
    // ==================== Tokenizer Errors ====================

    #[error("{location}: no token matches the input")]
    Lex { location: Location },

    // ==================== Parser Errors ====================

    #[error("{location}: unexpected token: expected {expected}, found {found}")]
    UnexpectedToken {
        expected: String,
        found: String,
        location: Location,
    },

    #[error("{location}: expected an expression, found {found}")]
    NoPrefixRule { found: String, location: Location },

    #[error("{location}: invalid {kind} literal {literal:?}")]
    InvalidLiteral {
        kind: &'static str,
        literal: String,
        location: Location,
    },

    // ==================== Runtime Errors ====================

    #[error("{location}: undeclared variable {name:?}")]
    UndeclaredVariable { name: String, location: Location },

    #[error("{location}: type mismatch in {context}: {found}")]
    TypeMismatch {
        context: String,
        found: String,
        location: Location,
    },

    #[error("{location}: operator {op:?} is not defined on {operand}")]
    UndefinedOperator {
        op: String,
        operand: String,
        location: Location,
    },

    #[error("{location}: {callee} expects {expected} argument(s), got {actual}")]
    ArityMismatch {
        callee: String,
        expected: usize,
        actual: usize,
        location: Location,
    },

    #[error("{location}: not implemented: {feature}")]
    UnimplementedFeature { feature: String, location: Location },

    #[error("{location}: expression is not callable")]
    NotCallable { location: Location },

    #[error("{location}: left hand side of assignment must be an identifier")]
    InvalidAssignmentTarget { location: Location },

    #[error("{location}: integer division by zero")]
    DivisionByZero { location: Location },

    #[error("{location}: nesting deeper than {limit} levels")]
    RecursionTooDeep { limit: usize, location: Location },

    // ==================== Wire Format Errors ====================

    #[error("line {line}: {message}")]
    Decode { line: usize, message: String },

    #[error("IO error: {0}")]
    Io(String),
}

impl Error {
    pub fn decode(line: usize, message: impl Into<String>) -> Self {
        Self::Decode { line, message: message.into() }
    }

    /// Get the location associated with this error
    pub fn location(&self) -> Option<&Location> {
        match self {
            Self::Lex { location }
            | Self::UnexpectedToken { location, .. }
            | Self::NoPrefixRule { location, .. }
            | Self::InvalidLiteral { location, .. }
            | Self::UndeclaredVariable { location, .. }
            | Self::TypeMismatch { location, .. }
            | Self::UndefinedOperator { location, .. }
            | Self::ArityMismatch { location, .. }
            | Self::UnimplementedFeature { location, .. }
            | Self::NotCallable { location }
            | Self::InvalidAssignmentTarget { location }
            | Self::DivisionByZero { location }
            | Self::RecursionTooDeep { location, .. } => Some(location),
            Self::Decode { .. } | Self::Io(_) => None,
        }
    }

    /// Stable name of the error kind, used in structured diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Lex { .. } => "LexError",
            Self::UnexpectedToken { .. } | Self::NoPrefixRule { .. } | Self::InvalidLiteral { .. } => {
                "ParseError"
            }
            Self::UndeclaredVariable { .. } => "UndeclaredVariable",
            Self::TypeMismatch { .. } | Self::UndefinedOperator { .. } => "TypeMismatch",
            Self::ArityMismatch { .. } => "ArityMismatch",
            Self::UnimplementedFeature { .. } => "UnimplementedFeature",
            Self::NotCallable { .. } | Self::InvalidAssignmentTarget { .. } => "InvalidTarget",
            Self::DivisionByZero { .. } => "DivisionByZero",
            Self::RecursionTooDeep { .. } => "RecursionTooDeep",
            Self::Decode { .. } => "DecodeError",
            Self::Io(_) => "IoError",
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
