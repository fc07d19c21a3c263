//! Evaluation error taxonomy.

use thiserror::Error;

/// Why an expression was rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    /// The text is not a well-formed expression.
    #[error("syntax error at offset {offset}: {message}")]
    Syntax { offset: usize, message: String },

    /// The text parses but contains a node outside the arithmetic subset.
    #[error("construct not allowed: {construct}")]
    DisallowedConstruct { construct: &'static str },

    /// A literal that is not an integer or float.
    #[error("invalid literal: {literal}")]
    InvalidLiteral { literal: String },

    /// Division, floor division, modulo or negative power of zero.
    #[error("division by zero")]
    DivisionByZero,

    /// An integer result or literal outside the exact integer range.
    #[error("integer out of range")]
    IntegerOverflow,

    /// The result is NaN or infinite.
    #[error("result is not a finite number")]
    NonFinite,
}

/// Fieldless mirror of [`EvalError`] for matching on the reason alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalErrorKind {
    Syntax,
    DisallowedConstruct,
    InvalidLiteral,
    DivisionByZero,
    IntegerOverflow,
    NonFinite,
}

impl EvalError {
    pub(crate) fn syntax(offset: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            offset,
            message: message.into(),
        }
    }

    /// Get the kind of this error.
    pub fn kind(&self) -> EvalErrorKind {
        match self {
            Self::Syntax { .. } => EvalErrorKind::Syntax,
            Self::DisallowedConstruct { .. } => EvalErrorKind::DisallowedConstruct,
            Self::InvalidLiteral { .. } => EvalErrorKind::InvalidLiteral,
            Self::DivisionByZero => EvalErrorKind::DivisionByZero,
            Self::IntegerOverflow => EvalErrorKind::IntegerOverflow,
            Self::NonFinite => EvalErrorKind::NonFinite,
        }
    }
}
