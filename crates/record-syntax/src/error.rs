//! Parse failures.

use std::fmt;

use crate::ast::Span;

/// Error produced when source text cannot be lexed or parsed at declaration level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A string, char literal or block comment runs to the end of the input.
    Unterminated {
        /// What was left open ("string literal", "block comment", ...)
        what: &'static str,
        span: Span,
    },

    /// A token that cannot start or continue the construct being parsed.
    UnexpectedToken {
        found: String,
        expected: &'static str,
        span: Span,
    },

    /// A brace, bracket or parenthesis group is never closed.
    UnbalancedDelimiter { open: char, span: Span },

    /// Input ended while a construct was still open.
    UnexpectedEof { expected: &'static str },
}

impl ParseError {
    /// Location of the error, when one is known.
    pub fn span(&self) -> Option<Span> {
        match self {
            ParseError::Unterminated { span, .. }
            | ParseError::UnexpectedToken { span, .. }
            | ParseError::UnbalancedDelimiter { span, .. } => Some(*span),
            ParseError::UnexpectedEof { .. } => None,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Unterminated { what, span } => {
                write!(f, "unterminated {} at {}", what, span)
            }
            ParseError::UnexpectedToken {
                found,
                expected,
                span,
            } => write!(f, "expected {} but found `{}` at {}", expected, found, span),
            ParseError::UnbalancedDelimiter { open, span } => {
                write!(f, "unclosed `{}` opened at {}", open, span)
            }
            ParseError::UnexpectedEof { expected } => {
                write!(f, "unexpected end of input, expected {}", expected)
            }
        }
    }
}

impl std::error::Error for ParseError {}
