//! Errors raised while tokenizing or parsing ORQL text.

use std::fmt;

use thiserror::Error;

/// A span in the query text, in byte offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Byte offset from the start of the input.
    pub start: usize,
    /// Byte offset of the end of the span (exclusive).
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// A zero-length span at the given position.
    pub fn at(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Extends this span to include another span.
    pub fn extend(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "offset {}", self.start)
    }
}

/// A lexical or syntactic error. The first one encountered aborts the parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("unexpected character '{character}' at {span}")]
    UnexpectedCharacter { character: char, span: Span },
    #[error("unterminated string literal starting at {span}")]
    UnterminatedString { span: Span },
    #[error("expected a parameter name after '$' at {span}")]
    InvalidParameter { span: Span },
    #[error("expected {expected}, found {found} at {span}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },
    #[error("empty selection list at {span}")]
    EmptySelection { span: Span },
    #[error("cannot negate {found} at {span}, only numbers can be negated")]
    InvalidNegation { found: String, span: Span },
    #[error("invalid number literal '{literal}' at {span}")]
    InvalidNumber { literal: String, span: Span },
}

impl Error {
    /// Where in the query text the error was detected.
    pub fn span(&self) -> Span {
        match self {
            Error::UnexpectedCharacter { span, .. }
            | Error::UnterminatedString { span }
            | Error::InvalidParameter { span }
            | Error::UnexpectedToken { span, .. }
            | Error::EmptySelection { span }
            | Error::InvalidNegation { span, .. }
            | Error::InvalidNumber { span, .. } => *span,
        }
    }

    /// Whether this error was raised by the tokenizer rather than the parser.
    pub fn is_lexical(&self) -> bool {
        matches!(
            self,
            Error::UnexpectedCharacter { .. }
                | Error::UnterminatedString { .. }
                | Error::InvalidParameter { .. }
        )
    }
}
