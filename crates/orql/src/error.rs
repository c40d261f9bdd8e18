//! The error type of the query builder.

use orql_configuration::error::{MakeRuntimeConfigurationError, ParseConfigurationError};
use query_engine_execution::error as execution;
use query_engine_orql::orql;
use query_engine_translation::translation;

/// Any failure while building, compiling or running a tree query.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Syntax(#[from] orql::Error),
    #[error("{0}")]
    Compile(#[from] translation::error::Error),
    #[error("{0}")]
    Execution(#[from] execution::Error),
    #[error("{0}")]
    ParseConfiguration(#[from] ParseConfigurationError),
    #[error("{0}")]
    MakeRuntimeConfiguration(#[from] MakeRuntimeConfigurationError),
}

/// The stage an [`Error`] was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lex,
    Parse,
    Compile,
    /// A named parameter had no value, or a value that cannot be bound.
    Binding,
    Execution,
    Configuration,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Syntax(err) if err.is_lexical() => ErrorKind::Lex,
            Error::Syntax(_) => ErrorKind::Parse,
            Error::Compile(_) => ErrorKind::Compile,
            Error::Execution(execution::Error::Query(_)) => ErrorKind::Binding,
            Error::Execution(execution::Error::DB(_)) => ErrorKind::Execution,
            Error::ParseConfiguration(_) | Error::MakeRuntimeConfiguration(_) => {
                ErrorKind::Configuration
            }
        }
    }

    /// Where in the query text the error was found, for lexical and parse errors.
    pub fn location(&self) -> Option<orql::Span> {
        match self {
            Error::Syntax(err) => Some(err.span()),
            _ => None,
        }
    }
}
