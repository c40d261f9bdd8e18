//! Errors that can be thrown when processing configuration.

use std::path::PathBuf;

/// The errors that can be thrown when parsing a configuration directory.
#[derive(Debug, thiserror::Error)]
pub enum ParseConfigurationError {
    #[error("parse error on {file_path}:{line}:{column}: {message}")]
    ParseError {
        file_path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },
    #[error("unsupported configuration version {0}, expected {1}")]
    UnsupportedVersion(u32, u32),
    #[error("I/O error on {file_path}: {error}")]
    IoError {
        file_path: PathBuf,
        error: std::io::Error,
    },
}

/// The errors that can be thrown when writing a configuration directory.
#[derive(Debug, thiserror::Error)]
pub enum WriteParsedConfigurationError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("could not serialize configuration: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// The errors that can be thrown when turning a parsed configuration into a runtime one.
#[derive(Debug, thiserror::Error)]
pub enum MakeRuntimeConfigurationError {
    #[error("missing environment variable when processing {setting}: {error}")]
    MissingEnvironmentVariable {
        setting: &'static str,
        #[source]
        error: crate::environment::Error,
    },
}
