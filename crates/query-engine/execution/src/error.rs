//! Errors for query execution.

/// Errors raised while binding parameters or running a query.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Query(#[from] QueryError),
    #[error("{0}")]
    DB(#[from] sqlx::Error),
}

/// Errors in the parameters supplied by the caller.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueryError {
    #[error("no value was supplied for parameter '{0}'")]
    VariableNotFound(String),
    #[error("parameter '{name}' has an unsupported value: {value}")]
    UnsupportedVariableValue {
        name: String,
        value: serde_json::Value,
    },
}
