//! Errors for query translation.

/// A type for translation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("entity '{0}' not found")]
    EntityNotFound(String),
    #[error("unknown field '{path}.{field}': '{field}' is neither a column nor a relation of entity '{entity}'")]
    UnknownField {
        entity: String,
        path: String,
        field: String,
    },
    #[error("'{path}.{field}' is a column and cannot have a filter or a nested selection")]
    NestedSelectionOnColumn { path: String, field: String },
    #[error("the alias '{0}' is generated more than once")]
    DuplicateAlias(String),
    #[error("column '{column}' not found in entity '{entity}'")]
    ColumnNotFoundInEntity { entity: String, column: String },
    #[error("the query selects no columns from entity '{entity}'")]
    EmptySelection { entity: String },
    #[error("invalid order by path '{0}', expected at least one '.'")]
    InvalidOrderBy(String),
}
