//! Tree queries over a relational schema.
//!
//! A [`TreeQuery`] parses ORQL text such as `user(id = $id): {id, profile: {gender}}`,
//! compiles it against a [`SchemaProvider`] and runs the result with a
//! [`QueryExecutor`].

pub mod error;
pub mod tree_query;

pub use error::{Error, ErrorKind};
pub use tree_query::TreeQuery;

pub use orql_configuration as configuration;
pub use query_engine_execution::metrics::Metrics;
pub use query_engine_execution::{QueryExecutor, Row, SqlxExecutor, Variables};
pub use query_engine_metadata::metadata::{Metadata, SchemaProvider};
pub use query_engine_sql::sql::ast::OrderByDirection;
pub use query_engine_sql::sql::execution_plan::ExecutionPlan;
pub use query_engine_sql::sql::string::{Param, SQL};
