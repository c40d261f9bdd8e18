//! Execution of compiled plans against a database.

pub mod error;
pub mod executor;
pub mod hydration;
pub mod metrics;
pub mod query;

pub use executor::{QueryExecutor, Row, SqlxExecutor, Variables};
