//! Compile a parsed tree query against the entity metadata into an ExecutionPlan.

pub mod error;
pub mod helpers;
pub mod query;
