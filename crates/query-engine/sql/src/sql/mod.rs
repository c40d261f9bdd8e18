//! The relational plan: a SQL AST, helpers to build it, and its rendering to a
//! parameterised SQL string.

pub mod ast;
pub mod convert;
pub mod execution_plan;
pub mod helpers;
pub mod string;
