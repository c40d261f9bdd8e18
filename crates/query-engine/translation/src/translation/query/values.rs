//! Handle the translation of literal values.

use query_engine_orql::orql::ast;
use query_engine_sql::sql;

/// Convert a literal from the query text into a SQL value.
pub fn translate_literal(literal: &ast::Literal) -> sql::ast::Value {
    match literal {
        ast::Literal::Null => sql::ast::Value::Null,
        ast::Literal::Bool(b) => sql::ast::Value::Bool(*b),
        ast::Literal::Int(i) => sql::ast::Value::Int8(*i),
        ast::Literal::Float(f) => sql::ast::Value::Float8(*f),
        ast::Literal::String(s) => sql::ast::Value::String(s.clone()),
    }
}
