//! Handle filtering/where clauses translation.

use query_engine_orql::orql::ast;
use query_engine_sql::sql;

use super::values;
use crate::translation::error::Error;
use crate::translation::helpers::EntityAndAlias;

/// Translate a filter expression of the entity instance `current` into a SQL predicate.
/// Columns are qualified with the alias of `current`, literals and parameters
/// become bound values.
pub fn translate_expression(
    current: &EntityAndAlias,
    predicate: &ast::QueryExp,
) -> Result<sql::ast::Expression, Error> {
    match predicate {
        ast::QueryExp::Nest(expression) => translate_expression(current, expression),
        ast::QueryExp::Logic { left, op, right } => {
            let left = Box::new(translate_expression(current, left)?);
            let right = Box::new(translate_expression(current, right)?);
            Ok(match op {
                ast::LogicOp::And => sql::ast::Expression::And { left, right },
                ast::LogicOp::Or => sql::ast::Expression::Or { left, right },
            })
        }
        ast::QueryExp::Not(expression) => Ok(sql::ast::Expression::Not(Box::new(
            translate_expression(current, expression)?,
        ))),
        ast::QueryExp::Compare { left, op, right } => {
            Ok(sql::ast::Expression::BinaryOperation {
                left: Box::new(translate_column(current, left)?),
                operator: translate_operator(*op),
                right: Box::new(translate_operand(current, right)?),
            })
        }
    }
}

/// Map a comparison operator to its SQL counterpart.
pub fn translate_operator(op: ast::CompareOp) -> sql::ast::BinaryOperator {
    match op {
        ast::CompareOp::Eq => sql::ast::BinaryOperator::Equals,
        ast::CompareOp::Ne => sql::ast::BinaryOperator::NotEquals,
        ast::CompareOp::Gt => sql::ast::BinaryOperator::GreaterThan,
        ast::CompareOp::Ge => sql::ast::BinaryOperator::GreaterThanOrEqualTo,
        ast::CompareOp::Lt => sql::ast::BinaryOperator::LessThan,
        ast::CompareOp::Le => sql::ast::BinaryOperator::LessThanOrEqualTo,
        ast::CompareOp::Like => sql::ast::BinaryOperator::Like,
    }
}

/// Filters may reference any column of the entity, including the ones backing relations.
fn translate_column(
    current: &EntityAndAlias,
    column: &ast::Column,
) -> Result<sql::ast::Expression, Error> {
    let column_info =
        current
            .info
            .any_column(&column.name)
            .ok_or_else(|| Error::UnknownField {
                entity: current.name.clone(),
                path: current.path().to_string(),
                field: column.name.clone(),
            })?;
    Ok(sql::ast::Expression::ColumnReference(
        sql::helpers::make_column_reference(
            current.alias.clone(),
            sql::ast::ColumnName(column_info.name.clone()),
        ),
    ))
}

fn translate_operand(
    current: &EntityAndAlias,
    operand: &ast::Operand,
) -> Result<sql::ast::Expression, Error> {
    match operand {
        ast::Operand::Column(column) => translate_column(current, column),
        ast::Operand::Param(param) => Ok(sql::ast::Expression::Value(
            sql::ast::Value::Variable(param.name.clone()),
        )),
        ast::Operand::Value(literal) => Ok(sql::ast::Expression::Value(
            values::translate_literal(literal),
        )),
    }
}
