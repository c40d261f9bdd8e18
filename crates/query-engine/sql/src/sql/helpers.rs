//! Helpers for building sql::ast types in certain shapes and patterns.

use super::ast::*;

// Empty clauses //

/// An empty `WHERE` clause.
pub fn empty_where() -> Expression {
    true_expr()
}

/// An empty `ORDER BY` clause.
pub fn empty_order_by() -> OrderBy {
    OrderBy { elements: vec![] }
}

/// Empty `LIMIT` and `OFFSET` clauses.
pub fn empty_limit() -> Limit {
    Limit {
        limit: None,
        offset: None,
    }
}

/// A `true` expression.
pub fn true_expr() -> Expression {
    Expression::Value(Value::Bool(true))
}

/// Conjoin two predicates, dropping a `true` on either side.
pub fn and(left: Expression, right: Expression) -> Expression {
    if left == true_expr() {
        right
    } else if right == true_expr() {
        left
    } else {
        Expression::And {
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

// Aliasing //

/// Generate a column expression refering to a specific table.
pub fn make_column(
    table: TableAlias,
    name: ColumnName,
    alias: ColumnAlias,
) -> (ColumnAlias, Expression) {
    (
        alias,
        Expression::ColumnReference(make_column_reference(table, name)),
    )
}

pub fn make_column_reference(table: TableAlias, name: ColumnName) -> ColumnReference {
    ColumnReference { table, name }
}

/// Create column aliases using this function so we build everything in one place.
pub fn make_column_alias(name: String) -> ColumnAlias {
    ColumnAlias { name }
}

/// Create table aliases using this function so we build everything in one place.
pub fn make_table_alias(name: String) -> TableAlias {
    TableAlias { name }
}

/// A reference to a database table, optionally schema-qualified.
pub fn table_reference(schema: Option<&str>, table: &str) -> TableReference {
    TableReference {
        schema: schema.map(|schema| SchemaName(schema.to_string())),
        table: TableName(table.to_string()),
    }
}

// SELECTs //

/// Build a simple select with a select list and the rest are empty.
pub fn simple_select(select_list: Vec<(ColumnAlias, Expression)>) -> Select {
    Select {
        select_list: SelectList(select_list),
        from: None,
        joins: vec![],
        where_: Where(empty_where()),
        order_by: empty_order_by(),
        limit: empty_limit(),
    }
}
