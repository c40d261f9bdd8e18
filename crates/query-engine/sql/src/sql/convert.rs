//! Convert a SQL AST to a low-level SQL string.

use super::ast::*;
use super::helpers;
use super::string::*;

// Convert to SQL strings

impl SelectList {
    pub fn to_sql(&self, sql: &mut SQL) {
        let SelectList(select_list) = self;
        for (index, (col, expr)) in select_list.iter().enumerate() {
            expr.to_sql(sql);
            sql.append_syntax(" AS ");
            col.to_sql(sql);
            if index < (select_list.len() - 1) {
                sql.append_syntax(", ");
            }
        }
    }
}

impl Select {
    pub fn to_sql(&self, sql: &mut SQL) {
        sql.append_syntax("SELECT ");

        self.select_list.to_sql(sql);

        if let Some(from) = &self.from {
            sql.append_syntax(" ");
            from.to_sql(sql);
        }

        for join in &self.joins {
            join.to_sql(sql);
        }

        self.where_.to_sql(sql);

        self.order_by.to_sql(sql);

        self.limit.to_sql(sql);
    }
}

impl From {
    pub fn to_sql(&self, sql: &mut SQL) {
        sql.append_syntax("FROM ");
        match &self {
            From::Table { reference, alias } => {
                reference.to_sql(sql);
                sql.append_syntax(" AS ");
                alias.to_sql(sql);
            }
        }
    }
}

impl Join {
    pub fn to_sql(&self, sql: &mut SQL) {
        match self {
            Join::LeftOuterJoin(join) => {
                sql.append_syntax(" LEFT OUTER JOIN ");
                join.table.to_sql(sql);
                sql.append_syntax(" AS ");
                join.alias.to_sql(sql);
                sql.append_syntax(" ON ");
                join.on.to_sql(sql);
            }
        }
    }
}

impl Where {
    pub fn to_sql(&self, sql: &mut SQL) {
        let Where(expression) = self;
        if *expression != helpers::true_expr() {
            sql.append_syntax(" WHERE ");
            expression.to_sql(sql);
        }
    }
}

impl OrderBy {
    pub fn to_sql(&self, sql: &mut SQL) {
        if !self.elements.is_empty() {
            sql.append_syntax(" ORDER BY ");
            for (index, element) in self.elements.iter().enumerate() {
                element.to_sql(sql);
                if index < (self.elements.len() - 1) {
                    sql.append_syntax(", ");
                }
            }
        }
    }
}

impl OrderByElement {
    pub fn to_sql(&self, sql: &mut SQL) {
        self.target.to_sql(sql);
        self.direction.to_sql(sql);
    }
}

impl OrderByDirection {
    pub fn to_sql(self, sql: &mut SQL) {
        match self {
            OrderByDirection::Asc => sql.append_syntax(" ASC"),
            OrderByDirection::Desc => sql.append_syntax(" DESC"),
        }
    }
}

// scalars
impl Expression {
    pub fn to_sql(&self, sql: &mut SQL) {
        match &self {
            Expression::ColumnReference(column_reference) => column_reference.to_sql(sql),
            Expression::Value(value) => value.to_sql(sql),
            Expression::And { left, right } => {
                sql.append_syntax("(");
                left.to_sql(sql);
                sql.append_syntax(" AND ");
                right.to_sql(sql);
                sql.append_syntax(")");
            }
            Expression::Or { left, right } => {
                sql.append_syntax("(");
                left.to_sql(sql);
                sql.append_syntax(" OR ");
                right.to_sql(sql);
                sql.append_syntax(")");
            }
            Expression::Not(expr) => {
                sql.append_syntax("NOT (");
                expr.to_sql(sql);
                sql.append_syntax(")");
            }
            Expression::BinaryOperation {
                left,
                operator,
                right,
            } => {
                sql.append_syntax("(");
                left.to_sql(sql);
                operator.to_sql(sql);
                right.to_sql(sql);
                sql.append_syntax(")");
            }
            Expression::CountStar => sql.append_syntax("COUNT(*)"),
        }
    }
}

impl BinaryOperator {
    pub fn to_sql(self, sql: &mut SQL) {
        match self {
            BinaryOperator::Equals => sql.append_syntax(" = "),
            BinaryOperator::NotEquals => sql.append_syntax(" != "),
            BinaryOperator::GreaterThan => sql.append_syntax(" > "),
            BinaryOperator::GreaterThanOrEqualTo => sql.append_syntax(" >= "),
            BinaryOperator::LessThan => sql.append_syntax(" < "),
            BinaryOperator::LessThanOrEqualTo => sql.append_syntax(" <= "),
            BinaryOperator::Like => sql.append_syntax(" LIKE "),
        }
    }
}

impl Value {
    /// Every value is sent as a parameter, never spliced into the SQL text.
    pub fn to_sql(&self, sql: &mut SQL) {
        match &self {
            Value::Null => sql.append_param(Param::Value(serde_json::Value::Null)),
            Value::Bool(b) => sql.append_param(Param::Value(serde_json::Value::Bool(*b))),
            Value::Int8(i) => sql.append_param(Param::Value(serde_json::json!(i))),
            Value::Float8(f) => sql.append_param(Param::Value(serde_json::json!(f))),
            Value::String(s) => sql.append_param(Param::Value(serde_json::Value::String(s.clone()))),
            Value::Variable(v) => sql.append_param(Param::Variable(v.clone())),
        }
    }
}

impl Limit {
    pub fn to_sql(&self, sql: &mut SQL) {
        if let Some(limit) = self.limit {
            sql.append_syntax(" LIMIT ");
            sql.append_syntax(format!("{limit}").as_str());
        }
        if let Some(offset) = self.offset {
            sql.append_syntax(" OFFSET ");
            sql.append_syntax(format!("{offset}").as_str());
        }
    }
}

// names
impl TableReference {
    pub fn to_sql(&self, sql: &mut SQL) {
        if let Some(SchemaName(schema)) = &self.schema {
            sql.append_identifier(schema);
            sql.append_syntax(".");
        }
        let TableName(table) = &self.table;
        sql.append_identifier(table);
    }
}

impl TableAlias {
    pub fn to_sql(&self, sql: &mut SQL) {
        sql.append_identifier(&self.name);
    }
}

impl ColumnReference {
    pub fn to_sql(&self, sql: &mut SQL) {
        self.table.to_sql(sql);
        sql.append_syntax(".");
        let ColumnName(name) = &self.name;
        sql.append_identifier(name);
    }
}

impl ColumnAlias {
    pub fn to_sql(&self, sql: &mut SQL) {
        sql.append_identifier(&self.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(table: &str, name: &str) -> Expression {
        Expression::ColumnReference(helpers::make_column_reference(
            helpers::make_table_alias(table.to_string()),
            ColumnName(name.to_string()),
        ))
    }

    #[test]
    fn test_select_with_join_where_order_and_limit() {
        let user = helpers::make_table_alias("user".to_string());
        let profile = helpers::make_table_alias("user_profile".to_string());

        let mut select = helpers::simple_select(vec![
            (
                helpers::make_column_alias("user.id".to_string()),
                column("user", "id"),
            ),
            (
                helpers::make_column_alias("user_profile.gender".to_string()),
                column("user_profile", "gender"),
            ),
        ]);
        select.from = Some(From::Table {
            reference: helpers::table_reference(None, "user"),
            alias: user,
        });
        select.joins.push(Join::LeftOuterJoin(LeftOuterJoin {
            table: helpers::table_reference(Some("public"), "profile"),
            alias: profile,
            on: Expression::BinaryOperation {
                left: Box::new(column("user", "profile_id")),
                operator: BinaryOperator::Equals,
                right: Box::new(column("user_profile", "id")),
            },
        }));
        select.where_ = Where(Expression::Or {
            left: Box::new(Expression::BinaryOperation {
                left: Box::new(column("user", "id")),
                operator: BinaryOperator::Equals,
                right: Box::new(Expression::Value(Value::Variable("id".to_string()))),
            }),
            right: Box::new(Expression::Not(Box::new(Expression::BinaryOperation {
                left: Box::new(column("user_profile", "gender")),
                operator: BinaryOperator::Like,
                right: Box::new(Expression::Value(Value::String("f%".to_string()))),
            }))),
        });
        select.order_by.elements.push(OrderByElement {
            target: column("user", "id"),
            direction: OrderByDirection::Desc,
        });
        select.limit = Limit {
            limit: Some(10),
            offset: Some(20),
        };

        let mut sql = SQL::new();
        select.to_sql(&mut sql);

        insta::assert_snapshot!(sql.sql, @r###"SELECT "user"."id" AS "user.id", "user_profile"."gender" AS "user_profile.gender" FROM "user" AS "user" LEFT OUTER JOIN "public"."profile" AS "user_profile" ON ("user"."profile_id" = "user_profile"."id") WHERE (("user"."id" = $1) OR NOT (("user_profile"."gender" LIKE $2))) ORDER BY "user"."id" DESC LIMIT 10 OFFSET 20"###);
        assert_eq!(
            sql.params,
            vec![
                Param::Variable("id".to_string()),
                Param::Value(serde_json::json!("f%")),
            ]
        );
    }

    #[test]
    fn test_true_where_is_omitted() {
        let mut select = helpers::simple_select(vec![(
            helpers::make_column_alias("count".to_string()),
            Expression::CountStar,
        )]);
        select.from = Some(From::Table {
            reference: helpers::table_reference(None, "user"),
            alias: helpers::make_table_alias("user".to_string()),
        });

        let mut sql = SQL::new();
        select.to_sql(&mut sql);

        insta::assert_snapshot!(sql.sql, @r###"SELECT COUNT(*) AS "count" FROM "user" AS "user""###);
        assert!(sql.params.is_empty());
    }

    #[test]
    fn test_literals_are_bound() {
        let values = vec![
            Value::Null,
            Value::Bool(true),
            Value::Int8(-1),
            Value::Float8(1.5),
        ];
        let mut sql = SQL::new();
        for value in &values {
            value.to_sql(&mut sql);
        }
        assert_eq!(sql.sql, "$1$2$3$4");
        assert_eq!(
            sql.params,
            vec![
                Param::Value(serde_json::Value::Null),
                Param::Value(serde_json::json!(true)),
                Param::Value(serde_json::json!(-1)),
                Param::Value(serde_json::json!(1.5)),
            ]
        );
    }
}
