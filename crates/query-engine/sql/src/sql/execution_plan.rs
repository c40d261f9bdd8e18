//! Definition of an execution plan to be run against the database.

use std::collections::BTreeMap;

use query_engine_metadata::metadata::{RelationType, ScalarType};

use super::ast;
use super::helpers;
use super::string;

/// A join generated for a relation in the selection tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinPlan {
    /// The qualified relation the join was generated for, such as `user.profile`.
    pub source: String,
    /// The generated alias, such as `user_profile`.
    pub alias: String,
    /// The entity the relation points to.
    pub target_entity: String,
    /// Whether a source entity has at most one or possibly several targets.
    pub relation_type: RelationType,
}

/// The compiled form of a tree query.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionPlan {
    /// The entity the root of the query resolved to.
    pub root_entity: String,
    /// Qualified selection names, in output order. These are also the column
    /// aliases of the query.
    pub selection: Vec<String>,
    /// The scalar type of every selected column, by qualified selection name.
    pub column_types: BTreeMap<String, ScalarType>,
    /// The joins of every selected relation, parents before children. Junction
    /// tables have no entry of their own.
    pub joins: Vec<JoinPlan>,
    /// The query.
    pub query: ast::Select,
}

impl ExecutionPlan {
    /// The alias of the root entity, which is also its selection path.
    pub fn root_alias(&self) -> Option<&str> {
        match &self.query.from {
            Some(ast::From::Table { alias, .. }) => Some(alias.name.as_str()),
            None => None,
        }
    }

    /// Whether a root entity may span several rows of the result.
    pub fn has_to_many_joins(&self) -> bool {
        self.joins
            .iter()
            .any(|join| join.relation_type.is_to_many())
    }

    /// The compiled filter predicate. `true` when there is no filter.
    pub fn predicate(&self) -> &ast::Expression {
        &self.query.where_.0
    }

    /// Extract the query component as SQL.
    pub fn query_sql(&self) -> string::SQL {
        select_to_sql(&self.query)
    }

    /// The same joins and predicate, counting rows instead of selecting them.
    pub fn count_query(&self) -> ast::Select {
        ast::Select {
            select_list: ast::SelectList(vec![(
                helpers::make_column_alias("count".to_string()),
                ast::Expression::CountStar,
            )]),
            order_by: helpers::empty_order_by(),
            limit: helpers::empty_limit(),
            ..self.query.clone()
        }
    }

    pub fn count_sql(&self) -> string::SQL {
        select_to_sql(&self.count_query())
    }
}

pub fn select_to_sql(select: &ast::Select) -> string::SQL {
    let mut sql = string::SQL::new();
    select.to_sql(&mut sql);
    sql
}
