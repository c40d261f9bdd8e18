//! Translate a parsed tree query into an execution plan.

pub mod fields;
pub mod filtering;
pub mod relationships;
pub mod sorting;
pub mod values;

use std::collections::{BTreeMap, VecDeque};

use query_engine_orql::orql::ast;
use query_engine_sql::sql;

use crate::translation::error::Error;
use crate::translation::helpers::{EntityAndAlias, Env, State};

/// An order by directive: a dotted path and a direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderByPath {
    pub path: String,
    pub direction: sql::ast::OrderByDirection,
}

/// The directives a caller sets next to the query text. They are passed through
/// to the plan as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    pub order_by: Vec<OrderByPath>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// A node waiting to be expanded, with the entity instance it selects from.
struct PendingNode<'a, 'n> {
    node: &'n ast::FieldNode,
    current: EntityAndAlias<'a>,
}

/// Translate a parsed tree query into an ExecutionPlan (SQL) to be run against the database.
///
/// Nodes are expanded breadth-first from a FIFO queue: the root's columns come
/// first, then each relation's columns, level by level, in the order written.
/// A query whose nodes select no column at all is rejected.
pub fn translate(
    env: &Env,
    root: &ast::FieldNode,
    options: &QueryOptions,
) -> Result<sql::execution_plan::ExecutionPlan, Error> {
    let mut state = State::new();

    let (root_entity, root_info) = env.resolve_root(&root.name)?;
    let root_alias = state.make_table_alias(root.name.clone(), root_info)?;
    let from = sql::ast::From::Table {
        reference: sql::helpers::table_reference(
            root_info.schema_name.as_deref(),
            &root_info.table_name,
        ),
        alias: root_alias.clone(),
    };

    let mut worklist = VecDeque::from([PendingNode {
        node: root,
        current: EntityAndAlias {
            name: root_entity.clone(),
            info: root_info,
            alias: root_alias,
        },
    }]);

    let mut selection = vec![];
    let mut column_types = BTreeMap::new();
    let mut select_list = vec![];
    let mut joins = vec![];
    let mut join_plans = vec![];
    let mut predicate = sql::helpers::true_expr();

    while let Some(PendingNode { node, current }) = worklist.pop_front() {
        tracing::debug!(path = %current.path(), entity = %current.name, "translating node");

        if let Some(filter) = &node.filter {
            predicate = sql::helpers::and(
                predicate,
                filtering::translate_expression(&current, filter)?,
            );
        }

        let translated = fields::translate_fields(env, &current, &node.children)?;

        for column in translated.columns {
            column_types.insert(column.qualified_name.clone(), column.scalar_type);
            selection.push(column.qualified_name);
            select_list.push(column.column);
        }

        for relation in &translated.relations {
            let join = relationships::translate_join(env, &mut state, &current, relation)?;
            joins.extend(join.joins);
            join_plans.push(join.plan);
            worklist.push_back(PendingNode {
                node: relation.node,
                current: join.target,
            });
        }
    }

    if select_list.is_empty() {
        return Err(Error::EmptySelection {
            entity: root_entity,
        });
    }

    let mut query = sql::helpers::simple_select(select_list);
    query.from = Some(from);
    query.joins = joins;
    query.where_ = sql::ast::Where(predicate);
    query.order_by = sorting::translate_order_by(&state, &options.order_by)?;
    query.limit = sql::ast::Limit {
        limit: options.limit,
        offset: options.offset,
    };

    Ok(sql::execution_plan::ExecutionPlan {
        root_entity,
        selection,
        column_types,
        joins: join_plans,
        query,
    })
}
