//! Handle stuff related to relationships and joins.

use std::collections::BTreeMap;

use query_engine_metadata::metadata::{EntityInfo, JunctionInfo};
use query_engine_sql::sql;

use super::fields::SelectedRelation;
use crate::translation::error::Error;
use crate::translation::helpers::{EntityAndAlias, Env, State};

/// The joins for a selected relation, and the entity instance they introduce.
pub struct TranslatedJoin<'a> {
    /// One LEFT OUTER JOIN, or two when the relation goes through a junction table.
    pub joins: Vec<sql::ast::Join>,
    pub plan: sql::execution_plan::JoinPlan,
    pub target: EntityAndAlias<'a>,
}

/// Translate a relation selected from `current` into a LEFT OUTER JOIN aliased
/// `<path>_<relation name>`. A relation through a junction table first joins the
/// junction under `<path>_<relation name>_junction`.
pub fn translate_join<'a>(
    env: &Env<'a>,
    state: &mut State<'a>,
    current: &EntityAndAlias<'a>,
    selected: &SelectedRelation<'a, '_>,
) -> Result<TranslatedJoin<'a>, Error> {
    let relation_name = &selected.node.name;
    let target_info = env.relation_target(selected.relation)?;
    let target_path = format!("{}_{}", current.path(), relation_name);

    let mut joins = vec![];
    let (target, on) = match &selected.relation.junction {
        None => {
            let target = make_target(state, selected, target_path, target_info)?;
            let on = translate_column_mapping(current, &target, &selected.relation.column_mapping)?;
            (target, on)
        }
        Some(junction) => {
            let junction_alias = state.make_junction_alias(format!("{target_path}_junction"))?;
            let target = make_target(state, selected, target_path, target_info)?;
            joins.push(left_outer_join(
                sql::helpers::table_reference(
                    junction.schema_name.as_deref(),
                    &junction.table_name,
                ),
                junction_alias.clone(),
                translate_junction_mapping(current, &junction_alias, junction, true)?,
            ));
            let on = translate_junction_mapping(&target, &junction_alias, junction, false)?;
            (target, on)
        }
    };

    tracing::debug!(
        source = %current.qualify(relation_name),
        alias = %target.path(),
        target = %target.name,
        junction = selected.relation.junction.is_some(),
        "join"
    );

    joins.push(left_outer_join(
        sql::helpers::table_reference(target_info.schema_name.as_deref(), &target_info.table_name),
        target.alias.clone(),
        on,
    ));

    Ok(TranslatedJoin {
        joins,
        plan: sql::execution_plan::JoinPlan {
            source: current.qualify(relation_name),
            alias: target.path().to_string(),
            target_entity: target.name.clone(),
            relation_type: selected.relation.relation_type,
        },
        target,
    })
}

fn make_target<'a>(
    state: &mut State<'a>,
    selected: &SelectedRelation<'a, '_>,
    path: String,
    info: &'a EntityInfo,
) -> Result<EntityAndAlias<'a>, Error> {
    Ok(EntityAndAlias {
        name: selected.relation.target_entity.clone(),
        info,
        alias: state.make_table_alias(path, info)?,
    })
}

fn left_outer_join(
    table: sql::ast::TableReference,
    alias: sql::ast::TableAlias,
    on: sql::ast::Expression,
) -> sql::ast::Join {
    sql::ast::Join::LeftOuterJoin(sql::ast::LeftOuterJoin { table, alias, on })
}

/// Given a relation, turn its column mapping into the condition of the join.
fn translate_column_mapping(
    source: &EntityAndAlias,
    target: &EntityAndAlias,
    column_mapping: &BTreeMap<String, String>,
) -> Result<sql::ast::Expression, Error> {
    column_mapping.iter().try_fold(
        sql::helpers::true_expr(),
        |expression, (source_column, target_column)| {
            Ok(sql::helpers::and(
                expression,
                equals(
                    column_reference(source, source_column)?,
                    column_reference(target, target_column)?,
                ),
            ))
        },
    )
}

/// The condition joining an entity instance to a junction table: the source
/// mapping for the side the relation starts from, the target mapping otherwise.
/// Entity columns are always written first.
fn translate_junction_mapping(
    entity: &EntityAndAlias,
    junction_alias: &sql::ast::TableAlias,
    junction: &JunctionInfo,
    is_source: bool,
) -> Result<sql::ast::Expression, Error> {
    let pairs: Vec<(&String, &String)> = if is_source {
        junction.source_mapping.iter().collect()
    } else {
        junction
            .target_mapping
            .iter()
            .map(|(junction_column, property_name)| (property_name, junction_column))
            .collect()
    };

    pairs.into_iter().try_fold(
        sql::helpers::true_expr(),
        |expression, (property_name, junction_column)| {
            let junction_reference = sql::ast::Expression::ColumnReference(
                sql::helpers::make_column_reference(
                    junction_alias.clone(),
                    sql::ast::ColumnName(junction_column.clone()),
                ),
            );
            Ok(sql::helpers::and(
                expression,
                equals(column_reference(entity, property_name)?, junction_reference),
            ))
        },
    )
}

fn equals(left: sql::ast::Expression, right: sql::ast::Expression) -> sql::ast::Expression {
    sql::ast::Expression::BinaryOperation {
        left: Box::new(left),
        operator: sql::ast::BinaryOperator::Equals,
        right: Box::new(right),
    }
}

fn column_reference(
    entity: &EntityAndAlias,
    property_name: &str,
) -> Result<sql::ast::Expression, Error> {
    let column_info =
        entity
            .info
            .any_column(property_name)
            .ok_or_else(|| Error::ColumnNotFoundInEntity {
                entity: entity.name.clone(),
                column: property_name.to_string(),
            })?;
    Ok(sql::ast::Expression::ColumnReference(
        sql::helpers::make_column_reference(
            entity.alias.clone(),
            sql::ast::ColumnName(column_info.name.clone()),
        ),
    ))
}
