//! Handle the selection list of a single node.

use indexmap::IndexMap;

use orql_configuration::UnknownFieldPolicy;
use query_engine_metadata::metadata::{ColumnInfo, RelationInfo, ScalarType};
use query_engine_orql::orql::ast;
use query_engine_sql::sql;

use crate::translation::error::Error;
use crate::translation::helpers::{EntityAndAlias, Env};

/// A selected column: its qualified name, its type and its SQL select list entry.
pub struct SelectedColumn {
    pub qualified_name: String,
    pub scalar_type: ScalarType,
    pub column: (sql::ast::ColumnAlias, sql::ast::Expression),
}

/// A relation selected by a node, to be joined and expanded later.
pub struct SelectedRelation<'a, 'n> {
    pub node: &'n ast::FieldNode,
    pub relation: &'a RelationInfo,
}

/// The result of translating the children of one node.
pub struct TranslatedFields<'a, 'n> {
    pub columns: Vec<SelectedColumn>,
    pub relations: Vec<SelectedRelation<'a, 'n>>,
}

/// Translate the children of a node of entity instance `current`.
///
/// Columns named explicitly come first, in the order written. A wildcard then adds
/// every other selectable column not excluded with `!name`, in declaration order.
/// A node without a block selects like `{*}`. Relations are returned in the order
/// written, for the caller to join.
pub fn translate_fields<'a, 'n>(
    env: &Env<'a>,
    current: &EntityAndAlias<'a>,
    children: &'n [ast::QueryNode],
) -> Result<TranslatedFields<'a, 'n>, Error> {
    let mut selected: IndexMap<String, &'a ColumnInfo> = IndexMap::new();
    let mut excluded: Vec<&'n str> = vec![];
    let mut wildcard = children.is_empty();
    let mut relations = vec![];

    for child in children {
        match child {
            ast::QueryNode::All => wildcard = true,
            ast::QueryNode::Ignore(name) => excluded.push(name),
            ast::QueryNode::Field(field) => {
                if let Some(column_info) = current.info.column(&field.name) {
                    if field.filter.is_some() || !field.children.is_empty() {
                        return Err(Error::NestedSelectionOnColumn {
                            path: current.path().to_string(),
                            field: field.name.clone(),
                        });
                    }
                    selected.insert(field.name.clone(), column_info);
                } else if let Some(relation) = current.info.relation(&field.name) {
                    relations.push(SelectedRelation {
                        node: field,
                        relation,
                    });
                } else {
                    match env.unknown_fields() {
                        UnknownFieldPolicy::Reject => {
                            return Err(Error::UnknownField {
                                entity: current.name.clone(),
                                path: current.path().to_string(),
                                field: field.name.clone(),
                            })
                        }
                        UnknownFieldPolicy::Ignore => {
                            tracing::warn!(
                                entity = %current.name,
                                field = %current.qualify(&field.name),
                                "ignoring unknown field"
                            );
                        }
                    }
                }
            }
        }
    }

    if wildcard {
        for (property_name, column_info) in current.info.selectable_columns() {
            if !excluded.contains(&property_name.as_str()) {
                selected
                    .entry(property_name.clone())
                    .or_insert(column_info);
            }
        }
    }

    let columns = selected
        .into_iter()
        .map(|(property_name, column_info)| {
            let qualified_name = current.qualify(&property_name);
            SelectedColumn {
                scalar_type: column_info.r#type,
                column: sql::helpers::make_column(
                    current.alias.clone(),
                    sql::ast::ColumnName(column_info.name.clone()),
                    sql::helpers::make_column_alias(qualified_name.clone()),
                ),
                qualified_name,
            }
        })
        .collect();

    Ok(TranslatedFields { columns, relations })
}
