//! Translate order by paths to a SQL ORDER BY clause.

use query_engine_sql::sql;

use super::OrderByPath;
use crate::translation::error::Error;
use crate::translation::helpers::State;

/// Convert order by paths such as `user.photos.id` to ORDER BY elements.
///
/// Every segment but the last names the alias (`user_photos`), the last one the
/// column. Paths are not checked against the selection: when the alias and the
/// column are known their physical column name is used, otherwise the path is
/// passed through and left to the database to reject.
pub fn translate_order_by(
    state: &State,
    order_by: &[OrderByPath],
) -> Result<sql::ast::OrderBy, Error> {
    let elements = order_by
        .iter()
        .map(|OrderByPath { path, direction }| {
            let (alias_path, column) = path
                .rsplit_once('.')
                .filter(|(alias_path, column)| !alias_path.is_empty() && !column.is_empty())
                .ok_or_else(|| Error::InvalidOrderBy(path.clone()))?;

            let alias = alias_path.replace('.', "_");
            let column_name = state
                .lookup_alias(&alias)
                .and_then(|info| info.any_column(column))
                .map_or_else(|| column.to_string(), |column_info| column_info.name.clone());

            Ok(sql::ast::OrderByElement {
                target: sql::ast::Expression::ColumnReference(
                    sql::helpers::make_column_reference(
                        sql::helpers::make_table_alias(alias),
                        sql::ast::ColumnName(column_name),
                    ),
                ),
                direction: *direction,
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;

    Ok(sql::ast::OrderBy { elements })
}
