//! Fold the flat rows of a joined query back into nested entities.
//!
//! Every row of a joined query carries one root entity instance together with one
//! instance of each joined relation. Hydration walks the joins of the plan as a
//! tree and merges the rows: a to-one relation becomes an object (or `null`), a
//! to-many relation becomes an array of distinct instances.
//!
//! Instances are told apart by the values of their selected columns. When a plan
//! has a to-many join, root instances are merged the same way, so the selection
//! should include a unique column (such as `id`) to keep equal-looking entities
//! apart. Without a to-many join every row is its own root instance.

use indexmap::IndexMap;
use serde_json::Value;

use query_engine_sql::sql::execution_plan::ExecutionPlan;

use crate::query::RowMap;

/// An entity instance of the query, such as `user_photos`.
struct TreeNode {
    /// The property this node is found under in its parent.
    property: String,
    to_many: bool,
    /// Property name and qualified selection name of every selected column.
    columns: Vec<(String, String)>,
    children: Vec<usize>,
}

/// One hydrated entity.
struct Instance {
    fields: serde_json::Map<String, Value>,
    /// One slot per child node, in the order of `TreeNode::children`.
    slots: Vec<Slot>,
}

enum Slot {
    One(Option<Box<Instance>>),
    Many(IndexMap<String, Instance>),
}

/// Turn the rows of `plan` into one JSON object per root entity, in the order
/// they are first seen. Properties are named without their alias prefix.
pub fn hydrate(plan: &ExecutionPlan, rows: &[RowMap]) -> Vec<Value> {
    let Some(root_alias) = plan.root_alias() else {
        return rows.iter().cloned().map(Value::Object).collect();
    };
    let tree = build_tree(plan, root_alias);
    let merge_roots = plan.has_to_many_joins();

    let mut roots: IndexMap<String, Instance> = IndexMap::new();
    for (index, row) in rows.iter().enumerate() {
        let key = if merge_roots {
            instance_key(&tree[0], row, index)
        } else {
            index.to_string()
        };
        let instance = roots
            .entry(key)
            .or_insert_with(|| new_instance(&tree, 0, row));
        merge(&tree, 0, row, index, instance);
    }

    roots
        .into_values()
        .map(|instance| into_json(&tree, 0, instance))
        .collect()
}

/// Nodes by index, the root first. Joins are listed parents before children, so a
/// parent is always known when its relation is reached.
fn build_tree(plan: &ExecutionPlan, root_alias: &str) -> Vec<TreeNode> {
    let mut tree = vec![TreeNode {
        property: root_alias.to_string(),
        to_many: false,
        columns: vec![],
        children: vec![],
    }];
    let mut by_alias: IndexMap<&str, usize> = IndexMap::from([(root_alias, 0)]);

    for join in &plan.joins {
        let Some((parent_alias, property)) = join.source.rsplit_once('.') else {
            continue;
        };
        let Some(&parent) = by_alias.get(parent_alias) else {
            tracing::warn!(source = %join.source, "join without a parent in the plan");
            continue;
        };
        let index = tree.len();
        tree.push(TreeNode {
            property: property.to_string(),
            to_many: join.relation_type.is_to_many(),
            columns: vec![],
            children: vec![],
        });
        tree[parent].children.push(index);
        by_alias.insert(join.alias.as_str(), index);
    }

    for qualified_name in &plan.selection {
        if let Some((alias, property)) = qualified_name.split_once('.') {
            if let Some(&index) = by_alias.get(alias) {
                tree[index]
                    .columns
                    .push((property.to_string(), qualified_name.clone()));
            }
        }
    }

    tree
}

fn new_instance(tree: &[TreeNode], node: usize, row: &RowMap) -> Instance {
    let fields = tree[node]
        .columns
        .iter()
        .map(|(property, qualified_name)| {
            (
                property.clone(),
                row.get(qualified_name).cloned().unwrap_or(Value::Null),
            )
        })
        .collect();
    let slots = tree[node]
        .children
        .iter()
        .map(|&child| {
            if tree[child].to_many {
                Slot::Many(IndexMap::new())
            } else {
                Slot::One(None)
            }
        })
        .collect();
    Instance { fields, slots }
}

/// Add the relations found in `row` to an instance of `node`.
fn merge(tree: &[TreeNode], node: usize, row: &RowMap, index: usize, instance: &mut Instance) {
    for (&child, slot) in tree[node].children.iter().zip(instance.slots.iter_mut()) {
        if is_absent(tree, child, row) {
            continue;
        }
        let target = match slot {
            Slot::One(existing) => {
                &mut **existing.get_or_insert_with(|| Box::new(new_instance(tree, child, row)))
            }
            Slot::Many(instances) => instances
                .entry(instance_key(&tree[child], row, index))
                .or_insert_with(|| new_instance(tree, child, row)),
        };
        merge(tree, child, row, index, target);
    }
}

/// A relation without a match in this row: every column selected in its subtree
/// is null.
fn is_absent(tree: &[TreeNode], node: usize, row: &RowMap) -> bool {
    tree[node]
        .columns
        .iter()
        .all(|(_, qualified_name)| row.get(qualified_name).unwrap_or(&Value::Null).is_null())
        && tree[node]
            .children
            .iter()
            .all(|&child| is_absent(tree, child, row))
}

/// Instances with the same selected values are the same instance. A node selecting
/// no column cannot be compared, so each row makes a new one.
fn instance_key(node: &TreeNode, row: &RowMap, index: usize) -> String {
    if node.columns.is_empty() {
        return format!("#{index}");
    }
    let values: Vec<&Value> = node
        .columns
        .iter()
        .map(|(_, qualified_name)| row.get(qualified_name).unwrap_or(&Value::Null))
        .collect();
    serde_json::to_string(&values).unwrap_or_default()
}

fn into_json(tree: &[TreeNode], node: usize, instance: Instance) -> Value {
    let mut object = instance.fields;
    for (&child, slot) in tree[node].children.iter().zip(instance.slots) {
        let value = match slot {
            Slot::One(None) => Value::Null,
            Slot::One(Some(related)) => into_json(tree, child, *related),
            Slot::Many(related) => Value::Array(
                related
                    .into_values()
                    .map(|related| into_json(tree, child, related))
                    .collect(),
            ),
        };
        object.insert(tree[child].property.clone(), value);
    }
    Value::Object(object)
}
