//! Metadata information regarding the database and tracked information.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The scalar types a column may have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    Boolean,
    Integer,
    Bigint,
    Real,
    #[serde(rename = "double precision")]
    DoublePrecision,
    Numeric,
    Text,
    #[serde(rename = "character varying")]
    CharacterVarying,
    Date,
    Timestamp,
    Uuid,
    Json,
    Any,
}

impl std::fmt::Display for ScalarType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ScalarType::DoublePrecision => write!(f, "double precision"),
            ScalarType::CharacterVarying => write!(f, "character varying"),
            _ => write!(f, "{}", format!("{self:?}").to_lowercase()),
        }
    }
}

/// Mapping from an entity name to its information.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct EntitiesInfo(pub BTreeMap<String, EntityInfo>);

impl EntitiesInfo {
    pub fn empty() -> Self {
        EntitiesInfo(BTreeMap::new())
    }
}

/// Information about an entity and the table that stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntityInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,
    pub table_name: String,
    /// Columns by property name, in declaration order. Wildcards expand in this order.
    pub columns: IndexMap<String, ColumnInfo>,
    /// Relations by property name.
    #[serde(default)]
    pub relations: IndexMap<String, RelationInfo>,
}

impl EntityInfo {
    /// Lookup a selectable column by property name. Join columns are not selectable.
    pub fn column(&self, property_name: &str) -> Option<&ColumnInfo> {
        self.columns
            .get(property_name)
            .filter(|column| !column.is_relation)
    }

    /// Lookup a column by property name, including join columns.
    pub fn any_column(&self, property_name: &str) -> Option<&ColumnInfo> {
        self.columns.get(property_name)
    }

    pub fn relation(&self, property_name: &str) -> Option<&RelationInfo> {
        self.relations.get(property_name)
    }

    /// Selectable columns in declaration order.
    pub fn selectable_columns(&self) -> impl Iterator<Item = (&String, &ColumnInfo)> {
        self.columns
            .iter()
            .filter(|(_, column)| !column.is_relation)
    }
}

/// Can this column contain null values
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub enum Nullable {
    #[default]
    Nullable,
    NonNullable,
}

/// Information about a database column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ColumnInfo {
    /// The column name in the database.
    pub name: String,
    pub r#type: ScalarType,
    #[serde(default)]
    pub nullable: Nullable,
    /// Foreign key columns backing a relation (such as `profileId`). They are never
    /// selected by name or by a wildcard.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_relation: bool,
}

/// The cardinality of a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum RelationType {
    OneToOne,
    ManyToOne,
    OneToMany,
    ManyToMany,
}

impl RelationType {
    /// Whether an entity may have several related entities through this relation.
    pub fn is_to_many(self) -> bool {
        matches!(self, RelationType::OneToMany | RelationType::ManyToMany)
    }
}

/// A relation from one entity to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RelationInfo {
    pub target_entity: String,
    pub relation_type: RelationType,
    /// Source property name to target property name. Every pair becomes an
    /// equality in the join condition. Unused when the relation has a junction.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub column_mapping: BTreeMap<String, String>,
    /// The join table of a relation that goes through one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub junction: Option<JunctionInfo>,
}

/// A join table linking two entities, such as `question_categories_category`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct JunctionInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,
    pub table_name: String,
    /// Source property name to junction column name.
    pub source_mapping: BTreeMap<String, String>,
    /// Junction column name to target property name.
    pub target_mapping: BTreeMap<String, String>,
}
