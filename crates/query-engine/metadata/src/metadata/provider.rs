//! Lookup of entity metadata by name.

use super::database::{EntityInfo, RelationInfo};
use super::Metadata;

/// Supplies entity metadata to the plan compiler. Implementations must be
/// deterministic and must not change while a query is compiled.
pub trait SchemaProvider: Send + Sync {
    /// Lookup an entity by its exact name.
    fn entity(&self, name: &str) -> Option<&EntityInfo>;

    /// The entity a relation points to.
    fn relation_target(&self, relation: &RelationInfo) -> Option<&EntityInfo> {
        self.entity(&relation.target_entity)
    }
}

impl SchemaProvider for Metadata {
    fn entity(&self, name: &str) -> Option<&EntityInfo> {
        self.entities.0.get(name)
    }
}

impl<T: SchemaProvider + ?Sized> SchemaProvider for std::sync::Arc<T> {
    fn entity(&self, name: &str) -> Option<&EntityInfo> {
        (**self).entity(name)
    }
}
