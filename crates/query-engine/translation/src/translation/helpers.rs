//! Helpers for processing a tree query and building SQL.

use std::collections::BTreeMap;

use orql_configuration::{CompilerSettings, UnknownFieldPolicy};
use query_engine_metadata::metadata::{EntityInfo, RelationInfo, SchemaProvider};
use query_engine_sql::sql;

use super::error::Error;

/// Static information from the metadata and the compiler settings.
pub struct Env<'a> {
    provider: &'a dyn SchemaProvider,
    settings: CompilerSettings,
}

/// An entity we are processing: its name and information in the metadata, and the
/// alias it is addressed by in the query. The alias doubles as its selection path.
#[derive(Debug, Clone)]
pub struct EntityAndAlias<'a> {
    pub name: String,
    pub info: &'a EntityInfo,
    pub alias: sql::ast::TableAlias,
}

impl EntityAndAlias<'_> {
    /// The selection path of this entity instance, such as `user_profile`.
    pub fn path(&self) -> &str {
        &self.alias.name
    }

    /// The qualified selection name of one of its properties, such as `user_profile.gender`.
    pub fn qualify(&self, property_name: &str) -> String {
        format!("{}.{}", self.alias.name, property_name)
    }
}

impl<'a> Env<'a> {
    pub fn new(provider: &'a dyn SchemaProvider, settings: CompilerSettings) -> Env<'a> {
        Env { provider, settings }
    }

    /// Lookup an entity's information in the metadata.
    pub fn lookup_entity(&self, name: &str) -> Result<&'a EntityInfo, Error> {
        self.provider
            .entity(name)
            .ok_or_else(|| Error::EntityNotFound(name.to_string()))
    }

    /// The entity a relation points to.
    pub fn relation_target(&self, relation: &RelationInfo) -> Result<&'a EntityInfo, Error> {
        self.provider
            .relation_target(relation)
            .ok_or_else(|| Error::EntityNotFound(relation.target_entity.clone()))
    }

    /// Resolve the entity a query root refers to: the name as written, then the
    /// name with its first letter upper-cased (`user` finds `User`).
    pub fn resolve_root(&self, name: &str) -> Result<(String, &'a EntityInfo), Error> {
        if let Some(info) = self.provider.entity(name) {
            return Ok((name.to_string(), info));
        }
        let mut chars = name.chars();
        let capitalized: String = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
        self.provider
            .entity(&capitalized)
            .map(|info| (capitalized, info))
            .ok_or_else(|| Error::EntityNotFound(name.to_string()))
    }

    pub fn unknown_fields(&self) -> UnknownFieldPolicy {
        self.settings.unknown_fields
    }
}

/// Mutable state for one compilation. A fresh one is made per query.
#[derive(Debug, Default)]
pub struct State<'a> {
    /// Every alias handed out so far, with the entity it addresses. Junction
    /// tables address none.
    aliases: BTreeMap<String, Option<&'a EntityInfo>>,
}

impl<'a> State<'a> {
    pub fn new() -> State<'a> {
        State::default()
    }

    /// Register the alias of an entity instance. Every alias must be unique.
    pub fn make_table_alias(
        &mut self,
        name: String,
        info: &'a EntityInfo,
    ) -> Result<sql::ast::TableAlias, Error> {
        self.register(name, Some(info))
    }

    /// Register the alias of a junction table.
    pub fn make_junction_alias(&mut self, name: String) -> Result<sql::ast::TableAlias, Error> {
        self.register(name, None)
    }

    fn register(
        &mut self,
        name: String,
        info: Option<&'a EntityInfo>,
    ) -> Result<sql::ast::TableAlias, Error> {
        if self.aliases.contains_key(&name) {
            return Err(Error::DuplicateAlias(name));
        }
        self.aliases.insert(name.clone(), info);
        Ok(sql::helpers::make_table_alias(name))
    }

    /// The entity registered under an alias, if any.
    pub fn lookup_alias(&self, name: &str) -> Option<&'a EntityInfo> {
        self.aliases.get(name).copied().flatten()
    }
}
