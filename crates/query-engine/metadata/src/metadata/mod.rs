//! Metadata information regarding the entities a query can address.

pub mod database;
pub mod provider;

// re-export without modules
pub use database::*;
pub use provider::*;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Metadata information.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct Metadata {
    pub entities: EntitiesInfo,
}

impl Metadata {
    pub fn empty() -> Self {
        Metadata {
            entities: EntitiesInfo::empty(),
        }
    }
}
