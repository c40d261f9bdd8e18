//! The fixture schema.

use query_engine_metadata::metadata::Metadata;

const METADATA: &str = include_str!("../fixtures/metadata.json");

/// Metadata for the `User`, `Profile`, `Photo`, `Question` and `Category` entities.
pub fn metadata() -> Metadata {
    serde_json::from_str(METADATA).expect("the fixture metadata must be valid")
}
