//! Shared helpers

use catalogdb::{Catalogdb, Database, Value};
use catalogdb_core::SequentialIdGenerator;

/// Ephemeral database with predictable identifiers
pub fn seq_db() -> Catalogdb {
    Catalogdb::from_database(
        Database::builder()
            .id_generator(SequentialIdGenerator::default())
            .ephemeral(),
    )
}

/// `_id` of a record value
pub fn id_of(record: &Value) -> String {
    record
        .as_object()
        .and_then(|o| o.get("_id"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// `_id`s of a catalog in stored order
pub fn ids(db: &Catalogdb, catalog: &str) -> Vec<String> {
    db.get_catalog(catalog)
        .unwrap()
        .unwrap_or_default()
        .iter()
        .map(id_of)
        .collect()
}
