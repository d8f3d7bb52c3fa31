//! Loosely-typed records returned by the remote list service.
//!
//! The remote API hands back open-ended field sets. Instead of reflecting over
//! an untyped map everywhere, they are wrapped in [`Record`]: an ordered
//! key/value structure whose serialization order is the order keys were
//! received in (serde_json is built with `preserve_order`).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Metadata keys injected by the remote service start with this prefix.
const METADATA_PREFIX: &str = "__";

/// One list item as returned by the remote service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(pub Map<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copy of this record without `__`-prefixed metadata keys.
    pub fn cleaned(&self) -> Record {
        let fields = self
            .0
            .iter()
            .filter(|(k, _)| !k.starts_with(METADATA_PREFIX))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Record(fields)
    }

    /// Best-effort extraction of the item identifier.
    ///
    /// The service is inconsistent about casing, so `ID`, `Id` and `id` are
    /// all accepted; integral floats are truncated.
    pub fn extract_id(&self) -> Option<i64> {
        for key in ["ID", "Id", "id"] {
            match self.0.get(key) {
                Some(Value::Number(n)) => {
                    if let Some(id) = n.as_i64() {
                        return Some(id);
                    }
                    if let Some(f) = n.as_f64() {
                        return Some(f as i64);
                    }
                }
                _ => continue,
            }
        }
        None
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Record(fields)
    }
}

/// Apply output cleaning to a batch of records when the flag is set.
pub fn maybe_clean(records: Vec<Record>, clean: bool) -> Vec<Record> {
    if !clean {
        return records;
    }
    records.iter().map(Record::cleaned).collect()
}

/// Apply output cleaning to a single record when the flag is set.
pub fn maybe_clean_one(record: Record, clean: bool) -> Record {
    if !clean {
        return record;
    }
    record.cleaned()
}
