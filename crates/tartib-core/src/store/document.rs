use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use super::error::StoreError;

/// Field map of a stored document.
pub type Fields = Map<String, Value>;

/// Name of the sibling-order field shared by every orderable collection.
pub const ORDER_FIELD: &str = "order";

/// Server-stamped creation timestamp field.
pub const CREATED_AT_FIELD: &str = "createdAt";

/// Server-stamped last-mutation timestamp field.
pub const UPDATED_AT_FIELD: &str = "updatedAt";

/// A document read from a [`DocumentStore`](super::DocumentStore).
///
/// The store assigns the id and stamps `createdAt`/`updatedAt`; internal
/// bookkeeping (version counters, backend record ids) is stripped before a
/// document reaches callers.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    /// The document's sibling order, 0 when the field is missing.
    pub fn order(&self) -> i64 {
        self.fields
            .get(ORDER_FIELD)
            .and_then(Value::as_i64)
            .unwrap_or(0)
    }

    /// Deserializes the document into an entity type, injecting the
    /// store-assigned id as the `id` field.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        let mut fields = self.fields.clone();
        fields.insert("id".to_string(), Value::String(self.id.clone()));
        Ok(serde_json::from_value(Value::Object(fields))?)
    }

    /// Serializes an entity or draft into a field map, dropping any `id`
    /// field (ids are store-assigned, never caller-supplied).
    pub fn encode<T: Serialize>(value: &T) -> Result<Fields, StoreError> {
        match serde_json::to_value(value)? {
            Value::Object(mut map) => {
                map.remove("id");
                Ok(map)
            }
            other => Err(StoreError::Backend(format!(
                "expected an object, got {other}"
            ))),
        }
    }
}

/// Merges a patch into a field map and refreshes `updatedAt`.
pub(crate) fn apply_patch(fields: &mut Fields, patch: &Fields) {
    for (key, value) in patch {
        fields.insert(key.clone(), value.clone());
    }
    fields.insert(UPDATED_AT_FIELD.to_string(), now_value());
}

/// Stamps `createdAt`/`updatedAt` on a freshly inserted field map.
pub(crate) fn stamp_new(fields: &mut Fields) {
    let now = now_value();
    fields.insert(CREATED_AT_FIELD.to_string(), now.clone());
    fields.insert(UPDATED_AT_FIELD.to_string(), now);
}

fn now_value() -> Value {
    // RFC 3339, which chrono's serde support round-trips.
    Value::String(Utc::now().to_rfc3339())
}
