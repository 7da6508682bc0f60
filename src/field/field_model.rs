use serde::{Deserialize, Serialize};

/// Identifying metadata for one form input, sent to the backend for value
/// lookup.
///
/// Identity is `id`: two descriptors with the same id are the same field.
/// Immutable after creation; discarded once its batch's response has been
/// applied. Serializes with `type` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: String,
}

impl FieldDescriptor {
    pub fn new(id: &str, label: &str, field_type: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            field_type: field_type.to_string(),
        }
    }
}
