use std::collections::HashSet;

use crate::field::field_model::FieldDescriptor;
use crate::session::session_state::SessionState;
use crate::surface::surface_model::DomField;

/// Turn raw element snapshots into descriptors, in traversal order.
///
/// Emits a descriptor only when both id and label resolved non-empty and
/// the id has not already been filled this session. Within one pass the
/// first occurrence of an id wins; later duplicates are dropped. Elements
/// without an id or name are silently skipped — they cannot be targeted
/// for fill later.
pub fn extract_fields(inputs: &[DomField], state: &SessionState) -> Vec<FieldDescriptor> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut descriptors = Vec::new();

    for field in inputs {
        if !is_fillable(field) {
            continue;
        }

        let id = derive_id(field);
        let label = derive_label(field);
        if id.is_empty() || label.is_empty() {
            continue;
        }
        if state.is_filled(&id) {
            continue;
        }
        if !seen.insert(id.clone()) {
            continue;
        }

        let field_type = field.input_type.clone().unwrap_or_default();
        descriptors.push(FieldDescriptor {
            id,
            label,
            field_type,
        });
    }

    descriptors
}

fn is_fillable(field: &DomField) -> bool {
    matches!(field.tag.as_str(), "input" | "select" | "textarea")
}

/// id attribute, falling back to name, falling back to empty.
fn derive_id(field: &DomField) -> String {
    field
        .id
        .as_deref()
        .filter(|s| !s.is_empty())
        .or_else(|| field.name.as_deref().filter(|s| !s.is_empty()))
        .unwrap_or("")
        .to_string()
}

/// Associated label text, falling back to placeholder, falling back to name.
fn derive_label(field: &DomField) -> String {
    if let Some(raw) = field.label.as_deref() {
        let cleaned = clean_label(raw);
        if !cleaned.is_empty() {
            return cleaned;
        }
    }

    if let Some(placeholder) = field.placeholder.as_deref() {
        let trimmed = placeholder.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    field.name.as_deref().unwrap_or("").trim().to_string()
}

/// Trim whitespace and strip one trailing colon from label text.
pub fn clean_label(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed
        .strip_suffix(':')
        .unwrap_or(trimmed)
        .trim_end()
        .to_string()
}
