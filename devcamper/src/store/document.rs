//! Stored documents are JSON objects keyed by field name.
//!
//! Fields may be addressed with dot notation (`location.city`) everywhere a
//! field name is accepted: filters, projections, sorts and population paths.

use serde_json::{Map, Value};

/// A stored entity: bootcamp, course, review or user.
pub type Document = Map<String, Value>;

/// Identity field every document carries and every projection keeps.
pub const ID_FIELD: &str = "_id";

/// Creation timestamp (RFC 3339, millisecond precision, UTC), used by the default sort.
pub const CREATED_AT_FIELD: &str = "createdAt";

/// The document's `_id` when it is a string.
#[must_use]
pub fn document_id(document: &Document) -> Option<&str> {
    document.get(ID_FIELD).and_then(Value::as_str)
}

/// Resolve a dotted path inside a document.
#[must_use]
pub fn lookup_path<'a>(document: &'a Document, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = document.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Write `value` at a dotted path, creating intermediate objects as needed.
///
/// Existing non-object values along the path are replaced.
pub fn insert_path(document: &mut Document, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            document.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let entry = document
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            if let Value::Object(child) = entry {
                insert_path(child, rest, value);
            }
        }
    }
}

/// Remove the value at a dotted path, returning it.
pub fn remove_path(document: &mut Document, path: &str) -> Option<Value> {
    match path.split_once('.') {
        None => document.remove(path),
        Some((head, rest)) => match document.get_mut(head)? {
            Value::Object(child) => remove_path(child, rest),
            _ => None,
        },
    }
}

/// Apply a partial update: every key in `changes` overwrites the stored one,
/// and a `null` value unsets the field.
pub fn merge_changes(document: &mut Document, changes: Document) {
    for (key, value) in changes {
        if key == ID_FIELD {
            continue;
        }
        if value.is_null() {
            document.remove(&key);
        } else {
            document.insert(key, value);
        }
    }
}
