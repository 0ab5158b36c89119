//! Write payloads for the four resources and their conversion to documents.
//!
//! Reads never go through these types: stored documents are returned as they
//! are, shaped only by projection and population.

pub mod bootcamp;
pub mod course;
pub mod review;
pub mod user;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::errors::ApiError;
use crate::store::document::{CREATED_AT_FIELD, Document, ID_FIELD};
use crate::store::new_id;

pub use bootcamp::{BootcampCreate, BootcampUpdate};
pub use course::{CourseCreate, CourseUpdate};
pub use review::{ReviewCreate, ReviewUpdate};
pub use user::{UserCreate, UserUpdate};

pub const BOOTCAMPS: &str = "bootcamps";
pub const COURSES: &str = "courses";
pub const REVIEWS: &str = "reviews";
pub const USERS: &str = "users";

/// Field holding the owning user's `_id`.
pub const USER_FIELD: &str = "user";
/// Field holding the owning bootcamp's `_id`.
pub const BOOTCAMP_FIELD: &str = "bootcamp";

/// Current time as stored in `createdAt`.
#[must_use]
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Serialize a payload into a document.
///
/// # Errors
/// A 500 if the payload does not serialize to a JSON object.
pub fn to_document<T: Serialize>(payload: &T) -> Result<Document, ApiError> {
    match serde_json::to_value(payload) {
        Ok(Value::Object(document)) => Ok(document),
        Ok(other) => Err(ApiError::internal(
            "Server Error",
            Some(format!("payload serialized to {other}")),
        )),
        Err(e) => Err(ApiError::internal("Server Error", Some(e.to_string()))),
    }
}

/// A new document with a fresh `_id` and `createdAt`.
fn new_document<T: Serialize>(payload: &T) -> Result<Document, ApiError> {
    let mut document = Document::new();
    document.insert(ID_FIELD.to_string(), Value::String(new_id()));
    document.extend(to_document(payload)?);
    document.insert(CREATED_AT_FIELD.to_string(), Value::String(timestamp()));
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_is_sortable_rfc3339_millis() {
        let stamp = timestamp();
        assert_eq!(stamp.len(), "2024-01-01T00:00:00.000Z".len());
        assert!(stamp.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&stamp).is_ok());
    }

    #[test]
    fn test_to_document_rejects_non_objects() {
        assert!(to_document(&42).is_err());
        assert!(to_document(&serde_json::json!({"a": 1})).is_ok());
    }
}
