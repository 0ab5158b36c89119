use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{new_document, to_document};
use crate::auth::Role;
use crate::errors::ApiError;
use crate::store::document::Document;
use crate::validation::{Validatable, ValidationErrors, validators};

/// Roles that can be assigned through the API. Admins are only seeded.
pub const ASSIGNABLE_ROLES: [&str; 2] = ["user", "publisher"];

fn default_role() -> String {
    Role::User.as_str().to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserCreate {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default = "default_role")]
    pub role: String,
}

impl Validatable for UserCreate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(validators::validate_required("name", &self.name, "Please add a name"));
        errors.check(validators::validate_email("email", &self.email));
        errors.check(validators::validate_one_of("role", &self.role, &ASSIGNABLE_ROLES));
        errors.result()
    }
}

impl UserCreate {
    /// # Errors
    /// A 500 if the payload can not be serialized.
    pub fn into_document(self) -> Result<Document, ApiError> {
        let normalized = Self {
            email: self.email.trim().to_lowercase(),
            ..self
        };
        new_document(&normalized)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl Validatable for UserUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(name) = &self.name {
            errors.check(validators::validate_required("name", name, "Please add a name"));
        }
        if let Some(email) = &self.email {
            errors.check(validators::validate_email("email", email));
        }
        if let Some(role) = &self.role {
            errors.check(validators::validate_one_of("role", role, &ASSIGNABLE_ROLES));
        }
        errors.result()
    }
}

impl UserUpdate {
    /// # Errors
    /// A 500 if the payload can not be serialized.
    pub fn into_changes(self) -> Result<Document, ApiError> {
        let normalized = Self {
            email: self.email.map(|email| email.trim().to_lowercase()),
            ..self
        };
        to_document(&normalized)
    }
}

/// The role recorded on a user document, if it is a known one.
#[must_use]
pub fn stored_role(document: &Document) -> Option<Role> {
    document.get("role").and_then(serde_json::Value::as_str).and_then(Role::parse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_role_is_user() {
        let user: UserCreate = serde_json::from_value(json!({"name": "Jane", "email": "Jane@Example.com"})).unwrap();
        assert!(user.validate().is_ok());
        let document = user.into_document().unwrap();
        assert_eq!(document["role"], json!("user"));
        assert_eq!(document["email"], json!("jane@example.com"));
        assert_eq!(stored_role(&document), Some(Role::User));
    }

    #[test]
    fn test_admin_role_can_not_be_assigned() {
        let user: UserCreate =
            serde_json::from_value(json!({"name": "Eve", "email": "eve@example.com", "role": "admin"})).unwrap();
        assert!(user.validate().is_err());

        let update = UserUpdate {
            role: Some("admin".to_string()),
            ..UserUpdate::default()
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn test_invalid_email() {
        let user: UserCreate = serde_json::from_value(json!({"name": "Jo", "email": "nope"})).unwrap();
        let errors = user.validate().unwrap_err();
        assert_eq!(errors.errors()[0].message, "Please add a valid email");
    }
}
