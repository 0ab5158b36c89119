use heck::ToKebabCase;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::{USER_FIELD, new_document, to_document};
use crate::errors::ApiError;
use crate::store::document::Document;
use crate::validation::{Validatable, ValidationError, ValidationErrors, validators};

pub const CAREERS: [&str; 6] = [
    "Web Development",
    "Mobile Development",
    "UI/UX",
    "Data Science",
    "Business",
    "Other",
];

const NAME_MAX: usize = 50;
const DESCRIPTION_MAX: usize = 500;
const PHONE_MAX: usize = 20;

/// URL slug derived from a bootcamp name: `Devworks Bootcamp` → `devworks-bootcamp`.
#[must_use]
pub fn slugify(name: &str) -> String {
    name.to_lowercase().to_kebab_case()
}

fn validate_careers(errors: &mut ValidationErrors, careers: &[String]) {
    if careers.is_empty() {
        errors.add(ValidationError::new("careers", "Please add at least one career"));
    }
    for career in careers {
        errors.check(validators::validate_one_of("careers", career, &CAREERS));
    }
}

fn validate_contact(
    errors: &mut ValidationErrors,
    website: Option<&str>,
    phone: Option<&str>,
    email: Option<&str>,
) {
    if let Some(website) = website {
        errors.check(validators::validate_url("website", website));
    }
    if let Some(phone) = phone {
        errors.check(validators::validate_max_length("phone", phone, PHONE_MAX));
    }
    if let Some(email) = email {
        errors.check(validators::validate_email("email", email));
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BootcampCreate {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub careers: Vec<String>,
    #[serde(default)]
    pub housing: bool,
    #[serde(default)]
    pub job_assistance: bool,
    #[serde(default)]
    pub job_guarantee: bool,
    #[serde(default)]
    pub accept_gi: bool,
}

impl Validatable for BootcampCreate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(validators::validate_required("name", &self.name, "Please add a name"));
        errors.check(validators::validate_max_length("name", &self.name, NAME_MAX));
        errors.check(validators::validate_required(
            "description",
            &self.description,
            "Please add a description",
        ));
        errors.check(validators::validate_max_length("description", &self.description, DESCRIPTION_MAX));
        errors.check(validators::validate_required("address", &self.address, "Please add an address"));
        validate_contact(
            &mut errors,
            self.website.as_deref(),
            self.phone.as_deref(),
            self.email.as_deref(),
        );
        validate_careers(&mut errors, &self.careers);
        errors.result()
    }
}

impl BootcampCreate {
    /// The stored document, owned by `user_id`.
    ///
    /// # Errors
    /// A 500 if the payload can not be serialized.
    pub fn into_document(self, user_id: &str) -> Result<Document, ApiError> {
        let mut document = new_document(&self)?;
        document.insert("name".to_string(), Value::String(self.name.trim().to_string()));
        document.insert("slug".to_string(), Value::String(slugify(&self.name)));
        document.insert(USER_FIELD.to_string(), Value::String(user_id.to_string()));
        Ok(document)
    }
}

/// Partial update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BootcampUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub careers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub housing: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_assistance: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_guarantee: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accept_gi: Option<bool>,
}

impl Validatable for BootcampUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(name) = &self.name {
            errors.check(validators::validate_required("name", name, "Please add a name"));
            errors.check(validators::validate_max_length("name", name, NAME_MAX));
        }
        if let Some(description) = &self.description {
            errors.check(validators::validate_required("description", description, "Please add a description"));
            errors.check(validators::validate_max_length("description", description, DESCRIPTION_MAX));
        }
        if let Some(address) = &self.address {
            errors.check(validators::validate_required("address", address, "Please add an address"));
        }
        validate_contact(
            &mut errors,
            self.website.as_deref(),
            self.phone.as_deref(),
            self.email.as_deref(),
        );
        if let Some(careers) = &self.careers {
            validate_careers(&mut errors, careers);
        }
        errors.result()
    }
}

impl BootcampUpdate {
    /// Changes to merge into the stored document; a new name also renews the slug.
    ///
    /// # Errors
    /// A 500 if the payload can not be serialized.
    pub fn into_changes(self) -> Result<Document, ApiError> {
        let mut changes = to_document(&self)?;
        if let Some(name) = &self.name {
            changes.insert("name".to_string(), Value::String(name.trim().to_string()));
            changes.insert("slug".to_string(), Value::String(slugify(name)));
        }
        Ok(changes)
    }
}
