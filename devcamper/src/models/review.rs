use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::{BOOTCAMP_FIELD, USER_FIELD, new_document, to_document};
use crate::errors::ApiError;
use crate::store::document::Document;
use crate::validation::{Validatable, ValidationError, ValidationErrors, validators};

const TITLE_MAX: usize = 100;
const RATING_MESSAGE: &str = "Please add a rating between 1 and 10";

fn validate_rating(errors: &mut ValidationErrors, rating: i64) {
    if validators::validate_range("rating", rating, Some(1), Some(10)).is_err() {
        errors.add(ValidationError::new("rating", RATING_MESSAGE));
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewCreate {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    pub rating: Option<i64>,
}

impl Validatable for ReviewCreate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(validators::validate_required(
            "title",
            &self.title,
            "Please add a title for the review",
        ));
        errors.check(validators::validate_max_length("title", &self.title, TITLE_MAX));
        errors.check(validators::validate_required("text", &self.text, "Please add some text"));
        match self.rating {
            Some(rating) => validate_rating(&mut errors, rating),
            None => errors.add(ValidationError::new("rating", RATING_MESSAGE)),
        }
        errors.result()
    }
}

impl ReviewCreate {
    /// The stored review of `bootcamp_id` written by `user_id`.
    ///
    /// # Errors
    /// A 500 if the payload can not be serialized.
    pub fn into_document(self, bootcamp_id: &str, user_id: &str) -> Result<Document, ApiError> {
        let mut document = new_document(&self)?;
        document.insert(BOOTCAMP_FIELD.to_string(), Value::String(bootcamp_id.to_string()));
        document.insert(USER_FIELD.to_string(), Value::String(user_id.to_string()));
        Ok(document)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<i64>,
}

impl Validatable for ReviewUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(title) = &self.title {
            errors.check(validators::validate_required("title", title, "Please add a title for the review"));
            errors.check(validators::validate_max_length("title", title, TITLE_MAX));
        }
        if let Some(text) = &self.text {
            errors.check(validators::validate_required("text", text, "Please add some text"));
        }
        if let Some(rating) = self.rating {
            validate_rating(&mut errors, rating);
        }
        errors.result()
    }
}

impl ReviewUpdate {
    /// # Errors
    /// A 500 if the payload can not be serialized.
    pub fn into_changes(self) -> Result<Document, ApiError> {
        to_document(&self)
    }
}
