use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::{BOOTCAMP_FIELD, USER_FIELD, new_document, to_document};
use crate::errors::ApiError;
use crate::store::document::Document;
use crate::validation::{Validatable, ValidationError, ValidationErrors, validators};

pub const SKILLS: [&str; 3] = ["beginner", "intermediate", "advanced"];

fn validate_numbers(errors: &mut ValidationErrors, weeks: Option<i64>, tuition: Option<f64>) {
    if let Some(weeks) = weeks {
        errors.check(validators::validate_range("weeks", weeks, Some(1), None));
    }
    if let Some(tuition) = tuition {
        errors.check(validators::validate_range("tuition", tuition, Some(0.0), None));
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseCreate {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub weeks: Option<i64>,
    pub tuition: Option<f64>,
    #[serde(default)]
    pub minimum_skill: String,
    #[serde(default)]
    pub scholarship_available: bool,
}

impl Validatable for CourseCreate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(validators::validate_required("title", &self.title, "Please add a course title"));
        errors.check(validators::validate_required(
            "description",
            &self.description,
            "Please add a description",
        ));
        if self.weeks.is_none() {
            errors.add(ValidationError::new("weeks", "Please add number of weeks"));
        }
        if self.tuition.is_none() {
            errors.add(ValidationError::new("tuition", "Please add a tuition cost"));
        }
        validate_numbers(&mut errors, self.weeks, self.tuition);
        if self.minimum_skill.is_empty() {
            errors.add(ValidationError::new("minimumSkill", "Please add a minimum skill"));
        } else {
            errors.check(validators::validate_one_of("minimumSkill", &self.minimum_skill, &SKILLS));
        }
        errors.result()
    }
}

impl CourseCreate {
    /// The stored document for a course of `bootcamp_id`, owned by `user_id`.
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
pub struct CourseUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weeks: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tuition: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_skill: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scholarship_available: Option<bool>,
}

impl Validatable for CourseUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(title) = &self.title {
            errors.check(validators::validate_required("title", title, "Please add a course title"));
        }
        if let Some(description) = &self.description {
            errors.check(validators::validate_required("description", description, "Please add a description"));
        }
        validate_numbers(&mut errors, self.weeks, self.tuition);
        if let Some(skill) = &self.minimum_skill {
            errors.check(validators::validate_one_of("minimumSkill", skill, &SKILLS));
        }
        errors.result()
    }
}

impl CourseUpdate {
    /// # Errors
    /// A 500 if the payload can not be serialized.
    pub fn into_changes(self) -> Result<Document, ApiError> {
        to_document(&self)
    }

    /// Whether applying this update can change the bootcamp's average cost.
    #[must_use]
    pub fn touches_tuition(&self) -> bool {
        self.tuition.is_some()
    }
}
