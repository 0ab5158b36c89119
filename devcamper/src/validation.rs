//! Validation Support
//!
//! Write payloads implement [`Validatable`] and collect every violation into a
//! [`ValidationErrors`] so the client sees all of them at once.
//!
//! ```rust,ignore
//! impl Validatable for ReviewCreate {
//!     fn validate(&self) -> Result<(), ValidationErrors> {
//!         let mut errors = ValidationErrors::new();
//!         errors.check(validators::validate_range("rating", self.rating, Some(1), Some(10)));
//!         errors.result()
//!     }
//! }
//! ```

use serde::Serialize;
use std::fmt;

/// Validation error with field name and message
#[derive(Debug, Clone, Serialize)]
pub struct ValidationError {
    /// The field that failed validation
    pub field: String,
    /// Human-readable error message
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Collection of validation errors
#[derive(Debug, Clone, Serialize, Default)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Record the error of a single validator, if any.
    pub fn check(&mut self, outcome: Result<(), ValidationError>) {
        if let Err(error) = outcome {
            self.add(error);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Convert to Result
    ///
    /// # Errors
    /// Returns `self` when at least one error was recorded.
    pub fn result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed with {} error(s):", self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n  - {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Trait for write payloads that can be validated before they reach the store
pub trait Validatable {
    /// # Errors
    /// Returns every violated rule.
    fn validate(&self) -> Result<(), ValidationErrors>;
}

/// Helper validators for common patterns
pub mod validators {
    use super::ValidationError;
    use std::fmt;

    /// Validate value is not empty, using `message` when it is
    pub fn validate_required(field: &str, value: &str, message: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::new(field, message));
        }
        Ok(())
    }

    /// Validate string length (in characters) does not exceed `max`
    pub fn validate_max_length(field: &str, value: &str, max: usize) -> Result<(), ValidationError> {
        if value.chars().count() > max {
            return Err(ValidationError::new(
                field,
                format!("{field} can not be more than {max} characters"),
            ));
        }
        Ok(())
    }

    /// Validate number is within range
    pub fn validate_range<T: PartialOrd + fmt::Display>(
        field: &str,
        value: T,
        min: Option<T>,
        max: Option<T>,
    ) -> Result<(), ValidationError> {
        if let Some(min_val) = min
            && value < min_val
        {
            return Err(ValidationError::new(
                field,
                format!("{field} must be at least {min_val}"),
            ));
        }

        if let Some(max_val) = max
            && value > max_val
        {
            return Err(ValidationError::new(
                field,
                format!("{field} must be at most {max_val}"),
            ));
        }

        Ok(())
    }

    /// Basic email validation
    pub fn validate_email(field: &str, value: &str) -> Result<(), ValidationError> {
        let valid = value
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.') && !domain.starts_with('.'));
        if !valid || value.len() > 255 {
            return Err(ValidationError::new(field, "Please add a valid email"));
        }
        Ok(())
    }

    /// Validate an absolute http(s) URL
    pub fn validate_url(field: &str, value: &str) -> Result<(), ValidationError> {
        match url::Url::parse(value) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
            _ => Err(ValidationError::new(
                field,
                "Please use a valid URL with HTTP or HTTPS",
            )),
        }
    }

    /// Validate that `value` is one of `allowed`
    pub fn validate_one_of(field: &str, value: &str, allowed: &[&str]) -> Result<(), ValidationError> {
        if allowed.contains(&value) {
            Ok(())
        } else {
            Err(ValidationError::new(
                field,
                format!("{field} must be one of: {}", allowed.join(", ")),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_collection() {
        let mut errors = ValidationErrors::new();
        assert!(errors.is_empty());

        errors.check(Ok(()));
        assert!(errors.is_empty());

        errors.check(Err(ValidationError::new("field1", "error1")));
        errors.add(ValidationError::new("field2", "error2"));
        assert_eq!(errors.len(), 2);
        assert!(errors.result().is_err());
    }

    #[test]
    fn test_validate_max_length() {
        use validators::validate_max_length;

        assert!(validate_max_length("name", "abcdef", 5).is_err());
        assert!(validate_max_length("name", "abcde", 5).is_ok());
        // counted in characters, not bytes
        assert!(validate_max_length("name", "ééééé", 5).is_ok());
    }

    #[test]
    fn test_validate_range() {
        use validators::validate_range;

        assert!(validate_range("rating", 0, Some(1), Some(10)).is_err());
        assert!(validate_range("rating", 11, Some(1), Some(10)).is_err());
        assert!(validate_range("rating", 7, Some(1), Some(10)).is_ok());
    }

    #[test]
    fn test_validate_email() {
        use validators::validate_email;

        assert!(validate_email("email", "invalid").is_err());
        assert!(validate_email("email", "@example.com").is_err());
        assert!(validate_email("email", "john@example.com").is_ok());
    }

    #[test]
    fn test_validate_url() {
        use validators::validate_url;

        assert!(validate_url("website", "https://devworks.com").is_ok());
        assert!(validate_url("website", "ftp://devworks.com").is_err());
        assert!(validate_url("website", "devworks").is_err());
    }

    #[test]
    fn test_validate_one_of() {
        use validators::validate_one_of;

        let skills = ["beginner", "intermediate", "advanced"];
        assert!(validate_one_of("minimumSkill", "advanced", &skills).is_ok());
        assert!(validate_one_of("minimumSkill", "expert", &skills).is_err());
    }
}
