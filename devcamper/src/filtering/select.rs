use super::conditions::is_valid_field_name;
use crate::errors::ApiError;
use crate::store::document::{Document, ID_FIELD, insert_path, lookup_path, remove_path};

/// Which fields of a document are returned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Projection {
    /// Every field.
    #[default]
    All,
    /// Exactly these fields, plus `_id`.
    Include(Vec<String>),
    /// Every field except these.
    Exclude(Vec<String>),
}

impl Projection {
    /// Inclusion projection over the given field names.
    #[must_use]
    pub fn fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Include(fields.into_iter().map(Into::into).collect())
    }

    /// Parse a `select` parameter: `name,description` or `-description,-phone`.
    ///
    /// Blank entries are ignored; a blank or absent parameter selects every field.
    ///
    /// # Errors
    /// Returns a 400 for invalid field names and for lists mixing included and
    /// excluded fields.
    pub fn parse(spec: Option<&str>) -> Result<Self, ApiError> {
        let Some(spec) = spec else {
            return Ok(Self::All);
        };

        let mut include = Vec::new();
        let mut exclude = Vec::new();
        for entry in spec.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (target, field) = match entry.strip_prefix('-') {
                Some(field) => (&mut exclude, field.trim()),
                None => (&mut include, entry),
            };
            if !is_valid_field_name(field) {
                return Err(ApiError::invalid_query(format!("invalid select field `{entry}`")));
            }
            target.push(field.to_string());
        }

        match (include.is_empty(), exclude.is_empty()) {
            (true, true) => Ok(Self::All),
            (false, true) => Ok(Self::Include(include)),
            (true, false) => Ok(Self::Exclude(exclude)),
            (false, false) => Err(ApiError::invalid_query(
                "select can not mix included and excluded fields",
            )),
        }
    }

    /// Whether `path` survives this projection.
    #[must_use]
    pub fn keeps(&self, path: &str) -> bool {
        let covers = |field: &String| {
            field == path || path.strip_prefix(field.as_str()).is_some_and(|rest| rest.starts_with('.'))
        };
        match self {
            Self::All => true,
            Self::Include(fields) => path == ID_FIELD || fields.iter().any(covers),
            Self::Exclude(fields) => !fields.iter().any(covers),
        }
    }

    /// Restrict a document to this projection.
    #[must_use]
    pub fn apply(&self, document: Document) -> Document {
        match self {
            Self::All => document,
            Self::Include(fields) => {
                let mut projected = Document::new();
                if let Some(id) = document.get(ID_FIELD) {
                    projected.insert(ID_FIELD.to_string(), id.clone());
                }
                for field in fields {
                    if let Some(value) = lookup_path(&document, field) {
                        insert_path(&mut projected, field, value.clone());
                    }
                }
                projected
            }
            Self::Exclude(fields) => {
                let mut projected = document;
                for field in fields {
                    remove_path(&mut projected, field);
                }
                projected
            }
        }
    }
}
