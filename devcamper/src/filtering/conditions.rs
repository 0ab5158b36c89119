use serde_json::Value;

use super::operators::{Operator, translate_operators};
use super::query::{QueryMap, QueryParams};
use crate::errors::ApiError;

/// Parameters that steer the pipeline and never become filter predicates.
pub const CONTROL_KEYS: [&str; 4] = ["select", "sort", "page", "limit"];

const MAX_FIELD_NAME_LENGTH: usize = 100;

/// Dot-separated segments of ASCII alphanumerics and underscores
pub(crate) fn is_valid_field_name(field_name: &str) -> bool {
    !field_name.is_empty()
        && field_name.len() <= MAX_FIELD_NAME_LENGTH
        && field_name.split('.').all(|segment| {
            !segment.is_empty() && segment.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

/// One operator-tagged comparison. For [`Operator::In`] the value is a list.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub op: Operator,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// The field equals the literal (or, for list fields, contains it).
    Equals(Value),
    /// Every comparison must hold.
    Compare(Vec<Comparison>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub predicate: Predicate,
}

/// Conjunction of per-field predicates, in query-string order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    fields: Vec<FieldFilter>,
}

impl Filter {
    /// The filter matching every document.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push(FieldFilter {
            field: field.into(),
            predicate: Predicate::Equals(value.into()),
        });
        self
    }

    #[must_use]
    pub fn compare(mut self, field: impl Into<String>, op: Operator, value: impl Into<Value>) -> Self {
        self.fields.push(FieldFilter {
            field: field.into(),
            predicate: Predicate::Compare(vec![Comparison { op, value: value.into() }]),
        });
        self
    }

    #[must_use]
    pub fn is_in(self, field: impl Into<String>, values: Vec<Value>) -> Self {
        self.compare(field, Operator::In, Value::Array(values))
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldFilter] {
        &self.fields
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The predicate recorded for `field`, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Predicate> {
        self.fields
            .iter()
            .find(|f| f.field == field)
            .map(|f| &f.predicate)
    }
}

/// Query parameters minus the control keys, in their original order.
#[must_use]
pub fn residual_params(params: &QueryParams) -> QueryMap {
    params
        .as_map()
        .iter()
        .filter(|(key, _)| !CONTROL_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Build the filter predicate from a request's query parameters.
///
/// Control keys are dropped, operator keywords translated, nested
/// non-operator keys flattened to dotted paths and literals coerced.
///
/// # Errors
/// Returns a 400 for invalid field names and for operator values that can not
/// form a comparison (e.g. `tuition[gt][x]=1`).
pub fn build_filter(params: &QueryParams) -> Result<Filter, ApiError> {
    let translated = translate_operators(&residual_params(params));
    let mut filter = Filter::all();
    for (field, value) in &translated {
        if !is_valid_field_name(field) {
            return Err(ApiError::invalid_query(format!("invalid field name `{field}`")));
        }
        collect(field, value, &mut filter)?;
    }
    Ok(filter)
}

fn collect(path: &str, value: &Value, filter: &mut Filter) -> Result<(), ApiError> {
    match value {
        Value::String(literal) => {
            filter.fields.push(FieldFilter {
                field: path.to_string(),
                predicate: Predicate::Equals(coerce_literal(literal)),
            });
        }
        Value::Array(_) => {
            filter.fields.push(FieldFilter {
                field: path.to_string(),
                predicate: Predicate::Compare(vec![Comparison {
                    op: Operator::In,
                    value: Value::Array(list_values(path, value)?),
                }]),
            });
        }
        Value::Object(entries) => {
            let mut comparisons = Vec::new();
            for (key, child) in entries {
                if let Some(op) = Operator::from_token(key) {
                    let value = match op {
                        Operator::In => Value::Array(list_values(path, child)?),
                        _ => match child {
                            Value::String(literal) => coerce_literal(literal),
                            _ => {
                                return Err(ApiError::invalid_query(format!(
                                    "`{path}[{}]` needs a single value",
                                    op.keyword()
                                )));
                            }
                        },
                    };
                    comparisons.push(Comparison { op, value });
                } else {
                    let nested = format!("{path}.{key}");
                    if !is_valid_field_name(&nested) {
                        return Err(ApiError::invalid_query(format!("invalid field name `{nested}`")));
                    }
                    collect(&nested, child, filter)?;
                }
            }
            if !comparisons.is_empty() {
                filter.fields.push(FieldFilter {
                    field: path.to_string(),
                    predicate: Predicate::Compare(comparisons),
                });
            }
        }
        other => {
            filter.fields.push(FieldFilter {
                field: path.to_string(),
                predicate: Predicate::Equals(other.clone()),
            });
        }
    }
    Ok(())
}

/// Values of an `in` comparison: a comma-separated string or a list of strings.
fn list_values(path: &str, value: &Value) -> Result<Vec<Value>, ApiError> {
    match value {
        Value::String(joined) => Ok(joined
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(coerce_literal)
            .collect()),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(literal) => Ok(coerce_literal(literal)),
                _ => Err(ApiError::invalid_query(format!("`{path}` list must hold plain values"))),
            })
            .collect(),
        _ => Err(ApiError::invalid_query(format!("`{path}[in]` needs a list of values"))),
    }
}

/// Interpret a query-string literal: booleans and numbers become typed JSON,
/// everything else stays a string.
///
/// Digit strings with a leading zero (`02118`) stay strings so zip codes and
/// similar identifiers still match.
#[must_use]
pub fn coerce_literal(literal: &str) -> Value {
    match literal {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }

    let digits = literal.strip_prefix('-').unwrap_or(literal);
    let starts_like_number = digits.chars().next().is_some_and(|c| c.is_ascii_digit());
    let leading_zero = digits.len() > 1 && digits.starts_with('0') && !digits.starts_with("0.");
    if !starts_like_number || leading_zero {
        return Value::String(literal.to_string());
    }

    if let Ok(int_value) = literal.parse::<i64>() {
        return Value::from(int_value);
    }
    literal
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map_or_else(|| Value::String(literal.to_string()), Value::Number)
}
