use sea_orm::Order;

use super::conditions::is_valid_field_name;
use crate::errors::ApiError;

/// Newest first when no `sort` is given.
pub const DEFAULT_SORT: &str = "-createdAt";

#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
    pub field: String,
    pub direction: Order,
}

impl SortKey {
    #[must_use]
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Order::Asc,
        }
    }

    #[must_use]
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Order::Desc,
        }
    }
}

/// Parse one `sort` entry: `name` ascending, `-name` descending
fn parse_entry(entry: &str) -> Result<SortKey, ApiError> {
    let key = match entry.strip_prefix('-') {
        Some(field) => SortKey::desc(field.trim()),
        None => SortKey::asc(entry),
    };
    if is_valid_field_name(&key.field) {
        Ok(key)
    } else {
        Err(ApiError::invalid_query(format!("invalid sort field `{entry}`")))
    }
}

/// Parse a `sort` parameter into keys in left-to-right priority.
///
/// An absent or blank parameter sorts by [`DEFAULT_SORT`]. Documents equal on
/// every key keep the store's natural order.
///
/// # Errors
/// Returns a 400 when an entry is not a valid field name.
pub fn parse_sort(spec: Option<&str>) -> Result<Vec<SortKey>, ApiError> {
    let keys = spec
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(parse_entry)
        .collect::<Result<Vec<_>, _>>()?;

    if keys.is_empty() {
        parse_entry(DEFAULT_SORT).map(|key| vec![key])
    } else {
        Ok(keys)
    }
}
