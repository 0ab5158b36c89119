//! Query-string decoding with bracket-notation nesting.
//!
//! `tuition[gt]=5000&careers[in]=Business&page=2` decodes to
//!
//! ```json
//! { "tuition": { "gt": "5000" }, "careers": { "in": "Business" }, "page": "2" }
//! ```
//!
//! Keys keep their first-seen order. `a[]=x&a[]=y` and `a=x&a=y` both produce
//! lists.

use axum::{extract::FromRequestParts, http::request::Parts};
use serde_json::{Map, Value};

use crate::errors::ApiError;

/// Ordered map of decoded query parameters.
pub type QueryMap = Map<String, Value>;

/// Deepest bracket nesting accepted (`a[b][c][d][e][f]`).
const MAX_DEPTH: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Push,
}

/// Decoded query parameters of one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    map: QueryMap,
}

impl QueryParams {
    /// Decode a raw (still percent-encoded) query string.
    ///
    /// # Errors
    /// Returns a 400 for unbalanced brackets, empty root keys, nesting deeper
    /// than five levels, or a key used both as a value and as a map.
    pub fn parse(raw: &str) -> Result<Self, ApiError> {
        let mut map = QueryMap::new();
        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            if key.is_empty() {
                continue;
            }
            let (root, segments) = split_key(&key).map_err(ApiError::invalid_query)?;
            insert(&mut map, root, &segments, value.into_owned())
                .map_err(ApiError::invalid_query)?;
        }
        Ok(Self { map })
    }

    #[must_use]
    pub fn from_map(map: QueryMap) -> Self {
        Self { map }
    }

    #[must_use]
    pub fn as_map(&self) -> &QueryMap {
        &self.map
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.map.get(key)
    }

    /// A control parameter (`select`, `sort`, `page`, `limit`) as flat text.
    ///
    /// Repeated keys are joined with commas, so `select=name&select=email`
    /// reads like `select=name,email`.
    ///
    /// # Errors
    /// Returns a 400 when the parameter was given bracket-nested keys.
    pub fn text(&self, key: &str) -> Result<Option<String>, ApiError> {
        match self.map.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| ApiError::invalid_query(format!("`{key}` must be flat")))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(|parts| Some(parts.join(","))),
            Some(_) => Err(ApiError::invalid_query(format!("`{key}` must be flat"))),
        }
    }
}

impl<S> FromRequestParts<S> for QueryParams
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::parse(parts.uri.query().unwrap_or_default())
    }
}

fn split_key(key: &str) -> Result<(&str, Vec<Segment>), String> {
    let (root, mut rest) = match key.find('[') {
        Some(0) => return Err(format!("missing field name in `{key}`")),
        Some(pos) => (&key[..pos], &key[pos..]),
        None => (key, ""),
    };
    if root.contains(']') {
        return Err(format!("unbalanced bracket in `{key}`"));
    }

    let mut segments = Vec::new();
    while !rest.is_empty() {
        let inner = rest
            .strip_prefix('[')
            .ok_or_else(|| format!("unexpected text after `]` in `{key}`"))?;
        let close = inner
            .find(']')
            .ok_or_else(|| format!("unbalanced bracket in `{key}`"))?;
        let name = &inner[..close];
        if name.contains('[') {
            return Err(format!("unbalanced bracket in `{key}`"));
        }
        segments.push(if name.is_empty() {
            Segment::Push
        } else {
            Segment::Key(name.to_string())
        });
        if segments.len() > MAX_DEPTH {
            return Err(format!("`{key}` nests deeper than {MAX_DEPTH} levels"));
        }
        rest = &inner[close + 1..];
    }
    Ok((root, segments))
}

fn insert(target: &mut QueryMap, key: &str, rest: &[Segment], value: String) -> Result<(), String> {
    let Some((first, tail)) = rest.split_first() else {
        match target.get_mut(key) {
            None => {
                target.insert(key.to_string(), Value::String(value));
            }
            Some(Value::Array(items)) => items.push(Value::String(value)),
            Some(existing @ Value::String(_)) => {
                let previous = existing.take();
                *existing = Value::Array(vec![previous, Value::String(value)]);
            }
            Some(_) => return Err(format!("`{key}` is used both as a value and as a map")),
        }
        return Ok(());
    };

    match first {
        Segment::Push => {
            if !tail.is_empty() {
                return Err(format!("`{key}[]` can not be nested further"));
            }
            match target
                .entry(key.to_string())
                .or_insert_with(|| Value::Array(Vec::new()))
            {
                Value::Array(items) => items.push(Value::String(value)),
                existing @ Value::String(_) => {
                    let previous = existing.take();
                    *existing = Value::Array(vec![previous, Value::String(value)]);
                }
                _ => {
                    return Err(format!("`{key}` is used both as a list and as a map"));
                }
            }
            Ok(())
        }
        Segment::Key(child) => match target
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()))
        {
            Value::Object(nested) => insert(nested, child, tail, value),
            _ => Err(format!("`{key}` is used both as a value and as a map")),
        },
    }
}
