//! Comparison operators accepted in bracket notation.
//!
//! `tuition[gte]=5000` names the `gte` operator; the translator rewrites that
//! key to the storage token `$gte`. Only keys *below* the root are inspected, so
//! a document field that is itself called `gt` or `in` is never mistaken for an
//! operator.

use serde_json::{Map, Value};

use super::query::QueryMap;

/// Comparison operators for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Greater than (>)
    Gt,
    /// Greater than or equal (>=)
    Gte,
    /// Less than (<)
    Lt,
    /// Less than or equal (<=)
    Lte,
    /// Membership in a list of values
    In,
}

impl Operator {
    pub const ALL: [Self; 5] = [Self::Gt, Self::Gte, Self::Lt, Self::Lte, Self::In];

    /// Parse the bare query-string keyword (`gt`, `gte`, ...)
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.keyword() == keyword)
    }

    /// Parse the storage token (`$gt`, `$gte`, ...)
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.token() == token)
    }

    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::In => "in",
        }
    }

    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::Gt => "$gt",
            Self::Gte => "$gte",
            Self::Lt => "$lt",
            Self::Lte => "$lte",
            Self::In => "$in",
        }
    }
}

/// Rewrite operator keywords to storage tokens below the root of `params`.
///
/// Root keys are field names and pass through untouched, as do values.
#[must_use]
pub fn translate_operators(params: &QueryMap) -> QueryMap {
    params
        .iter()
        .map(|(field, value)| (field.clone(), translate_nested(value)))
        .collect()
}

fn translate_nested(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let translated: Map<String, Value> = map
                .iter()
                .map(|(key, child)| {
                    let key = Operator::from_keyword(key).map_or_else(|| key.clone(), |op| op.token().to_string());
                    (key, translate_nested(child))
                })
                .collect();
            Value::Object(translated)
        }
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> QueryMap {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_keyword_token_pairs() {
        for op in Operator::ALL {
            assert_eq!(Operator::from_keyword(op.keyword()), Some(op));
            assert_eq!(Operator::from_token(op.token()), Some(op));
            assert_eq!(op.token(), format!("${}", op.keyword()));
        }
        assert_eq!(Operator::from_keyword("neq"), None);
        assert_eq!(Operator::from_token("gt"), None);
    }

    #[test]
    fn test_translates_every_operator() {
        let translated = translate_operators(&map(json!({
            "tuition": {"gt": "5000", "lte": "10000"},
            "averageCost": {"gte": "1", "lt": "9"},
            "careers": {"in": "Business"},
        })));
        assert_eq!(
            Value::Object(translated),
            json!({
                "tuition": {"$gt": "5000", "$lte": "10000"},
                "averageCost": {"$gte": "1", "$lt": "9"},
                "careers": {"$in": "Business"},
            })
        );
    }

    #[test]
    fn test_root_field_named_like_operator_is_kept() {
        let translated = translate_operators(&map(json!({"gt": "1", "in": {"lt": "3"}})));
        assert_eq!(Value::Object(translated), json!({"gt": "1", "in": {"$lt": "3"}}));
    }

    #[test]
    fn test_fields_containing_operator_substrings_are_kept() {
        let translated = translate_operators(&map(json!({"location": {"interest": "x", "gtx": "y"}})));
        assert_eq!(Value::Object(translated), json!({"location": {"interest": "x", "gtx": "y"}}));
    }

    #[test]
    fn test_values_are_untouched() {
        let translated = translate_operators(&map(json!({"name": "gt", "tags": ["in", "lt"]})));
        assert_eq!(Value::Object(translated), json!({"name": "gt", "tags": ["in", "lt"]}));
    }
}
