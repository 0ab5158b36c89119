use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::{DbErr, Order};
use serde_json::Value;
use tokio::sync::RwLock;

use super::document::{Document, ID_FIELD, document_id, lookup_path, merge_changes};
use super::{DocumentStore, FindQuery, new_id};
use crate::filtering::{Comparison, Filter, Operator, Predicate, SortKey};

/// Process-local store. Collections are created on first insert.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(&self, collection: &str, query: &FindQuery) -> Result<Vec<Document>, DbErr> {
        let collections = self.collections.read().await;
        let Some(documents) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut matched: Vec<&Document> = documents.iter().filter(|doc| matches(doc, &query.filter)).collect();
        if !query.sort.is_empty() {
            matched.sort_by(|a, b| compare_documents(a, b, &query.sort));
        }

        let skip = usize::try_from(query.skip).unwrap_or(usize::MAX);
        let limit = query
            .limit
            .map_or(usize::MAX, |limit| usize::try_from(limit).unwrap_or(usize::MAX));

        Ok(matched
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|doc| query.projection.apply(doc.clone()))
            .collect())
    }

    async fn count_documents(&self, collection: &str) -> Result<u64, DbErr> {
        let collections = self.collections.read().await;
        Ok(collections.get(collection).map_or(0, |docs| docs.len() as u64))
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>, DbErr> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| document_id(doc) == Some(id)))
            .cloned())
    }

    async fn insert(&self, collection: &str, mut document: Document) -> Result<Document, DbErr> {
        let id = match document_id(&document) {
            Some(id) => id.to_string(),
            None => {
                let id = new_id();
                document.insert(ID_FIELD.to_string(), Value::String(id.clone()));
                id
            }
        };

        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection.to_string()).or_default();
        if documents.iter().any(|doc| document_id(doc) == Some(id.as_str())) {
            return Err(DbErr::Custom(format!("duplicate _id `{id}` in {collection}")));
        }
        documents.push(document.clone());
        Ok(document)
    }

    async fn update(&self, collection: &str, id: &str, changes: Document) -> Result<Option<Document>, DbErr> {
        let mut collections = self.collections.write().await;
        let Some(document) = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|doc| document_id(doc) == Some(id)))
        else {
            return Ok(None);
        };
        merge_changes(document, changes);
        Ok(Some(document.clone()))
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, DbErr> {
        let mut collections = self.collections.write().await;
        let Some(documents) = collections.get_mut(collection) else {
            return Ok(false);
        };
        let before = documents.len();
        documents.retain(|doc| document_id(doc) != Some(id));
        Ok(documents.len() < before)
    }

    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64, DbErr> {
        let mut collections = self.collections.write().await;
        let Some(documents) = collections.get_mut(collection) else {
            return Ok(0);
        };
        let before = documents.len();
        documents.retain(|doc| !matches(doc, filter));
        Ok((before - documents.len()) as u64)
    }
}

/// Whether `document` satisfies every field predicate.
fn matches(document: &Document, filter: &Filter) -> bool {
    filter.fields().iter().all(|field_filter| {
        let value = lookup_path(document, &field_filter.field);
        match &field_filter.predicate {
            Predicate::Equals(Value::Null) => value.is_none_or(Value::is_null),
            Predicate::Equals(expected) => {
                value.is_some_and(|actual| candidates(actual).any(|item| loosely_equal(item, expected)))
            }
            Predicate::Compare(comparisons) => value.is_some_and(|actual| {
                comparisons
                    .iter()
                    .all(|comparison| candidates(actual).any(|item| satisfies(item, comparison)))
            }),
        }
    })
}

/// Array fields are matched element-wise.
fn candidates(value: &Value) -> Box<dyn Iterator<Item = &Value> + '_> {
    match value {
        Value::Array(items) => Box::new(items.iter()),
        other => Box::new(std::iter::once(other)),
    }
}

fn loosely_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => left == right,
    }
}

fn satisfies(item: &Value, comparison: &Comparison) -> bool {
    let Comparison { op, value } = comparison;
    match op {
        Operator::In => value
            .as_array()
            .is_some_and(|list| list.iter().any(|allowed| loosely_equal(item, allowed))),
        Operator::Gt => same_type_ordering(item, value) == Some(Ordering::Greater),
        Operator::Gte => matches!(same_type_ordering(item, value), Some(Ordering::Greater | Ordering::Equal)),
        Operator::Lt => same_type_ordering(item, value) == Some(Ordering::Less),
        Operator::Lte => matches!(same_type_ordering(item, value), Some(Ordering::Less | Ordering::Equal)),
    }
}

/// Ordering between two values of the same JSON type; comparisons across
/// types never match.
fn same_type_ordering(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Sort rank: missing and null first, then numbers and booleans, then text,
/// then objects and arrays.
fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Number(_) | Value::Bool(_)) => 1,
        Some(Value::String(_)) => 2,
        Some(Value::Object(_) | Value::Array(_)) => 3,
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(f64::from(u8::from(*b))),
        _ => None,
    }
}

fn compare_values(left: Option<&Value>, right: Option<&Value>) -> Ordering {
    let rank = type_rank(left).cmp(&type_rank(right));
    if rank != Ordering::Equal {
        return rank;
    }
    match (left, right) {
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(a), Some(b)) => match (numeric(a), numeric(b)) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => a.to_string().cmp(&b.to_string()),
        },
        _ => Ordering::Equal,
    }
}

fn compare_documents(left: &Document, right: &Document, keys: &[SortKey]) -> Ordering {
    for key in keys {
        let ordering = compare_values(lookup_path(left, &key.field), lookup_path(right, &key.field));
        let ordering = match key.direction {
            Order::Desc => ordering.reverse(),
            _ => ordering,
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}
