//! Route-declared relation population.
//!
//! Descriptors are fixed when a route is registered; nothing in a request can
//! add or change one.

use std::collections::HashMap;

use sea_orm::DbErr;
use serde_json::Value;

use super::conditions::Filter;
use super::select::Projection;
use crate::store::document::{Document, ID_FIELD, document_id, insert_path, lookup_path};
use crate::store::{DocumentStore, FindQuery};

/// How a related collection is inlined into each result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Populate {
    /// `path` holds the `_id` of a document in `collection`; it is replaced by
    /// that document, or `null` when the target no longer exists.
    Reference {
        path: String,
        collection: String,
        select: Projection,
    },
    /// Every document in `collection` whose `foreign_field` equals this
    /// document's `_id` is attached as a list under `path`.
    Virtual {
        path: String,
        collection: String,
        foreign_field: String,
        select: Projection,
    },
}

impl Populate {
    #[must_use]
    pub fn reference(path: impl Into<String>, collection: impl Into<String>) -> Self {
        Self::Reference {
            path: path.into(),
            collection: collection.into(),
            select: Projection::All,
        }
    }

    #[must_use]
    pub fn virtual_list(
        path: impl Into<String>,
        collection: impl Into<String>,
        foreign_field: impl Into<String>,
    ) -> Self {
        Self::Virtual {
            path: path.into(),
            collection: collection.into(),
            foreign_field: foreign_field.into(),
            select: Projection::All,
        }
    }

    /// Restrict the populated documents to `projection`.
    #[must_use]
    pub fn select(mut self, projection: Projection) -> Self {
        match &mut self {
            Self::Reference { select, .. } | Self::Virtual { select, .. } => *select = projection,
        }
        self
    }

    /// Field the populated value is written to.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Reference { path, .. } | Self::Virtual { path, .. } => path,
        }
    }
}

/// Resolve every descriptor against `documents`, one batched lookup per descriptor.
///
/// # Errors
/// Propagates storage errors from the lookups.
pub async fn expand(
    store: &dyn DocumentStore,
    mut documents: Vec<Document>,
    descriptors: &[Populate],
) -> Result<Vec<Document>, DbErr> {
    for descriptor in descriptors {
        match descriptor {
            Populate::Reference {
                path,
                collection,
                select,
            } => populate_reference(store, &mut documents, path, collection, select).await?,
            Populate::Virtual {
                path,
                collection,
                foreign_field,
                select,
            } => populate_virtual(store, &mut documents, path, collection, foreign_field, select).await?,
        }
    }
    Ok(documents)
}

fn unique_values(values: impl Iterator<Item = String>) -> Vec<Value> {
    let mut seen = Vec::<String>::new();
    for value in values {
        if !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen.into_iter().map(Value::String).collect()
}

async fn populate_reference(
    store: &dyn DocumentStore,
    documents: &mut [Document],
    path: &str,
    collection: &str,
    select: &Projection,
) -> Result<(), DbErr> {
    let ids = unique_values(
        documents
            .iter()
            .filter_map(|doc| lookup_path(doc, path).and_then(Value::as_str).map(str::to_string)),
    );
    if ids.is_empty() {
        return Ok(());
    }

    let targets: HashMap<String, Document> = store
        .find(collection, &FindQuery::new(Filter::all().is_in(ID_FIELD, ids)))
        .await?
        .into_iter()
        .filter_map(|target| Some((document_id(&target)?.to_string(), target)))
        .collect();
    tracing::debug!(collection, path, resolved = targets.len(), "Populated references");

    for document in documents.iter_mut() {
        let Some(id) = lookup_path(document, path).and_then(Value::as_str) else {
            continue;
        };
        let replacement = targets
            .get(id)
            .map_or(Value::Null, |target| Value::Object(select.apply(target.clone())));
        insert_path(document, path, replacement);
    }
    Ok(())
}

async fn populate_virtual(
    store: &dyn DocumentStore,
    documents: &mut [Document],
    path: &str,
    collection: &str,
    foreign_field: &str,
    select: &Projection,
) -> Result<(), DbErr> {
    let ids = unique_values(documents.iter().filter_map(|doc| document_id(doc).map(str::to_string)));
    if ids.is_empty() {
        return Ok(());
    }

    let mut grouped: HashMap<String, Vec<Value>> = HashMap::new();
    let related = store
        .find(collection, &FindQuery::new(Filter::all().is_in(foreign_field, ids)))
        .await?;
    for item in related {
        let Some(owner) = lookup_path(&item, foreign_field).and_then(Value::as_str) else {
            continue;
        };
        let owner = owner.to_string();
        grouped
            .entry(owner)
            .or_default()
            .push(Value::Object(select.apply(item)));
    }
    tracing::debug!(collection, path, owners = grouped.len(), "Populated virtual lists");

    for document in documents.iter_mut() {
        let Some(id) = document_id(document).map(str::to_string) else {
            continue;
        };
        let items = grouped.remove(&id).unwrap_or_default();
        insert_path(document, path, Value::Array(items));
    }
    Ok(())
}
