//! Document storage behind the [`DocumentStore`] trait.
//!
//! Two implementations ship with the crate: [`MemoryStore`] keeps collections in
//! process memory, [`SqlStore`] persists them through sea-orm. Handlers and the
//! advanced-results pipeline only ever see `Arc<dyn DocumentStore>`.

pub mod document;
pub mod memory;
pub mod sql;

use async_trait::async_trait;
use sea_orm::DbErr;

use crate::filtering::{Filter, Populate, Projection, SortKey, populate};
pub use document::Document;
pub use memory::MemoryStore;
pub use sql::SqlStore;

/// A chainable find: predicate, projection, ordering, window and population.
#[derive(Debug, Clone, Default)]
pub struct FindQuery {
    pub filter: Filter,
    pub projection: Projection,
    pub sort: Vec<SortKey>,
    pub skip: u64,
    pub limit: Option<u64>,
    pub populate: Vec<Populate>,
}

impl FindQuery {
    #[must_use]
    pub fn new(filter: Filter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn select(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    #[must_use]
    pub fn sort(mut self, keys: Vec<SortKey>) -> Self {
        self.sort = keys;
        self
    }

    #[must_use]
    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = skip;
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn populate(mut self, descriptor: Populate) -> Self {
        self.populate.push(descriptor);
        self
    }
}

/// Storage engine client.
///
/// `find` applies filter, sort, skip, limit and projection, in that order.
/// Population is layered on top by [`execute`], so implementations never need
/// to know about relations.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find(&self, collection: &str, query: &FindQuery) -> Result<Vec<Document>, DbErr>;

    /// Size of the whole collection, ignoring any filter.
    async fn count_documents(&self, collection: &str) -> Result<u64, DbErr>;

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>, DbErr>;

    /// Store a new document, assigning a fresh `_id` when it has none.
    async fn insert(&self, collection: &str, document: Document) -> Result<Document, DbErr>;

    /// Merge `changes` into a stored document and return the new version.
    async fn update(&self, collection: &str, id: &str, changes: Document) -> Result<Option<Document>, DbErr>;

    /// Returns whether a document was removed.
    async fn delete(&self, collection: &str, id: &str) -> Result<bool, DbErr>;

    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64, DbErr>;
}

/// Run a find and then resolve the query's population descriptors.
///
/// Descriptors whose path the projection drops are skipped.
///
/// # Errors
/// Propagates storage errors from the find and from every population lookup.
pub async fn execute(store: &dyn DocumentStore, collection: &str, query: &FindQuery) -> Result<Vec<Document>, DbErr> {
    let documents = store.find(collection, query).await?;
    let populate: Vec<Populate> = query
        .populate
        .iter()
        .filter(|descriptor| query.projection.keeps(descriptor.path()))
        .cloned()
        .collect();
    populate::expand(store, documents, &populate).await
}

/// First document matching `filter`.
///
/// # Errors
/// Propagates storage errors.
pub async fn find_one(store: &dyn DocumentStore, collection: &str, filter: Filter) -> Result<Option<Document>, DbErr> {
    let mut found = store.find(collection, &FindQuery::new(filter).limit(1)).await?;
    Ok(found.pop())
}

/// Fresh document identifier.
pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
