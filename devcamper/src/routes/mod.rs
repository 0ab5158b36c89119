//! HTTP routes under `/api/v1`.
//!
//! Reads are public except for users; writes need a bearer token. List routes
//! go through the advanced-results middleware, single documents are returned as
//! `{success, data}` and deletes as `{success, data: {}}`.

pub mod bootcamps;
pub mod courses;
pub mod reviews;
pub mod users;

use axum::{
    Json, Router,
    extract::rejection::JsonRejection,
    http::StatusCode,
    routing::get,
};
use serde_json::{Value, json};

use crate::errors::ApiError;
use crate::filtering::Filter;
use crate::openapi;
use crate::state::AppState;
use crate::models::BOOTCAMP_FIELD;
use crate::store::document::document_id;
use crate::store::{Document, DocumentStore, FindQuery};
use crate::validation::Validatable;

pub const DUPLICATE_FIELD: &str = "Duplicate field value entered";

/// All resource routes, ready to be nested under `/api/v1`.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .merge(bootcamps::router(&state))
        .merge(courses::router(&state))
        .merge(reviews::router(&state))
        .merge(users::router(&state))
        .route("/auth/me", get(users::me))
        .route("/openapi.json", get(openapi::openapi_json))
        .with_state(state)
}

pub(crate) fn data(document: Document) -> Json<Value> {
    Json(json!({ "success": true, "data": document }))
}

pub(crate) fn created(document: Document) -> (StatusCode, Json<Value>) {
    (StatusCode::CREATED, data(document))
}

pub(crate) fn deleted() -> Json<Value> {
    Json(json!({ "success": true, "data": {} }))
}

/// `{success, count, data}` without pagination.
pub(crate) fn listing(documents: Vec<Document>) -> Json<Value> {
    Json(json!({ "success": true, "count": documents.len(), "data": documents }))
}

/// Decode and validate a JSON body.
pub(crate) fn validated<T: Validatable>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    let Json(body) = payload?;
    body.validate()?;
    Ok(body)
}

/// Fetch a document or fail with `<resource> not found with id of <id>`.
pub(crate) async fn load(
    store: &dyn DocumentStore,
    collection: &str,
    resource: &str,
    id: &str,
) -> Result<Document, ApiError> {
    store
        .find_by_id(collection, id)
        .await?
        .ok_or_else(|| ApiError::not_found(resource, Some(id.to_string())))
}

/// String value of a reference field such as `user` or `bootcamp`.
pub(crate) fn reference<'a>(document: &'a Document, field: &str) -> Option<&'a str> {
    document.get(field).and_then(Value::as_str)
}

/// Reject the write when another document already matches `filter`.
pub(crate) async fn ensure_unique(
    store: &dyn DocumentStore,
    collection: &str,
    filter: Filter,
    except_id: Option<&str>,
) -> Result<(), ApiError> {
    let existing = store.find(collection, &FindQuery::new(filter).limit(2)).await?;
    if existing.iter().any(|doc| document_id(doc) != except_id) {
        return Err(ApiError::bad_request(DUPLICATE_FIELD));
    }
    Ok(())
}

/// Documents of `collection` that belong to bootcamp `bootcamp_id`.
pub(crate) async fn by_bootcamp(
    store: &dyn DocumentStore,
    collection: &str,
    bootcamp_id: &str,
) -> Result<Vec<Document>, ApiError> {
    let filter = Filter::all().eq(BOOTCAMP_FIELD, bootcamp_id);
    Ok(store.find(collection, &FindQuery::new(filter)).await?)
}
