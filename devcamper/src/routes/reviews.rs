use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    routing::get,
};
use serde_json::Value;

use super::courses::bootcamp_summary;
use super::{by_bootcamp, created, data, deleted, ensure_unique, listing, load, reference, validated};
use crate::auth::{CurrentUser, Role};
use crate::errors::ApiError;
use crate::filtering::{Filter, populate};
use crate::models::{BOOTCAMP_FIELD, BOOTCAMPS, REVIEWS, ReviewCreate, ReviewUpdate, USER_FIELD};
use crate::results::{ListRoute, list_route};
use crate::state::AppState;
use crate::summary::refresh_average_rating;

const RESOURCE: &str = "Review";

pub fn router(state: &AppState) -> Router<AppState> {
    let list = ListRoute::new(REVIEWS)
        .populate(bootcamp_summary())
        .default_limit(state.default_limit);

    Router::new()
        .route("/reviews", list_route(state.store.clone(), list))
        .route(
            "/reviews/{id}",
            get(get_review).put(update_review).delete(delete_review),
        )
        .route("/bootcamps/{id}/reviews", get(bootcamp_reviews).post(create_review))
}

async fn bootcamp_reviews(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let reviews = by_bootcamp(state.store.as_ref(), REVIEWS, &id).await?;
    Ok(listing(reviews))
}

async fn get_review(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let store = state.store.as_ref();
    let review = load(store, REVIEWS, RESOURCE, &id).await?;
    let mut expanded = populate::expand(store, vec![review], &[bootcamp_summary()]).await?;
    let review = expanded
        .pop()
        .ok_or_else(|| ApiError::not_found(RESOURCE, Some(id)))?;
    Ok(data(review))
}

async fn create_review(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(bootcamp_id): Path<String>,
    payload: Result<Json<ReviewCreate>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    user.authorize(&[Role::User, Role::Admin])?;
    let store = state.store.as_ref();
    load(store, BOOTCAMPS, "Bootcamp", &bootcamp_id).await?;

    let payload = validated(payload)?;
    let one_per_user = Filter::all()
        .eq(BOOTCAMP_FIELD, bootcamp_id.as_str())
        .eq(USER_FIELD, user.id.as_str());
    ensure_unique(store, REVIEWS, one_per_user, None).await?;

    let review = store
        .insert(REVIEWS, payload.into_document(&bootcamp_id, &user.id)?)
        .await?;
    refresh_average_rating(store, &bootcamp_id).await?;
    Ok(created(review))
}

async fn update_review(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    payload: Result<Json<ReviewUpdate>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let store = state.store.as_ref();
    let review = load(store, REVIEWS, RESOURCE, &id).await?;
    user.ensure_owner(reference(&review, USER_FIELD), "update", "review")?;

    let payload = validated(payload)?;
    let updated = store
        .update(REVIEWS, &id, payload.into_changes()?)
        .await?
        .ok_or_else(|| ApiError::not_found(RESOURCE, Some(id.clone())))?;
    if let Some(bootcamp_id) = reference(&updated, BOOTCAMP_FIELD) {
        refresh_average_rating(store, bootcamp_id).await?;
    }
    Ok(data(updated))
}

async fn delete_review(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let store = state.store.as_ref();
    let review = load(store, REVIEWS, RESOURCE, &id).await?;
    user.ensure_owner(reference(&review, USER_FIELD), "delete", "review")?;

    store.delete(REVIEWS, &id).await?;
    if let Some(bootcamp_id) = reference(&review, BOOTCAMP_FIELD) {
        refresh_average_rating(store, bootcamp_id).await?;
    }
    Ok(deleted())
}
