use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    routing::get,
};
use serde_json::Value;

use super::{created, data, deleted, ensure_unique, load, reference, validated};
use crate::auth::{CurrentUser, Role};
use crate::errors::ApiError;
use crate::filtering::{Filter, Populate};
use crate::models::{BOOTCAMP_FIELD, BOOTCAMPS, BootcampCreate, BootcampUpdate, COURSES, REVIEWS, USER_FIELD};
use crate::results::{ListRoute, list_route};
use crate::state::AppState;
use crate::store::find_one;

const RESOURCE: &str = "Bootcamp";

pub fn router(state: &AppState) -> Router<AppState> {
    let list = ListRoute::new(BOOTCAMPS)
        .populate(Populate::virtual_list("courses", COURSES, BOOTCAMP_FIELD))
        .default_limit(state.default_limit);

    Router::new()
        .route("/bootcamps", list_route(state.store.clone(), list).post(create_bootcamp))
        .route(
            "/bootcamps/{id}",
            get(get_bootcamp).put(update_bootcamp).delete(delete_bootcamp),
        )
}

async fn get_bootcamp(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let bootcamp = load(state.store.as_ref(), BOOTCAMPS, RESOURCE, &id).await?;
    Ok(data(bootcamp))
}

async fn create_bootcamp(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<BootcampCreate>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    user.authorize(&[Role::Publisher, Role::Admin])?;
    let payload = validated(payload)?;
    let store = state.store.as_ref();

    if !user.is_admin() && find_one(store, BOOTCAMPS, Filter::all().eq(USER_FIELD, user.id.as_str())).await?.is_some() {
        return Err(ApiError::bad_request(format!(
            "The user with ID {} has already published a bootcamp",
            user.id
        )));
    }
    ensure_unique(store, BOOTCAMPS, Filter::all().eq("name", payload.name.trim()), None).await?;

    let bootcamp = store.insert(BOOTCAMPS, payload.into_document(&user.id)?).await?;
    tracing::info!(user = %user.id, name = ?bootcamp.get("name"), "Bootcamp created");
    Ok(created(bootcamp))
}

async fn update_bootcamp(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    payload: Result<Json<BootcampUpdate>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let store = state.store.as_ref();
    let bootcamp = load(store, BOOTCAMPS, RESOURCE, &id).await?;
    user.ensure_owner(reference(&bootcamp, USER_FIELD), "update", "bootcamp")?;

    let payload = validated(payload)?;
    if let Some(name) = &payload.name {
        ensure_unique(store, BOOTCAMPS, Filter::all().eq("name", name.trim()), Some(id.as_str())).await?;
    }

    let updated = store
        .update(BOOTCAMPS, &id, payload.into_changes()?)
        .await?
        .ok_or_else(|| ApiError::not_found(RESOURCE, Some(id.clone())))?;
    Ok(data(updated))
}

async fn delete_bootcamp(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let store = state.store.as_ref();
    let bootcamp = load(store, BOOTCAMPS, RESOURCE, &id).await?;
    user.ensure_owner(reference(&bootcamp, USER_FIELD), "delete", "bootcamp")?;

    if !store.delete(BOOTCAMPS, &id).await? {
        return Err(ApiError::not_found(RESOURCE, Some(id)));
    }
    let owned_by = Filter::all().eq(BOOTCAMP_FIELD, id.as_str());
    let (courses, reviews) = tokio::try_join!(
        store.delete_many(COURSES, &owned_by),
        store.delete_many(REVIEWS, &owned_by),
    )?;
    tracing::info!(bootcamp = %id, courses, reviews, "Bootcamp deleted with its courses and reviews");
    Ok(deleted())
}
