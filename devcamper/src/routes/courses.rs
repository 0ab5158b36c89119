use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    routing::get,
};
use serde_json::Value;

use super::{by_bootcamp, created, data, deleted, listing, load, reference, validated};
use crate::auth::{CurrentUser, Role};
use crate::errors::ApiError;
use crate::filtering::{Populate, Projection, populate};
use crate::models::{BOOTCAMP_FIELD, BOOTCAMPS, COURSES, CourseCreate, CourseUpdate, USER_FIELD};
use crate::results::{ListRoute, list_route};
use crate::state::AppState;
use crate::summary::refresh_average_cost;

const RESOURCE: &str = "Course";

/// A course's `bootcamp` expanded to `{_id, name, description}`.
pub(crate) fn bootcamp_summary() -> Populate {
    Populate::reference(BOOTCAMP_FIELD, BOOTCAMPS).select(Projection::fields(["name", "description"]))
}

pub fn router(state: &AppState) -> Router<AppState> {
    let list = ListRoute::new(COURSES)
        .populate(bootcamp_summary())
        .default_limit(state.default_limit);

    Router::new()
        .route("/courses", list_route(state.store.clone(), list))
        .route(
            "/courses/{id}",
            get(get_course).put(update_course).delete(delete_course),
        )
        .route("/bootcamps/{id}/courses", get(bootcamp_courses).post(create_course))
}

async fn bootcamp_courses(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let courses = by_bootcamp(state.store.as_ref(), COURSES, &id).await?;
    Ok(listing(courses))
}

async fn get_course(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let store = state.store.as_ref();
    let course = load(store, COURSES, RESOURCE, &id).await?;
    let mut expanded = populate::expand(store, vec![course], &[bootcamp_summary()]).await?;
    let course = expanded
        .pop()
        .ok_or_else(|| ApiError::not_found(RESOURCE, Some(id)))?;
    Ok(data(course))
}

async fn create_course(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(bootcamp_id): Path<String>,
    payload: Result<Json<CourseCreate>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    user.authorize(&[Role::Publisher, Role::Admin])?;
    let store = state.store.as_ref();
    let bootcamp = load(store, BOOTCAMPS, "Bootcamp", &bootcamp_id).await?;
    user.ensure_owner(reference(&bootcamp, USER_FIELD), "add a course to", "bootcamp")?;

    let payload = validated(payload)?;
    let course = store
        .insert(COURSES, payload.into_document(&bootcamp_id, &user.id)?)
        .await?;
    refresh_average_cost(store, &bootcamp_id).await?;
    Ok(created(course))
}

async fn update_course(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    payload: Result<Json<CourseUpdate>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let store = state.store.as_ref();
    let course = load(store, COURSES, RESOURCE, &id).await?;
    user.ensure_owner(reference(&course, USER_FIELD), "update", "course")?;

    let payload = validated(payload)?;
    let refresh = payload.touches_tuition();
    let updated = store
        .update(COURSES, &id, payload.into_changes()?)
        .await?
        .ok_or_else(|| ApiError::not_found(RESOURCE, Some(id.clone())))?;
    if refresh && let Some(bootcamp_id) = reference(&updated, BOOTCAMP_FIELD) {
        refresh_average_cost(store, bootcamp_id).await?;
    }
    Ok(data(updated))
}

async fn delete_course(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let store = state.store.as_ref();
    let course = load(store, COURSES, RESOURCE, &id).await?;
    user.ensure_owner(reference(&course, USER_FIELD), "delete", "course")?;

    store.delete(COURSES, &id).await?;
    if let Some(bootcamp_id) = reference(&course, BOOTCAMP_FIELD) {
        refresh_average_cost(store, bootcamp_id).await?;
    }
    Ok(deleted())
}
