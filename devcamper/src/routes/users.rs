use axum::{
    Json, Router,
    extract::{Path, Request, State, rejection::JsonRejection},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use serde_json::{Value, json};

use super::{data, deleted, ensure_unique, load, validated};
use crate::auth::{CurrentUser, Principal, Role};
use crate::errors::ApiError;
use crate::filtering::Filter;
use crate::models::user::stored_role;
use crate::models::{USERS, UserCreate, UserUpdate};
use crate::results::{ListRoute, list_route};
use crate::state::AppState;
use crate::store::Document;
use crate::store::document::document_id;

const RESOURCE: &str = "User";

pub fn router(state: &AppState) -> Router<AppState> {
    let list = ListRoute::new(USERS).default_limit(state.default_limit);

    Router::new()
        .route("/users", list_route(state.store.clone(), list).post(create_user))
        .route("/users/{id}", get(get_user).put(update_user).delete(delete_user))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin))
}

/// Only admins get past this layer.
async fn require_admin(CurrentUser(user): CurrentUser, request: Request, next: Next) -> Result<Response, ApiError> {
    user.authorize(&[Role::Admin])?;
    Ok(next.run(request).await)
}

/// `GET /auth/me`: the caller's own user document.
pub async fn me(State(state): State<AppState>, CurrentUser(user): CurrentUser) -> Result<Json<Value>, ApiError> {
    let document = load(state.store.as_ref(), USERS, RESOURCE, &user.id).await?;
    Ok(data(document))
}

async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    Ok(data(load(state.store.as_ref(), USERS, RESOURCE, &id).await?))
}

/// Create a user and hand back a bearer token for it.
async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<UserCreate>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let payload = validated(payload)?;
    let store = state.store.as_ref();
    ensure_unique(store, USERS, Filter::all().eq("email", payload.email.trim().to_lowercase()), None).await?;

    let user = store.insert(USERS, payload.into_document()?).await?;
    let principal = principal_of(&user)?;
    let token = state.auth.issue(principal).await;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": user, "token": token })),
    ))
}

async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UserUpdate>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let payload = validated(payload)?;
    let store = state.store.as_ref();
    if let Some(email) = &payload.email {
        ensure_unique(store, USERS, Filter::all().eq("email", email.trim().to_lowercase()), Some(id.as_str())).await?;
    }

    let role_changed = payload.role.is_some();
    let updated = store
        .update(USERS, &id, payload.into_changes()?)
        .await?
        .ok_or_else(|| ApiError::not_found(RESOURCE, Some(id.clone())))?;
    if role_changed {
        state.auth.revoke_user(&id).await;
    }
    Ok(data(updated))
}

async fn delete_user(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    if !state.store.delete(USERS, &id).await? {
        return Err(ApiError::not_found(RESOURCE, Some(id)));
    }
    state.auth.revoke_user(&id).await;
    Ok(deleted())
}

fn principal_of(user: &Document) -> Result<Principal, ApiError> {
    match (document_id(user), stored_role(user)) {
        (Some(id), Some(role)) => Ok(Principal::new(id, role)),
        _ => Err(ApiError::internal(
            "Server Error",
            Some("user document without id or role".to_string()),
        )),
    }
}
