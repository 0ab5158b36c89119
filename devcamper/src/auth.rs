//! Bearer-token authentication and role checks.
//!
//! Token verification sits behind [`Authenticator`]; the crate ships the
//! in-memory [`TokenRegistry`], which hands out opaque tokens for known users.
//! Handlers receive the caller through the [`CurrentUser`] extractor.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use utoipa::ToSchema;

use crate::errors::ApiError;
use crate::state::AppState;

pub const NOT_AUTHORIZED: &str = "Not authorized to access this route";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Publisher,
    Admin,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Publisher => "publisher",
            Self::Admin => "admin",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        [Self::User, Self::Publisher, Self::Admin]
            .into_iter()
            .find(|role| role.as_str() == value)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// `_id` of the caller's user document.
    pub id: String,
    pub role: Role,
}

impl Principal {
    #[must_use]
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self { id: id.into(), role }
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Require one of `roles`.
    ///
    /// # Errors
    /// 403 naming the caller's role.
    pub fn authorize(&self, roles: &[Role]) -> Result<(), ApiError> {
        if roles.contains(&self.role) {
            Ok(())
        } else {
            Err(ApiError::forbidden(format!(
                "User role {} is not authorized to access this route",
                self.role
            )))
        }
    }

    /// Require that the caller owns a resource (`owner` is its `user` field) or is an admin.
    ///
    /// # Errors
    /// 403 naming the caller and the attempted action.
    pub fn ensure_owner(&self, owner: Option<&str>, action: &str, resource: &str) -> Result<(), ApiError> {
        if self.is_admin() || owner == Some(self.id.as_str()) {
            Ok(())
        } else {
            Err(ApiError::forbidden(format!(
                "User {} is not authorized to {action} this {resource}",
                self.id
            )))
        }
    }
}

/// Bearer token verification and issuance.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// The principal a token belongs to, if it is known.
    async fn authenticate(&self, token: &str) -> Option<Principal>;

    /// Issue a fresh token for `principal`.
    async fn issue(&self, principal: Principal) -> String;

    /// Invalidate every token of the user `user_id`.
    async fn revoke_user(&self, user_id: &str);
}

/// In-memory token table.
#[derive(Debug, Default)]
pub struct TokenRegistry {
    tokens: RwLock<HashMap<String, Principal>>,
}

impl TokenRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a caller-chosen token, replacing any previous holder.
    pub async fn register(&self, token: impl Into<String>, principal: Principal) {
        self.tokens.write().await.insert(token.into(), principal);
    }

    pub async fn revoke(&self, token: &str) -> bool {
        self.tokens.write().await.remove(token).is_some()
    }
}

#[async_trait]
impl Authenticator for TokenRegistry {
    async fn authenticate(&self, token: &str) -> Option<Principal> {
        self.tokens.read().await.get(token).cloned()
    }

    async fn issue(&self, principal: Principal) -> String {
        let token = uuid::Uuid::new_v4().to_string();
        tracing::debug!(user = %principal.id, role = %principal.role, "Issued token");
        self.register(token.clone(), principal).await;
        token
    }

    async fn revoke_user(&self, user_id: &str) {
        self.tokens.write().await.retain(|_, principal| principal.id != user_id);
    }
}

/// Extractor for routes that need a signed-in caller.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Principal);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ApiError::unauthorized(NOT_AUTHORIZED))?;

        state
            .auth
            .authenticate(token)
            .await
            .map(CurrentUser)
            .ok_or_else(|| ApiError::unauthorized(NOT_AUTHORIZED))
    }
}
