use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
};
use sea_orm::DbErr;
use serde_json::Value;
use tokio::{net::TcpListener, signal};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::auth::{Principal, Role, TokenRegistry};
use crate::config::Config;
use crate::models::{USERS, timestamp};
use crate::routes::api_router;
use crate::state::AppState;
use crate::store::{Document, DocumentStore, MemoryStore, SqlStore};

pub const API_PREFIX: &str = "/api/v1";

/// The full application: resource routes under `/api/v1` with tracing and CORS.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .nest(API_PREFIX, api_router(state))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Open the store named by the configuration.
///
/// # Errors
/// Returns the connection error of a database store.
pub async fn open_store(config: &Config) -> Result<Arc<dyn DocumentStore>, DbErr> {
    if config.uses_memory_store() {
        info!("Using in-memory store");
        return Ok(Arc::new(MemoryStore::new()));
    }
    info!(url = %config.database_url, "Connecting to database");
    Ok(Arc::new(SqlStore::connect(&config.database_url).await?))
}

/// Store, token registry and the optional seeded admin for `config`.
///
/// # Errors
/// Returns storage errors from connecting or seeding.
pub async fn build_state(config: &Config) -> Result<AppState, DbErr> {
    let store = open_store(config).await?;
    let tokens = Arc::new(TokenRegistry::new());

    if let Some(token) = &config.admin_token {
        let admin_id = "admin";
        if store.find_by_id(USERS, admin_id).await?.is_none() {
            let admin: Document = [
                ("_id", admin_id),
                ("name", "Admin"),
                ("email", "admin@devcamper.io"),
                ("role", Role::Admin.as_str()),
            ]
            .into_iter()
            .map(|(key, value)| (key.to_string(), Value::from(value)))
            .chain([("createdAt".to_string(), Value::String(timestamp()))])
            .collect();
            store.insert(USERS, admin).await?;
        }
        tokens.register(token.clone(), Principal::new(admin_id, Role::Admin)).await;
        info!("Admin token registered");
    }

    Ok(AppState::new(store, tokens).with_default_limit(config.default_page_limit))
}

/// Bind and serve until Ctrl+C or SIGTERM.
///
/// # Errors
/// Returns binding and serving I/O errors.
pub async fn serve(config: &Config, state: AppState) -> std::io::Result<()> {
    let address = format!("0.0.0.0:{}", config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
