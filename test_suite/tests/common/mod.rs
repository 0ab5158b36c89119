#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use devcamper::auth::{Authenticator, Principal, Role, TokenRegistry};
use devcamper::server::app;
use devcamper::store::document::Document;
use devcamper::{AppState, DocumentStore, MemoryStore, SqlStore};
use serde_json::{Value, json};
use tower::ServiceExt;

/// Stores every HTTP test runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Memory,
    Sqlite,
}

pub const BACKENDS: [Backend; 2] = [Backend::Memory, Backend::Sqlite];

pub struct TestApp {
    pub backend: Backend,
    pub router: Router,
    pub store: Arc<dyn DocumentStore>,
    pub tokens: Arc<TokenRegistry>,
}

pub async fn setup_test_app(backend: Backend) -> TestApp {
    let store: Arc<dyn DocumentStore> = match backend {
        Backend::Memory => Arc::new(MemoryStore::new()),
        Backend::Sqlite => Arc::new(
            SqlStore::connect("sqlite::memory:")
                .await
                .expect("Failed to setup test database"),
        ),
    };
    let tokens = Arc::new(TokenRegistry::new());
    let state = AppState::new(store.clone(), tokens.clone());

    TestApp {
        backend,
        router: app(state),
        store,
        tokens,
    }
}

pub fn document(value: Value) -> Document {
    value.as_object().cloned().expect("fixture must be a JSON object")
}

impl TestApp {
    /// Store a user document and return a bearer token for it.
    pub async fn login(&self, id: &str, role: Role) -> String {
        if self.store.find_by_id("users", id).await.unwrap().is_none() {
            let user = json!({
                "_id": id,
                "name": id,
                "email": format!("{id}@example.com"),
                "role": role.as_str(),
                "createdAt": "2024-01-01T00:00:00.000Z",
            });
            self.store.insert("users", document(user)).await.unwrap();
        }
        self.tokens.issue(Principal::new(id, role)).await
    }

    pub async fn seed(&self, collection: &str, documents: Vec<Value>) {
        for value in documents {
            self.store.insert(collection, document(value)).await.unwrap();
        }
    }

    pub async fn request(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None, None).await
    }

    pub async fn get_as(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, Some(token), None).await
    }
}

/// `_id`s of the documents in an envelope's `data`.
pub fn ids(body: &Value) -> Vec<String> {
    body["data"]
        .as_array()
        .expect("data must be a list")
        .iter()
        .map(|doc| doc["_id"].as_str().unwrap().to_string())
        .collect()
}

/// Five bootcamps created one day apart, `b1` oldest.
pub fn five_bootcamps() -> Vec<Value> {
    let states = ["MA", "VT", "MA", "NY", "CA"];
    let careers = [
        vec!["Web Development", "UI/UX"],
        vec!["Business"],
        vec!["Data Science", "Business"],
        vec!["Mobile Development"],
        vec!["Other"],
    ];
    (1..=5)
        .map(|i| {
            json!({
                "_id": format!("b{i}"),
                "name": format!("Bootcamp {i}"),
                "description": format!("Description {i}"),
                "email": format!("b{i}@example.com"),
                "phone": format!("555-000{i}"),
                "averageCost": i * 2000,
                "housing": i % 2 == 0,
                "careers": careers[i - 1],
                "location": {"state": states[i - 1], "zipcode": format!("0211{i}")},
                "user": format!("publisher{i}"),
                "createdAt": format!("2024-01-0{i}T00:00:00.000Z"),
            })
        })
        .collect()
}
