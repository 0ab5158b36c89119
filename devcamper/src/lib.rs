//! # devcamper
//!
//! REST backend for a directory of coding bootcamps. Publishers list bootcamps
//! and courses, users review bootcamps, admins manage users.
//!
//! Every list route runs the same pipeline ([`results::advanced_results`]):
//!
//! 1. decode the bracket-notation query string
//! 2. translate `gt`/`gte`/`lt`/`lte`/`in` into comparison operators
//! 3. build the filter from everything but `select`, `sort`, `page` and `limit`
//! 4. apply projection, sort and the `page`/`limit` window
//! 5. populate the relations the route declares
//! 6. return `{success, count, pagination, data}`
//!
//! ```text
//! GET /api/v1/bootcamps?averageCost[lte]=10000&select=name,averageCost&sort=-averageCost&page=2&limit=5
//! ```
//!
//! Storage is pluggable through [`store::DocumentStore`]: an in-memory store
//! and a sea-orm (SQLite) store ship with the crate.

pub mod auth;
pub mod config;
pub mod errors;
pub mod filtering;
pub mod models;
pub mod openapi;
pub mod results;
pub mod routes;
pub mod server;
pub mod state;
pub mod store;
pub mod summary;
pub mod validation;

pub use errors::ApiError;
pub use results::{AdvancedResults, ListRoute, advanced_results};
pub use state::AppState;
pub use store::{DocumentStore, FindQuery, MemoryStore, SqlStore};
