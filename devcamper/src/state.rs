use std::sync::Arc;

use crate::auth::Authenticator;
use crate::filtering::DEFAULT_LIMIT;
use crate::store::DocumentStore;

/// Shared handles every handler receives.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub auth: Arc<dyn Authenticator>,
    /// Page size of list routes when the request names none.
    pub default_limit: u64,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, auth: Arc<dyn Authenticator>) -> Self {
        Self {
            store,
            auth,
            default_limit: DEFAULT_LIMIT,
        }
    }

    #[must_use]
    pub fn with_default_limit(mut self, limit: u64) -> Self {
        self.default_limit = limit;
        self
    }
}
