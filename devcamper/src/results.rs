//! The advanced-results pipeline behind every list route.
//!
//! Query parameters flow through operator translation, filter building,
//! projection and sort resolution, pagination and route-declared population.
//! The resulting [`AdvancedResults`] envelope is stored in the request
//! extensions by [`advanced_results_middleware`] and serialized verbatim by
//! [`send_advanced_results`].
//!
//! ```rust,ignore
//! let courses = ListRoute::new("courses").populate(
//!     Populate::reference("bootcamp", "bootcamps").select(Projection::fields(["name", "description"])),
//! );
//! let router = Router::new().route("/courses", list_route(store.clone(), courses.default_limit(25)));
//! ```

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Request, State},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{MethodRouter, get},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::errors::ApiError;
use crate::filtering::{
    DEFAULT_LIMIT, PageRequest, Pagination, Populate, Projection, QueryParams, build_filter, parse_sort,
};
use crate::store::{Document, DocumentStore, FindQuery, execute};

/// `{success, count, pagination, data}` for one page of one collection.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AdvancedResults {
    pub success: bool,
    /// Number of documents on this page.
    pub count: usize,
    pub pagination: Pagination,
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<Document>,
}

/// Collection and population fixed when a list route is registered.
#[derive(Debug, Clone)]
pub struct ListRoute {
    pub collection: &'static str,
    pub populate: Vec<Populate>,
    pub default_limit: u64,
}

impl ListRoute {
    #[must_use]
    pub fn new(collection: &'static str) -> Self {
        Self {
            collection,
            populate: Vec::new(),
            default_limit: DEFAULT_LIMIT,
        }
    }

    #[must_use]
    pub fn populate(mut self, descriptor: Populate) -> Self {
        self.populate.push(descriptor);
        self
    }

    #[must_use]
    pub fn default_limit(mut self, limit: u64) -> Self {
        self.default_limit = limit;
        self
    }
}

/// Run the pipeline for one request.
///
/// The total used for `next`/`previous` is the size of the whole collection,
/// not of the filtered result.
///
/// # Errors
/// Returns a 400 for query strings that do not form a valid query and a 500
/// for storage failures.
pub async fn advanced_results(
    store: &dyn DocumentStore,
    route: &ListRoute,
    params: &QueryParams,
) -> Result<AdvancedResults, ApiError> {
    let filter = build_filter(params)?;
    let projection = Projection::parse(params.text("select")?.as_deref())?;
    let sort = parse_sort(params.text("sort")?.as_deref())?;
    let page = PageRequest::parse(
        params.text("page")?.as_deref(),
        params.text("limit")?.as_deref(),
        route.default_limit,
    );

    let mut query = FindQuery::new(filter)
        .select(projection)
        .sort(sort)
        .skip(page.start_index())
        .limit(page.limit);
    query.populate.clone_from(&route.populate);

    let (total, data) = tokio::try_join!(
        store.count_documents(route.collection),
        execute(store, route.collection, &query),
    )?;

    tracing::debug!(
        collection = route.collection,
        page = page.page,
        limit = page.limit,
        total,
        returned = data.len(),
        "Advanced results"
    );

    Ok(AdvancedResults {
        success: true,
        count: data.len(),
        pagination: Pagination::compute(&page, total),
        data,
    })
}

/// Shared state of one list route's middleware.
#[derive(Clone)]
pub struct ResultsContext {
    pub store: Arc<dyn DocumentStore>,
    pub route: Arc<ListRoute>,
}

/// Build the envelope and hand it to the next handler through the request
/// extensions.
pub async fn advanced_results_middleware(
    State(ctx): State<ResultsContext>,
    params: QueryParams,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let results = advanced_results(ctx.store.as_ref(), &ctx.route, &params).await?;
    request.extensions_mut().insert(results);
    Ok(next.run(request).await)
}

/// Terminal handler: serialize the envelope left by the middleware.
pub async fn send_advanced_results(Extension(results): Extension<AdvancedResults>) -> impl IntoResponse {
    Json(results)
}

/// `GET` handler for a list route wrapped in the results middleware.
pub fn list_route<S>(store: Arc<dyn DocumentStore>, route: ListRoute) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    let ctx = ResultsContext {
        store,
        route: Arc::new(route),
    };
    get(send_advanced_results).layer(middleware::from_fn_with_state(ctx, advanced_results_middleware))
}
