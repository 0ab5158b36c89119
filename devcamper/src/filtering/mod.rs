//! # Advanced Filtering
//!
//! Turns a list route's query string into a storage query. It handles
//! filtering, field selection, sorting, pagination and route-declared
//! population without per-route code.
//!
//! ## Main Components
//!
//! - **[`QueryParams`]**: bracket-notation query-string decoding
//! - **[`translate_operators`]**: `gt`/`gte`/`lt`/`lte`/`in` keywords to storage tokens
//! - **[`build_filter`]**: residual parameters to a [`Filter`] predicate
//! - **[`Projection`]**: the `select` parameter
//! - **[`parse_sort`]**: the `sort` parameter
//! - **[`PageRequest`]** / **[`Pagination`]**: the `page` and `limit` parameters
//! - **[`Populate`]**: relation descriptors fixed by the route
//!
//! ## Query Parameter Examples
//!
//! ```rust,ignore
//! // Equality, nested fields flatten to dotted paths
//! GET /bootcamps?housing=true&location[state]=MA
//!
//! // Comparisons
//! GET /bootcamps?averageCost[lte]=10000
//! GET /courses?tuition[gte]=5000&tuition[lt]=12000
//!
//! // Membership
//! GET /bootcamps?careers[in]=Business,UI/UX
//!
//! // Projection, ordering and paging
//! GET /bootcamps?select=name,description&sort=-averageCost,name&page=2&limit=10
//! ```
//!
//! `select`, `sort`, `page` and `limit` are control keys ([`CONTROL_KEYS`]) and
//! never become predicates.

pub mod conditions;
pub mod operators;
pub mod pagination;
pub mod populate;
pub mod query;
pub mod select;
pub mod sort;

pub use conditions::{CONTROL_KEYS, Comparison, FieldFilter, Filter, Predicate, build_filter, coerce_literal, residual_params};
pub use operators::{Operator, translate_operators};
pub use pagination::{DEFAULT_LIMIT, DEFAULT_PAGE, PageRef, PageRequest, Pagination};
pub use populate::Populate;
pub use query::{QueryMap, QueryParams};
pub use select::Projection;
pub use sort::{DEFAULT_SORT, SortKey, parse_sort};
