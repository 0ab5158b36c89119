use serde::Serialize;
use utoipa::ToSchema;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 25;

/// Parse a positive integer, falling back to `default` when the value is
/// missing, non-numeric or below 1.
fn positive_or(value: Option<&str>, default: u64) -> u64 {
    value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|v| *v >= 1)
        .unwrap_or(default)
}

/// The page a client asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    /// Parse the raw `page` and `limit` query values.
    #[must_use]
    pub fn parse(page: Option<&str>, limit: Option<&str>, default_limit: u64) -> Self {
        Self {
            page: positive_or(page, DEFAULT_PAGE),
            limit: positive_or(limit, default_limit.max(1)),
        }
    }

    /// `(page - 1) * limit`: the number of documents to skip.
    #[must_use]
    pub fn start_index(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// `page * limit`: one past the last index on this page.
    #[must_use]
    pub fn end_index(&self) -> u64 {
        self.page.saturating_mul(self.limit)
    }
}

/// Link to a neighbouring page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PageRef {
    pub page: u64,
    pub limit: u64,
}

/// Pagination metadata returned with every page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub start_index: u64,
    pub end_index: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<PageRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<PageRef>,
}

impl Pagination {
    /// Compute the descriptor for `request` against `total` documents.
    ///
    /// `next` is present iff `endIndex < total`; `previous` iff `startIndex > 0`.
    #[must_use]
    pub fn compute(request: &PageRequest, total: u64) -> Self {
        let start_index = request.start_index();
        let end_index = request.end_index();

        Self {
            page: request.page,
            limit: request.limit,
            start_index,
            end_index,
            next: (end_index < total).then(|| PageRef {
                page: request.page + 1,
                limit: request.limit,
            }),
            previous: (start_index > 0).then(|| PageRef {
                page: request.page - 1,
                limit: request.limit,
            }),
        }
    }
}
