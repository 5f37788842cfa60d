//! API response types.
//!
//! List endpoints use a page-number pagination envelope:
//! `{count, next, previous, results}`, where `next`/`previous` are the
//! request path with the `page` query parameter rewritten.

use axum::http::Uri;
use serde::Serialize;

/// Default page size for list endpoints.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Maximum client-adjustable page size.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Resolved pagination parameters.
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    pub page: u64,
    pub page_size: u64,
}

impl Pagination {
    /// Resolve raw `page`/`page_size` query values: page is 1-based,
    /// page size defaults to [`DEFAULT_PAGE_SIZE`] and is capped at
    /// [`MAX_PAGE_SIZE`].
    #[must_use]
    pub fn from_query(page: Option<u64>, page_size: Option<u64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Row offset of this page.
    #[must_use]
    pub const fn offset(self) -> u64 {
        (self.page - 1) * self.page_size
    }

    /// Row limit of this page.
    #[must_use]
    pub const fn limit(self) -> u64 {
        self.page_size
    }
}

/// Standard paginated response envelope.
#[derive(Debug, Serialize)]
pub struct Paginated<T: Serialize> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T: Serialize> Paginated<T> {
    /// Build the envelope for one page of results.
    pub fn new(count: u64, pagination: Pagination, uri: &Uri, results: Vec<T>) -> Self {
        let has_next = pagination.page * pagination.page_size < count;
        let has_previous = pagination.page > 1;

        Self {
            count,
            next: has_next.then(|| page_link(uri, pagination.page + 1)),
            previous: has_previous.then(|| page_link(uri, pagination.page - 1)),
            results,
        }
    }
}

/// Rewrite a request URI's `page` query parameter.
///
/// Page 1 drops the parameter entirely, so the first-page link is the bare
/// listing URL. All other query parameters pass through untouched.
fn page_link(uri: &Uri, page: u64) -> String {
    let mut params: Vec<String> = uri
        .query()
        .map(|query| {
            query
                .split('&')
                .filter(|pair| !pair.is_empty() && !pair.starts_with("page=") && *pair != "page")
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    if page > 1 {
        params.push(format!("page={page}"));
    }

    if params.is_empty() {
        uri.path().to_string()
    } else {
        format!("{}?{}", uri.path(), params.join("&"))
    }
}
