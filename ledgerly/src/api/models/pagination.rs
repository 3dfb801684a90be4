//! Shared pagination types for API query parameters.
//!
//! List endpoints use 1-indexed page-based pagination with `pageSize` and
//! `pageNumber` parameters. The page size is clamped to [1, 100], which also
//! forecloses the pages-count division by zero a literal `pageSize=0` would
//! cause. Asking for a page past the end yields an empty page, not an error.
//!
//! Pagination metadata travels both in the response body and JSON-encoded in
//! the `X-Pagination` response header.

use axum::http::{HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use utoipa::{IntoParams, ToSchema};

/// Default number of items to return per page.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum number of items that can be requested per page.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Lowest valid page number (pages are 1-indexed).
pub const MIN_PAGE_NUMBER: i64 = 1;

/// Response header carrying JSON-encoded [`PageMetadata`].
pub static X_PAGINATION: HeaderName = HeaderName::from_static("x-pagination");

/// Standard pagination query parameters.
#[serde_as]
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    /// Maximum number of items per page (default: 10, clamped to [1, 100])
    #[param(default = 10, minimum = 1, maximum = 100)]
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub page_size: Option<i64>,

    /// 1-indexed page number (default: 1)
    #[param(default = 1, minimum = 1)]
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub page_number: Option<i64>,
}

impl PageQuery {
    /// Get the page size, clamped between 1 and [`MAX_PAGE_SIZE`].
    #[inline]
    pub fn page_size(&self) -> i64 {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    /// Get the page number, clamped to at least [`MIN_PAGE_NUMBER`].
    #[inline]
    pub fn page_number(&self) -> i64 {
        self.page_number.unwrap_or(MIN_PAGE_NUMBER).max(MIN_PAGE_NUMBER)
    }

    /// Number of rows to skip before the requested page.
    #[inline]
    pub fn offset(&self) -> i64 {
        self.page_size() * (self.page_number() - 1)
    }
}

/// Pagination metadata computed from the filtered-but-unwindowed total count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub pages_count: i64,
    pub total_count: i64,
    pub current_page: i64,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl PageMetadata {
    pub fn new(total_count: i64, page_size: i64, current_page: i64) -> Self {
        // Ceiling division; page_size is clamped to >= 1 upstream.
        let pages_count = (total_count + page_size - 1) / page_size;

        Self {
            pages_count,
            total_count,
            current_page,
            has_next_page: current_page < pages_count,
            has_previous_page: current_page > MIN_PAGE_NUMBER,
        }
    }

    /// Render as a header value for `X-Pagination`.
    pub fn to_header_value(&self) -> HeaderValue {
        let json = serde_json::to_string(self).unwrap_or_default();
        HeaderValue::from_str(&json).unwrap_or_else(|_| HeaderValue::from_static("{}"))
    }
}

/// Generic paginated response wrapper for list endpoints.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedResponse<T: ToSchema> {
    /// The items for the current page
    pub data: Vec<T>,
    /// Metadata for the filtered query (also sent in `X-Pagination`)
    pub metadata: PageMetadata,
}

impl<T: ToSchema> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, metadata: PageMetadata) -> Self {
        Self { data, metadata }
    }
}
