//! Pagination and sorting contracts.
//!
//! Every list-returning repository operation accepts a [`PageRequest`]
//! and returns a [`Page`], whose `total` always reflects the full
//! filtered count, never the length of the current page.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default page number (1-indexed)
const DEFAULT_PAGE: u32 = 1;

/// Default items per page
const DEFAULT_LIMIT: u32 = 20;

/// Maximum items per page
const MAX_LIMIT: u32 = 100;

/// Rejected pagination input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaginationError {
    /// Pages are 1-indexed
    #[error("Page number must be at least 1")]
    PageOutOfRange,

    /// A page must hold at least one item
    #[error("Limit must be at least 1")]
    LimitOutOfRange,

    /// Upper bound to protect the store
    #[error("Limit cannot exceed {MAX_LIMIT}")]
    LimitTooLarge,
}

/// Pagination parameters: `page ≥ 1`, `limit > 0`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    pub page: u32,

    /// Items per page
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    DEFAULT_PAGE
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Create pagination parameters, clamping out-of-range input to the
    /// defaults rather than failing. Use [`PageRequest::validate`] when
    /// rejection is wanted instead.
    pub fn new(page: u32, limit: u32) -> Self {
        let page = if page == 0 { DEFAULT_PAGE } else { page };
        let limit = if limit == 0 {
            DEFAULT_LIMIT
        } else {
            limit.min(MAX_LIMIT)
        };
        Self { page, limit }
    }

    /// Check the contract without clamping.
    pub fn validate(&self) -> Result<(), PaginationError> {
        if self.page == 0 {
            return Err(PaginationError::PageOutOfRange);
        }
        if self.limit == 0 {
            return Err(PaginationError::LimitOutOfRange);
        }
        if self.limit > MAX_LIMIT {
            return Err(PaginationError::LimitTooLarge);
        }
        Ok(())
    }

    /// Zero-indexed offset for store queries.
    pub fn offset(&self) -> u32 {
        (self.page - 1) * self.limit
    }
}

/// Sort direction for query results.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order
    Asc,
    /// Descending order
    Desc,
}

impl Default for SortDirection {
    fn default() -> Self {
        Self::Desc
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => write!(f, "ASC"),
            Self::Desc => write!(f, "DESC"),
        }
    }
}

/// Sort parameters for list operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortParams {
    /// Field to sort by
    pub field: String,

    /// Sort direction
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortParams {
    /// Create sort parameters.
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    /// Ascending sort on a field.
    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    /// Descending sort on a field.
    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Desc)
    }
}

impl Default for SortParams {
    fn default() -> Self {
        Self::desc("created_at")
    }
}

/// One page of results plus the full-count bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    /// The items on this page
    pub items: Vec<T>,

    /// Full filtered count across all pages
    pub total: u64,

    /// Current page number (1-indexed)
    pub page: u32,

    /// Items per page
    pub limit: u32,

    /// Total number of pages
    pub total_pages: u32,

    /// Whether a later page exists
    pub has_next: bool,

    /// Whether an earlier page exists
    pub has_previous: bool,
}

impl<T> Page<T> {
    /// Build a page from items and the full filtered count.
    pub fn new(items: Vec<T>, page: u32, limit: u32, total: u64) -> Self {
        let total_pages = if limit == 0 {
            0
        } else {
            ((total as f64) / f64::from(limit)).ceil() as u32
        };
        Self {
            items,
            total,
            page,
            limit,
            total_pages,
            has_next: page < total_pages,
            has_previous: page > 1,
        }
    }

    /// Build a page from the request that produced it.
    pub fn from_request(items: Vec<T>, request: &PageRequest, total: u64) -> Self {
        Self::new(items, request.page, request.limit, total)
    }

    /// An empty page for the given request.
    pub fn empty(request: &PageRequest) -> Self {
        Self::from_request(Vec::new(), request, 0)
    }

    /// Map the items to a different type, keeping the bookkeeping.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
            has_next: self.has_next,
            has_previous: self.has_previous,
        }
    }
}

/// Inclusive date range filter for queries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DateRange {
    /// Start (inclusive)
    pub start: Option<chrono::DateTime<chrono::Utc>>,

    /// End (inclusive)
    pub end: Option<chrono::DateTime<chrono::Utc>>,
}

impl DateRange {
    /// Create a range; either bound may be open.
    pub fn new(
        start: Option<chrono::DateTime<chrono::Utc>>,
        end: Option<chrono::DateTime<chrono::Utc>>,
    ) -> Self {
        Self { start, end }
    }

    /// Whether both bounds are open.
    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Whether a timestamp falls inside the range.
    pub fn contains(&self, at: &chrono::DateTime<chrono::Utc>) -> bool {
        let after_start = self.start.map_or(true, |start| at >= &start);
        let before_end = self.end.map_or(true, |end| at <= &end);
        after_start && before_end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request = PageRequest::default();
        assert_eq!(request.page, 1);
        assert_eq!(request.limit, 20);
        assert_eq!(request.offset(), 0);
    }

    #[test]
    fn test_request_clamps_zero_values() {
        let request = PageRequest::new(0, 0);
        assert_eq!(request.page, 1);
        assert_eq!(request.limit, 20);

        let request = PageRequest::new(1, 500);
        assert_eq!(request.limit, 100);
    }

    #[test]
    fn test_validate_enforces_the_contract() {
        assert!(PageRequest { page: 1, limit: 20 }.validate().is_ok());
        assert_eq!(
            PageRequest { page: 0, limit: 20 }.validate(),
            Err(PaginationError::PageOutOfRange)
        );
        assert_eq!(
            PageRequest { page: 1, limit: 0 }.validate(),
            Err(PaginationError::LimitOutOfRange)
        );
        assert_eq!(
            PageRequest { page: 1, limit: 101 }.validate(),
            Err(PaginationError::LimitTooLarge)
        );
    }

    #[test]
    fn test_offset_calculation() {
        assert_eq!(PageRequest::new(3, 25).offset(), 50);
    }

    #[test]
    fn test_page_bookkeeping() {
        let page = Page::new(vec![1, 2, 3, 4, 5], 2, 5, 23);
        assert_eq!(page.total, 23);
        assert_eq!(page.total_pages, 5);
        assert!(page.has_next);
        assert!(page.has_previous);

        let last = Page::new(vec![1, 2, 3], 5, 5, 23);
        assert!(!last.has_next);
        assert!(last.has_previous);
    }

    #[test]
    fn test_total_is_not_items_len() {
        let page = Page::new(vec![1], 1, 20, 400);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total, 400);
    }

    #[test]
    fn test_page_map_preserves_bookkeeping() {
        let page = Page::new(vec![1, 2], 1, 2, 7).map(|x| x * 10);
        assert_eq!(page.items, vec![10, 20]);
        assert_eq!(page.total, 7);
        assert_eq!(page.total_pages, 4);
    }

    #[test]
    fn test_date_range_contains() {
        use chrono::{Duration, Utc};
        let now = Utc::now();
        let range = DateRange::new(Some(now - Duration::days(1)), Some(now + Duration::days(1)));
        assert!(range.contains(&now));
        assert!(!range.contains(&(now + Duration::days(2))));
        assert!(DateRange::default().contains(&now));
    }
}
