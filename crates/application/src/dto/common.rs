//! Shared DTO pieces.

use ideaforge_common::pagination::Page;
use serde::Serialize;

/// A serialized page of DTOs with its pagination bookkeeping.
#[derive(Debug, Clone, Serialize)]
pub struct ApiPage<T> {
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

impl<T> ApiPage<T> {
    /// Convert a repository page, mapping each entity into its DTO.
    pub fn from_page<E: Into<T>>(page: Page<E>) -> Self {
        let mapped = page.map(Into::into);
        Self {
            items: mapped.items,
            total: mapped.total,
            page: mapped.page,
            limit: mapped.limit,
            total_pages: mapped.total_pages,
            has_next: mapped.has_next,
            has_previous: mapped.has_previous,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_page_preserves_bookkeeping() {
        let page = Page::new(vec![1u32, 2, 3], 2, 3, 10);
        let api: ApiPage<u64> = ApiPage::from_page(page.map(u64::from));
        assert_eq!(api.items, vec![1, 2, 3]);
        assert_eq!(api.total, 10);
        assert_eq!(api.total_pages, 4);
        assert!(api.has_previous);
    }
}
