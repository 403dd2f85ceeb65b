//! Pagination and search primitives shared across all list endpoints.

use serde::{Deserialize, Serialize};

/// Pagination query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    /// Maximum items per page.
    const MAX_PER_PAGE: i64 = 100;

    /// Default items per page.
    const DEFAULT_PER_PAGE: i64 = 25;

    pub fn limit(&self) -> i64 {
        self.per_page
            .unwrap_or(Self::DEFAULT_PER_PAGE)
            .clamp(1, Self::MAX_PER_PAGE)
    }

    pub fn offset(&self) -> i64 {
        (self.current_page() - 1).saturating_mul(self.limit())
    }

    pub fn current_page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }
}

/// Paged result envelope returned by list endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct PagedResult<T: Serialize> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl<T: Serialize> PagedResult<T> {
    pub fn new(items: Vec<T>, total: i64, pagination: &Pagination) -> Self {
        let per_page = pagination.limit();
        let total_pages = (total + per_page - 1) / per_page;
        Self {
            items,
            total,
            page: pagination.current_page(),
            per_page,
            total_pages,
        }
    }
}

/// Build an `ILIKE` substring pattern, escaping the wildcard characters in user input.
///
/// Blank input yields `None` so callers can skip the condition entirely.
pub fn search_pattern(search: Option<&str>) -> Option<String> {
    let term = search?.trim();
    if term.is_empty() {
        return None;
    }
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    Some(format!("%{escaped}%"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults() {
        let p = Pagination::default();
        assert_eq!(p.limit(), 25);
        assert_eq!(p.offset(), 0);
        assert_eq!(p.current_page(), 1);
    }

    #[test]
    fn pagination_clamps_per_page() {
        let p = Pagination {
            page: Some(1),
            per_page: Some(500),
        };
        assert_eq!(p.limit(), 100);

        let p = Pagination {
            page: Some(1),
            per_page: Some(0),
        };
        assert_eq!(p.limit(), 1);
    }

    #[test]
    fn pagination_negative_page_is_first_page() {
        let p = Pagination {
            page: Some(-4),
            per_page: Some(10),
        };
        assert_eq!(p.current_page(), 1);
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn pagination_offset_calculation() {
        let p = Pagination {
            page: Some(3),
            per_page: Some(10),
        };
        assert_eq!(p.offset(), 20);
    }

    #[test]
    fn pagination_offset_saturates_on_huge_page() {
        let p = Pagination {
            page: Some(i64::MAX),
            per_page: Some(100),
        };
        assert_eq!(p.offset(), i64::MAX);
        assert_eq!(p.current_page(), i64::MAX);
    }

    #[test]
    fn paged_result_total_pages() {
        let p = Pagination {
            page: Some(1),
            per_page: Some(10),
        };
        let result = PagedResult::new(vec![1, 2, 3], 25, &p);
        assert_eq!(result.total_pages, 3);
        assert_eq!(result.total, 25);
        assert_eq!(result.page, 1);
    }

    #[test]
    fn paged_result_empty_has_zero_pages() {
        let result = PagedResult::<i32>::new(vec![], 0, &Pagination::default());
        assert_eq!(result.total_pages, 0);
    }

    #[test]
    fn paged_result_reports_requested_page() {
        let p = Pagination {
            page: Some(2),
            per_page: Some(2),
        };
        let result = PagedResult::new(vec![3, 4], 4, &p);
        assert_eq!(result.items, vec![3, 4]);
        assert_eq!(result.page, 2);
        assert_eq!(result.total_pages, 2);
    }

    #[test]
    fn search_pattern_escapes_wildcards() {
        assert_eq!(search_pattern(Some("50%_off")).unwrap(), "%50\\%\\_off%");
        assert_eq!(search_pattern(Some("  kickoff ")).unwrap(), "%kickoff%");
    }

    #[test]
    fn search_pattern_skips_blank_input() {
        assert!(search_pattern(None).is_none());
        assert!(search_pattern(Some("   ")).is_none());
    }
}
