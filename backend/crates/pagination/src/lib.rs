//! Page-number pagination primitives shared by list endpoints.
//!
//! A [`PageRequest`] validates the `page` and `limit` query parameters, slices
//! an in-memory result set and produces the [`PageMetadata`] envelope that
//! clients use to walk the remaining pages.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default number of rows per page when the client omits `limit`.
pub const DEFAULT_LIMIT: u32 = 10;
/// Largest `limit` a client may request.
pub const MAX_LIMIT: u32 = 100;

/// Validation errors raised when constructing a [`PageRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageRequestError {
    /// Page numbers start at one.
    #[error("page must be greater than or equal to 1, got {page}")]
    PageOutOfRange {
        /// Rejected page number.
        page: u32,
    },
    /// Limit is outside `1..=MAX_LIMIT`.
    #[error("limit must be between 1 and {max}, got {limit}", max = MAX_LIMIT)]
    LimitOutOfRange {
        /// Rejected limit.
        limit: u32,
    },
}

/// Validated page selection.
///
/// # Examples
/// ```
/// use pagination::PageRequest;
///
/// let request = PageRequest::new(Some(2), Some(2)).expect("valid page");
/// let page = request.paginate(vec![1, 2, 3, 4, 5]);
/// assert_eq!(page.results, vec![3, 4]);
/// assert_eq!(page.page_metadata.next, Some(3));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Build a page request, applying defaults for missing values.
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError`] when `page` is zero or `limit` falls
    /// outside `1..=MAX_LIMIT`.
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Result<Self, PageRequestError> {
        let page_number = page.unwrap_or(1);
        let page_limit = limit.unwrap_or(DEFAULT_LIMIT);
        if page_number == 0 {
            return Err(PageRequestError::PageOutOfRange { page: page_number });
        }
        if page_limit == 0 || page_limit > MAX_LIMIT {
            return Err(PageRequestError::LimitOutOfRange { limit: page_limit });
        }
        Ok(Self {
            page: page_number,
            limit: page_limit,
        })
    }

    /// One-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Maximum rows per page.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Slice `rows` down to the requested page and describe the result.
    #[must_use]
    pub fn paginate<T>(&self, rows: Vec<T>) -> Page<T> {
        let total = rows.len();
        let limit = self.limit as usize;
        let offset = (self.page.saturating_sub(1) as usize).saturating_mul(limit);
        let results: Vec<T> = rows.into_iter().skip(offset).take(limit).collect();
        Page {
            page_metadata: PageMetadata::new(self.page, self.limit, total as u64),
            results,
        }
    }
}

/// Page envelope metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    /// Current one-based page number.
    pub page: u32,
    /// Total rows across all pages.
    pub total: u64,
    /// Rows per page.
    pub limit: u32,
    /// Next page number, if any.
    pub next: Option<u32>,
    /// Previous page number, if any.
    pub previous: Option<u32>,
    /// Whether a next page exists.
    #[serde(rename = "hasNext")]
    pub has_next: bool,
    /// Whether a previous page exists.
    #[serde(rename = "hasPrevious")]
    pub has_previous: bool,
}

impl PageMetadata {
    /// Compute metadata for `page` given the total row count.
    #[must_use]
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let seen = u64::from(page).saturating_mul(u64::from(limit));
        let has_next = seen < total;
        let has_previous = page > 1;
        Self {
            page,
            total,
            limit,
            next: has_next.then(|| page.saturating_add(1)),
            previous: has_previous.then(|| page - 1),
            has_next,
            has_previous,
        }
    }
}

/// One page of results together with its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Navigation metadata.
    pub page_metadata: PageMetadata,
    /// Rows on this page.
    pub results: Vec<T>,
}

#[cfg(test)]
mod tests {
    //! Page slicing and metadata coverage.

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some(0), None)]
    #[case(None, Some(0))]
    #[case(None, Some(MAX_LIMIT + 1))]
    fn rejects_out_of_range_values(#[case] page: Option<u32>, #[case] limit: Option<u32>) {
        assert!(PageRequest::new(page, limit).is_err());
    }

    #[rstest]
    fn defaults_apply_when_missing() {
        let request = PageRequest::new(None, None).expect("defaults are valid");
        assert_eq!(request, PageRequest::default());
        assert_eq!(request.page(), 1);
        assert_eq!(request.limit(), DEFAULT_LIMIT);
    }

    #[rstest]
    #[case(1, 2, vec![1, 2], Some(2), None)]
    #[case(2, 2, vec![3, 4], Some(3), Some(1))]
    #[case(3, 2, vec![5], None, Some(2))]
    #[case(4, 2, vec![], None, Some(3))]
    fn paginates_rows(
        #[case] page: u32,
        #[case] limit: u32,
        #[case] expected: Vec<i32>,
        #[case] next: Option<u32>,
        #[case] previous: Option<u32>,
    ) {
        let request = PageRequest::new(Some(page), Some(limit)).expect("valid request");
        let result = request.paginate(vec![1, 2, 3, 4, 5]);
        assert_eq!(result.results, expected);
        assert_eq!(result.page_metadata.total, 5);
        assert_eq!(result.page_metadata.next, next);
        assert_eq!(result.page_metadata.previous, previous);
        assert_eq!(result.page_metadata.has_next, next.is_some());
        assert_eq!(result.page_metadata.has_previous, previous.is_some());
    }

    #[rstest]
    fn metadata_uses_camel_case_flags() {
        let value = serde_json::to_value(PageMetadata::new(1, 10, 0)).expect("serialise");
        assert_eq!(value["hasNext"], serde_json::json!(false));
        assert_eq!(value["hasPrevious"], serde_json::json!(false));
        assert!(value["next"].is_null());
    }
}
