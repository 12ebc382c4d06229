//! Pagination for the admin listing
//!
//! Pages are 0-indexed to match the admin dashboard's query string.

use serde::{Deserialize, Serialize};

/// Maximum rows per page
const MAX_PAGE_SIZE: u32 = 50;

/// Default rows per page
const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Page number (0-indexed)
    pub page: u32,
    /// Rows per page (1..=50)
    pub page_size: u32,
}

impl Pagination {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page,
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// SQL OFFSET value.
    pub fn offset(&self) -> i64 {
        i64::from(self.page) * i64::from(self.page_size)
    }

    /// SQL LIMIT value.
    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// `{data, count}` response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    /// Total matching rows across all pages
    pub count: i64,
}

/// Query parameters for pagination
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationParams {
    pub page: Option<u32>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<u32>,
}

impl From<&PaginationParams> for Pagination {
    fn from(params: &PaginationParams) -> Self {
        Self::new(
            params.page.unwrap_or(0),
            params.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_calculation() {
        assert_eq!(Pagination::new(0, 10).offset(), 0);
        assert_eq!(Pagination::new(2, 10).offset(), 20);
        assert_eq!(Pagination::new(3, 25).offset(), 75);
    }

    #[test]
    fn caps_page_size() {
        assert_eq!(Pagination::new(0, 999).page_size, 50);
        assert_eq!(Pagination::new(0, 0).page_size, 1);
    }

    #[test]
    fn defaults_from_empty_params() {
        let p = Pagination::from(&PaginationParams::default());
        assert_eq!(p, Pagination::default());
        assert_eq!(p.limit(), 10);
    }
}
