//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// Pagination parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 20,
        }
    }
}

impl Pagination {
    /// Clamp page/per_page to sane bounds (page >= 1, 1 <= per_page <= 100)
    pub fn clamped(&self) -> Self {
        Self {
            page: self.page.max(1),
            per_page: self.per_page.clamp(1, 100),
        }
    }

    /// SQL LIMIT value
    pub fn limit(&self) -> i64 {
        i64::from(self.clamped().per_page)
    }

    /// SQL OFFSET value
    pub fn offset(&self) -> i64 {
        let p = self.clamped();
        i64::from(p.page - 1) * i64::from(p.per_page)
    }
}

/// Paginated response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub per_page: u32,
    pub total_items: u64,
    pub total_pages: u32,
}

impl PaginationMeta {
    pub fn new(pagination: &Pagination, total_items: u64) -> Self {
        let p = pagination.clamped();
        let total_pages = ((total_items + u64::from(p.per_page) - 1) / u64::from(p.per_page)) as u32;
        Self {
            page: p.page,
            per_page: p.per_page,
            total_items,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_offsets() {
        let p = Pagination { page: 1, per_page: 10 };
        assert_eq!(p.limit(), 10);
        assert_eq!(p.offset(), 0);

        let p = Pagination { page: 3, per_page: 10 };
        assert_eq!(p.offset(), 20);
    }

    #[test]
    fn test_pagination_clamping() {
        let p = Pagination { page: 0, per_page: 0 };
        assert_eq!(p.limit(), 1);
        assert_eq!(p.offset(), 0);

        let p = Pagination { page: 1, per_page: 500 };
        assert_eq!(p.limit(), 100);
    }

    #[test]
    fn test_pagination_meta() {
        let meta = PaginationMeta::new(&Pagination { page: 1, per_page: 10 }, 25);
        assert_eq!(meta.total_pages, 3);
        assert_eq!(meta.total_items, 25);

        let meta = PaginationMeta::new(&Pagination { page: 1, per_page: 10 }, 0);
        assert_eq!(meta.total_pages, 0);
    }
}
