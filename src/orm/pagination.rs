//! Page arithmetic.

use serde::Serialize;

/// Resolved pagination window.
///
/// An empty result set is the all-zero page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Page {
    pub current_page: u64,
    pub page_size: u64,
    pub total_records: u64,
    pub total_pages: u64,
}

impl Page {
    /// Clamp `page` and `page_size` to at least 1 and derive the page count.
    pub fn compute(page: i64, page_size: i64, total_records: u64) -> Self {
        if total_records == 0 {
            return Self::default();
        }
        let current_page = page.max(1).unsigned_abs();
        let page_size = page_size.max(1).unsigned_abs();
        Self {
            current_page,
            page_size,
            total_records,
            total_pages: total_records.div_ceil(page_size),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_records == 0
    }

    pub fn limit(&self) -> u64 {
        self.page_size
    }

    /// Rows to skip before this page.
    pub fn offset(&self) -> u64 {
        self.current_page.saturating_sub(1).saturating_mul(self.page_size)
    }
}
