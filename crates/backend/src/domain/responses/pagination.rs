use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, ToSchema)]
pub struct Pagination {
    pub page: i32,
    pub page_size: i32,
    pub total_items: i32,
    pub total_pages: i32,
}

pub const MAX_PAGE_SIZE: i32 = 100;

/// Page size actually served for a requested one.
pub fn clamp_page_size(page_size: i32) -> i32 {
    page_size.clamp(1, MAX_PAGE_SIZE)
}

impl Pagination {
    pub fn new(page: i32, page_size: i32, total_items: i64) -> Self {
        let page_size = clamp_page_size(page_size);
        let total_items = total_items.max(0);
        let total_pages = (total_items + i64::from(page_size) - 1) / i64::from(page_size);

        Self {
            page: page.max(1),
            page_size,
            total_items: i32::try_from(total_items).unwrap_or(i32::MAX),
            total_pages: i32::try_from(total_pages).unwrap_or(i32::MAX),
        }
    }
}

/// Normalised `(limit, offset)` for a 1-based page request.
pub fn page_window(page: i32, page_size: i32) -> (i64, i64) {
    let page = i64::from(page.max(1));
    let page_size = i64::from(clamp_page_size(page_size));
    (page_size, (page - 1) * page_size)
}
