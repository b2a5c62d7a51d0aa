//! Shared API helpers

use serde::Deserialize;

use crate::models::ListParams;

/// Default listing page size
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Pagination query parameters shared by listing endpoints
#[derive(Debug, Deserialize)]
pub struct PaginationQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

pub fn default_page() -> u32 {
    1
}

pub fn default_per_page() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl PaginationQuery {
    pub fn to_params(&self) -> ListParams {
        ListParams::new(self.page, self.per_page)
    }
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}
