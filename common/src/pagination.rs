use serde::Serialize;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaginationError {
    #[error("invalid page")]
    InvalidPage,
    #[error("invalid page_size")]
    InvalidPageSize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Page {
    pub page: i64,
    pub page_size: i64,
}

impl Default for Page {
    fn default() -> Self {
        Page {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Page {
    /// Parses raw `page` / `page_size` query values. Empty values fall back to
    /// the defaults; anything below 1 is rejected and page_size is capped.
    pub fn parse(page: Option<&str>, page_size: Option<&str>) -> Result<Self, PaginationError> {
        let mut result = Page::default();

        if let Some(raw) = page.filter(|v| !v.is_empty()) {
            result.page = raw
                .parse::<i64>()
                .ok()
                .filter(|p| *p > 0)
                .ok_or(PaginationError::InvalidPage)?;
        }

        if let Some(raw) = page_size.filter(|v| !v.is_empty()) {
            let size = raw
                .parse::<i64>()
                .ok()
                .filter(|s| *s > 0)
                .ok_or(PaginationError::InvalidPageSize)?;
            result.page_size = size.min(MAX_PAGE_SIZE);
        }

        Ok(result)
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }
}
