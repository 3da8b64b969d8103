//! Offset pagination for the newest-first post listing.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PER_PAGE: u32 = 10;
pub const MAX_PER_PAGE: u32 = 100;

/// One-based page request, already clamped to supported bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    pub fn new(page: Option<u32>, per_page: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page
                .unwrap_or(DEFAULT_PER_PAGE)
                .clamp(1, MAX_PER_PAGE),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OffsetPage<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub last_page: u32,
}

impl<T> OffsetPage<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        let per_page = u64::from(request.per_page);
        let last_page = total.div_ceil(per_page).max(1);
        Self {
            items,
            total,
            page: request.page,
            per_page: request.per_page,
            last_page: u32::try_from(last_page).unwrap_or(u32::MAX),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_clamping() {
        let request = PageRequest::new(None, None);
        assert_eq!(request, PageRequest { page: 1, per_page: 10 });

        let request = PageRequest::new(Some(0), Some(1_000));
        assert_eq!(request.page, 1);
        assert_eq!(request.per_page, MAX_PER_PAGE);

        assert_eq!(PageRequest::new(Some(3), Some(0)).per_page, 1);
    }

    #[test]
    fn offset_is_zero_based() {
        assert_eq!(PageRequest::new(Some(1), Some(10)).offset(), 0);
        assert_eq!(PageRequest::new(Some(4), Some(25)).offset(), 75);
    }

    #[test]
    fn last_page_rounds_up_and_never_drops_below_one() {
        let page: OffsetPage<()> = OffsetPage::new(Vec::new(), 0, PageRequest::default());
        assert_eq!(page.last_page, 1);

        let page: OffsetPage<()> = OffsetPage::new(Vec::new(), 21, PageRequest::default());
        assert_eq!(page.last_page, 3);
    }
}
