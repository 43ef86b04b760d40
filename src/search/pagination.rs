/// Page window over a counted result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub total: u64,
    pub pages: u64,
    /// Requested page clamped into `[1, pages]`, or 1 when there are no pages.
    pub page: u64,
    pub limit: u64,
    pub offset: u64,
}

impl Pagination {
    pub fn compute(total: u64, requested_page: u32, limit: u32) -> Self {
        let limit = u64::from(limit.max(1));
        let pages = total.div_ceil(limit);
        let page = u64::from(requested_page).clamp(1, pages.max(1));

        Self {
            total,
            pages,
            page,
            limit,
            offset: (page - 1) * limit,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}
