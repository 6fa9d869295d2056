//! List pagination shared by the patients list and diagnosis history.
//!
//! Pages are 1-based. The page count is always derived client-side as
//! `ceil(total / limit)` so every list agrees on it regardless of which
//! fields the service happened to send.

use serde::{Deserialize, Serialize};

/// Largest page size the service accepts.
pub const MAX_PAGE_LIMIT: u32 = 100;
/// Default page size for the patients list.
pub const DEFAULT_PATIENT_LIMIT: u32 = 20;
/// Default page size for diagnosis history.
pub const DEFAULT_HISTORY_LIMIT: u32 = 15;

/// A page request. Construction clamps `page` to >= 1 and `limit` to
/// `1..=MAX_PAGE_LIMIT`, so a value below 1 is never forwarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            page: page.clamp(1, u32::MAX as i64) as u32,
            limit: limit.clamp(1, MAX_PAGE_LIMIT as i64) as u32,
        }
    }

    /// Same limit, different page.
    pub fn with_page(self, page: i64) -> Self {
        Self::new(page, self.limit as i64)
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of items skipped before this page.
    pub fn offset(&self) -> usize {
        (self.page as usize - 1) * self.limit as usize
    }
}

/// `ceil(total / limit)`; zero items means zero pages.
pub fn page_count(total: u64, limit: u32) -> u32 {
    let limit = u64::from(limit.max(1));
    total.div_ceil(limit) as u32
}

/// One page of a server-side list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaginatedList<T> {
    pub items: Vec<T>,
    pub total: u64,
    /// 1-based.
    pub page: u32,
    pub pages: u32,
    pub limit: u32,
}

impl<T> PaginatedList<T> {
    pub fn new(items: Vec<T>, total: u64, page: u32, limit: u32) -> Self {
        let limit = limit.max(1);
        Self {
            items,
            total,
            page: page.max(1),
            pages: page_count(total, limit),
            limit,
        }
    }

    /// Slice an in-memory collection the way the service does. A page past
    /// the end yields no items rather than an error.
    pub fn from_slice(all: &[T], request: PageRequest) -> Self
    where
        T: Clone,
    {
        let items = all
            .iter()
            .skip(request.offset())
            .take(request.limit() as usize)
            .cloned()
            .collect();
        Self::new(items, all.len() as u64, request.page(), request.limit())
    }

    pub fn empty(request: PageRequest) -> Self {
        Self::new(Vec::new(), 0, request.page(), request.limit())
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.pages
    }
}

/// Patients list body: items under `patients`, `pages` included.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PatientsPage<T> {
    pub patients: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

/// History body: items under `history`, no `pages` field.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct HistoryPage<T> {
    pub history: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

impl<T> From<PatientsPage<T>> for PaginatedList<T> {
    fn from(raw: PatientsPage<T>) -> Self {
        PaginatedList::new(raw.patients, raw.total, raw.page, raw.limit)
    }
}

impl<T> From<HistoryPage<T>> for PaginatedList<T> {
    fn from(raw: HistoryPage<T>) -> Self {
        PaginatedList::new(raw.history, raw.total, raw.page, raw.limit)
    }
}
