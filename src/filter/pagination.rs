use serde::Serialize;

use crate::config::{self, PaginationConfig};

/// 1-indexed page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::resolve(None, None, &config::config().pagination)
    }
}

impl Pagination {
    /// Resolve `page`/`limit` query input against the process-wide defaults.
    pub fn from_input(page: Option<&str>, limit: Option<&str>) -> Self {
        Self::resolve(page, limit, &config::config().pagination)
    }

    /// Missing, non-numeric and non-positive inputs fall back to the configured
    /// defaults; they are never an error. Limits above the cap are clamped.
    pub fn resolve(page: Option<&str>, limit: Option<&str>, settings: &PaginationConfig) -> Self {
        let page = page.and_then(coerce).unwrap_or(settings.default_page).max(1);
        let mut limit = limit.and_then(coerce).unwrap_or(settings.default_page_limit).max(1);

        if let Some(max_limit) = settings.max_limit {
            if limit > max_limit {
                tracing::warn!("Limit {} exceeds max {}, capping to max", limit, max_limit);
                limit = max_limit;
            }
        }

        Self { page, limit }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

/// Numeric coercion of a query-string value. Whitespace is ignored and a
/// fractional part is truncated.
fn coerce(raw: &str) -> Option<u32> {
    let n: f64 = raw.trim().parse().ok()?;
    if !n.is_finite() || n < 1.0 {
        return None;
    }
    Some(n.trunc().min(f64::from(u32::MAX)) as u32)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub total: i64,
    pub per_page: u32,
    pub current_page: u32,
    pub first_page: u32,
    pub last_page: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub meta: PageMeta,
    pub data: Vec<T>,
}

impl<T> Page<T> {
    /// Wrap one already-windowed page of rows.
    pub fn new(data: Vec<T>, total: i64, pagination: Pagination) -> Self {
        let per_page = i64::from(pagination.limit);
        let last_page = ((total + per_page - 1) / per_page).max(1);

        Self {
            meta: PageMeta {
                total,
                per_page: pagination.limit,
                current_page: pagination.page,
                first_page: 1,
                last_page: u32::try_from(last_page).unwrap_or(u32::MAX),
            },
            data,
        }
    }

    /// Window a full, already-filtered result set.
    pub fn from_rows(rows: Vec<T>, pagination: Pagination) -> Self {
        let total = rows.len() as i64;
        let offset = usize::try_from(pagination.offset()).unwrap_or(usize::MAX);
        let data = rows.into_iter().skip(offset).take(pagination.limit as usize).collect();
        Self::new(data, total, pagination)
    }
}
