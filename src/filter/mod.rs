pub mod types;
pub mod filter_where;
pub mod pagination;

pub use types::*;
pub use filter_where::FilterWhere;
pub use pagination::{Page, PageMeta, Pagination};

/// Filter and page window for one list request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub filter: Filter,
    pub pagination: Pagination,
}

impl ListQuery {
    pub fn new(filter: Filter, pagination: Pagination) -> Self {
        Self { filter, pagination }
    }
}
