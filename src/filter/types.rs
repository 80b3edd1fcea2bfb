use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOp {
    /// Case-sensitive substring match (`LIKE %value%`)
    #[serde(rename = "$like")]
    Like,
    /// Exact equality
    #[serde(rename = "$eq")]
    Eq,
}

/// One list-endpoint filter declaration: which column, the raw query-string
/// input, and the predicate fragment to apply when the input is present.
#[derive(Debug, Clone, Copy)]
pub struct FilterField<'a> {
    pub column: &'static str,
    pub input: Option<&'a str>,
    pub op: FilterOp,
}

impl<'a> FilterField<'a> {
    pub fn contains(column: &'static str, input: Option<&'a str>) -> Self {
        Self { column, input, op: FilterOp::Like }
    }

    pub fn exact(column: &'static str, input: Option<&'a str>) -> Self {
        Self { column, input, op: FilterOp::Eq }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterClause {
    pub column: &'static str,
    pub op: FilterOp,
    pub value: String,
}

impl FilterClause {
    pub fn matches(&self, candidate: &str) -> bool {
        match self.op {
            FilterOp::Like => candidate.contains(self.value.as_str()),
            FilterOp::Eq => candidate == self.value,
        }
    }
}

/// Conjunction of the declared filters whose input was present, in
/// declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    clauses: Vec<FilterClause>,
}

impl Filter {
    pub fn from_fields<'a, I>(fields: I) -> Self
    where
        I: IntoIterator<Item = FilterField<'a>>,
    {
        let clauses = fields
            .into_iter()
            .filter_map(|field| match field.input {
                // Absent and empty inputs are skipped entirely, never matched against ''
                Some(value) if !value.is_empty() => Some(FilterClause {
                    column: field.column,
                    op: field.op,
                    value: value.to_string(),
                }),
                _ => None,
            })
            .collect();

        Self { clauses }
    }

    pub fn clauses(&self) -> &[FilterClause] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Evaluate the filter against an in-process record.
    pub fn matches<T: Filterable>(&self, record: &T) -> bool {
        self.clauses
            .iter()
            .all(|clause| record.field(clause.column).is_some_and(|v| clause.matches(v)))
    }
}

/// Exposes the string columns a list endpoint may filter on.
pub trait Filterable {
    fn field(&self, column: &str) -> Option<&str>;
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<serde_json::Value>,
}
