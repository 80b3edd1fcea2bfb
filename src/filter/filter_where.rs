use serde_json::Value;

use super::types::{Filter, FilterClause, FilterOp, SqlResult};

/// Renders a [`Filter`] as a parameterised SQL conjunction.
pub struct FilterWhere {
    param_values: Vec<Value>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    /// Build the conjunction. Placeholders continue after
    /// `starting_param_index`, so callers can bind their scope columns first.
    /// Returns an empty query when the filter has no clauses.
    pub fn generate(filter: &Filter, starting_param_index: usize) -> SqlResult {
        let mut filter_where = Self::new(starting_param_index);
        let conditions: Vec<String> = filter
            .clauses()
            .iter()
            .map(|clause| filter_where.build_sql_condition(clause))
            .collect();

        SqlResult {
            query: conditions.join(" AND "),
            params: filter_where.param_values,
        }
    }

    fn build_sql_condition(&mut self, clause: &FilterClause) -> String {
        let quoted_column = format!("\"{}\"", clause.column);
        match clause.op {
            FilterOp::Like => {
                let pattern = format!("%{}%", escape_like(&clause.value));
                let placeholder = self.param(Value::String(pattern));
                format!("{} LIKE {} ESCAPE '\\'", quoted_column, placeholder)
            }
            FilterOp::Eq => {
                let placeholder = self.param(Value::String(clause.value.clone()));
                format!("{} = {}", quoted_column, placeholder)
            }
        }
    }

    fn param(&mut self, value: Value) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}

/// Escape LIKE metacharacters so user input only ever matches literally.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
