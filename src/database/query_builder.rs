use serde_json::Value;
use sqlx::{self, postgres::PgArguments, FromRow, PgPool, Row};

use crate::database::manager::DatabaseError;
use crate::filter::{Filter, FilterWhere, ListQuery, Page, Pagination, SqlResult};

/// Paginated list query over one table, optionally narrowed to a parent scope
/// and joined to an association table.
pub struct QueryBuilder<T> {
    table_name: String,
    join: Option<String>,
    scope: Option<(String, i64)>,
    filter: Filter,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> QueryBuilder<T>
where
    T: for<'r> FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
{
    pub fn new(table_name: impl Into<String>) -> Result<Self, DatabaseError> {
        let name = table_name.into();
        validate_identifier(&name)?;
        Ok(Self {
            table_name: name,
            join: None,
            scope: None,
            filter: Filter::default(),
            _phantom: std::marker::PhantomData,
        })
    }

    /// `JOIN "<table>" ON "<table>"."<left>" = "<self>"."id"`
    pub fn join(mut self, table: &str, foreign_key: &str) -> Result<Self, DatabaseError> {
        validate_identifier(table)?;
        validate_identifier(foreign_key)?;
        self.join = Some(format!(
            "JOIN \"{}\" ON \"{}\".\"{}\" = \"{}\".\"id\"",
            table, table, foreign_key, self.table_name
        ));
        Ok(self)
    }

    /// Restrict rows to `<table>.<column> = id`. The scope is always the first
    /// bound parameter.
    pub fn scoped(mut self, table: &str, column: &str, id: i64) -> Result<Self, DatabaseError> {
        validate_identifier(table)?;
        validate_identifier(column)?;
        self.scope = Some((format!("\"{}\".\"{}\"", table, column), id));
        Ok(self)
    }

    pub fn filter(mut self, filter: &Filter) -> Self {
        self.filter = filter.clone();
        self
    }

    pub async fn paginate(self, pool: &PgPool, pagination: Pagination) -> Result<Page<T>, DatabaseError> {
        let count_sql = self.count_sql();
        let mut count_query = sqlx::query(&count_sql.query);
        for p in count_sql.params.iter() {
            count_query = bind_param_query(count_query, p);
        }
        let total: i64 = count_query.fetch_one(pool).await?.try_get("count")?;

        let select_sql = self.select_sql(pagination);
        let mut select_query = sqlx::query_as::<_, T>(&select_sql.query);
        for p in select_sql.params.iter() {
            select_query = bind_param_query_as(select_query, p);
        }
        let rows = select_query.fetch_all(pool).await?;

        Ok(Page::new(rows, total, pagination))
    }

    pub async fn list(self, pool: &PgPool, query: &ListQuery) -> Result<Page<T>, DatabaseError> {
        self.filter(&query.filter).paginate(pool, query.pagination).await
    }

    fn from_clause(&self) -> String {
        match &self.join {
            Some(join) => format!("FROM \"{}\" {}", self.table_name, join),
            None => format!("FROM \"{}\"", self.table_name),
        }
    }

    fn where_clause(&self) -> SqlResult {
        let mut conditions = vec![];
        let mut params = vec![];

        if let Some((column, id)) = &self.scope {
            params.push(Value::from(*id));
            conditions.push(format!("{} = $1", column));
        }

        let filter_sql = FilterWhere::generate(&self.filter, params.len());
        if !filter_sql.query.is_empty() {
            conditions.push(filter_sql.query);
            params.extend(filter_sql.params);
        }

        let query = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        SqlResult { query, params }
    }

    fn count_sql(&self) -> SqlResult {
        let where_sql = self.where_clause();
        let query = [
            "SELECT COUNT(*) AS count".to_string(),
            self.from_clause(),
            where_sql.query,
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
        SqlResult { query, params: where_sql.params }
    }

    fn select_sql(&self, pagination: Pagination) -> SqlResult {
        let where_sql = self.where_clause();
        let query = [
            format!("SELECT \"{}\".*", self.table_name),
            self.from_clause(),
            where_sql.query,
            format!("ORDER BY \"{}\".\"id\" ASC", self.table_name),
            format!("LIMIT {} OFFSET {}", pagination.limit, pagination.offset()),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
        SqlResult { query, params: where_sql.params }
    }
}

fn validate_identifier(name: &str) -> Result<(), DatabaseError> {
    let valid = name.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(DatabaseError::Sqlx(sqlx::Error::Protocol(format!("invalid identifier: {}", name))))
    }
}

fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    v: &'q Value,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => q.bind(i),
            None => q.bind(n.as_f64()),
        },
        Value::String(s) => q.bind(s.as_str()),
        Value::Array(_) | Value::Object(_) => q.bind(v.clone()),
    }
}

fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    v: &'q Value,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, sqlx::postgres::PgRow>,
{
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => q.bind(i),
            None => q.bind(n.as_f64()),
        },
        Value::String(s) => q.bind(s.as_str()),
        Value::Array(_) | Value::Object(_) => q.bind(v.clone()),
    }
}
