use std::collections::HashMap;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
    Json,
};
use serde::{de::DeserializeOwned, Deserialize};

use crate::error::ApiError;
use crate::filter::{Filter, FilterField, ListQuery, Pagination};

/// JSON body whose parse failures render as `E_INVALID_JSON`.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// Raw path segments. Ids are parsed on demand so every route applies the
/// same rule before any lookup.
pub struct RouteIds(HashMap<String, String>);

#[async_trait]
impl<S> FromRequestParts<S> for RouteIds
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(segments) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        Ok(Self(segments))
    }
}

impl RouteIds {
    pub fn id(&self, name: &str) -> Result<i64, ApiError> {
        let raw = self
            .0
            .get(name)
            .ok_or_else(|| ApiError::bad_request(format!("Missing route parameter {}", name)))?;
        parse_id(raw).ok_or_else(|| ApiError::bad_request(format!("Invalid {}", name)))
    }

    pub fn text(&self, name: &str) -> Result<&str, ApiError> {
        self.0
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| ApiError::bad_request(format!("Missing route parameter {}", name)))
    }
}

/// Non-negative decimal integer that fits an i64 row id.
pub fn parse_id(raw: &str) -> Option<i64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse::<i64>().ok()
}

/// Query string of every list endpoint. Each handler picks the filters it
/// declares; the rest are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub name: Option<String>,
    pub code: Option<String>,
    pub key: Option<String>,
    pub value: Option<String>,
    pub language: Option<String>,
}

impl ListParams {
    pub fn pagination(&self) -> Pagination {
        Pagination::from_input(self.page.as_deref(), self.limit.as_deref())
    }

    pub fn query<'a, I>(&self, fields: I) -> ListQuery
    where
        I: IntoIterator<Item = FilterField<'a>>,
    {
        ListQuery::new(Filter::from_fields(fields), self.pagination())
    }
}
