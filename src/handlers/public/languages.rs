// handlers/public/languages.rs - GET /common/languages[/:code]

use axum::extract::{Query, State};

use crate::api::{ListParams, RouteIds};
use crate::database::models::Language;
use crate::filter::{FilterField, Page};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::lookup;
use crate::AppState;

pub async fn languages_find(State(state): State<AppState>, Query(params): Query<ListParams>) -> ApiResult<Page<Language>> {
    let query = params.query([
        FilterField::contains("name", params.name.as_deref()),
        FilterField::exact("code", params.code.as_deref()),
    ]);
    Ok(ApiResponse::success(state.store.list_languages(&query).await?))
}

pub async fn language_show(State(state): State<AppState>, ids: RouteIds) -> ApiResult<Language> {
    let code = ids.text("code")?;
    Ok(ApiResponse::success(lookup::language_by_code(state.store.as_ref(), code).await?))
}
