// handlers/protected/key_values.rs - .../keys/:key_id/values[/:id]

use axum::extract::{Extension, Query, State};

use crate::api::payloads::KeyValuePayload;
use crate::api::{JsonBody, ListParams, RouteIds};
use crate::database::models::{Collection, Key, KeyValue, NewKeyValue, Project, ProjectMember};
use crate::database::Store;
use crate::error::ApiError;
use crate::filter::{FilterField, Page};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::policy::{authorize, Action, Chain, KeyPolicy, KeyValuePolicy};
use crate::services::{lookup, uniqueness};
use crate::AppState;

/// Project, membership, collection and key named by the route.
struct KeyScope {
    project: Project,
    membership: Option<ProjectMember>,
    collection: Collection,
    key: Key,
}

impl KeyScope {
    async fn resolve(store: &dyn Store, ids: &RouteIds, user_id: i64) -> Result<Self, ApiError> {
        let project_id = ids.id("project_id")?;
        let collection_id = ids.id("collection_id")?;
        let key_id = ids.id("key_id")?;

        let (project, membership) = lookup::project_scope(store, project_id, user_id).await?;
        let collection = lookup::collection(store, collection_id).await?;
        let key = lookup::key(store, key_id).await?;
        Ok(Self { project, membership, collection, key })
    }

    fn chain(&self) -> Chain<'_> {
        Chain::new(&self.project, self.membership.as_ref())
            .collection(&self.collection)
            .key(&self.key)
    }
}

pub async fn key_values_find(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ids: RouteIds,
    Query(params): Query<ListParams>,
) -> ApiResult<Page<KeyValue>> {
    let store = state.store.as_ref();
    let scope = KeyScope::resolve(store, &ids, auth.user.id).await?;
    authorize::<KeyPolicy>(&auth.user, Action::View, &scope.chain())?;

    let query = params.query([
        FilterField::contains("value", params.value.as_deref()),
        FilterField::exact("language", params.language.as_deref()),
    ]);
    Ok(ApiResponse::success(store.list_key_values(scope.key.id, &query).await?))
}

pub async fn key_value_find_by_id(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ids: RouteIds,
) -> ApiResult<KeyValue> {
    let id = ids.id("id")?;
    let store = state.store.as_ref();
    let scope = KeyScope::resolve(store, &ids, auth.user.id).await?;
    let value = lookup::key_value(store, id).await?;
    authorize::<KeyValuePolicy>(&auth.user, Action::View, &scope.chain().value(&value))?;

    Ok(ApiResponse::success(value))
}

/**
 * POST .../keys/:key_id/values
 *
 * Expected Input:
 * ```json
 * { "value": "Bonjour", "language": "fr" }
 * ```
 *
 * One value per language within a key.
 */
pub async fn key_value_create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ids: RouteIds,
    JsonBody(payload): JsonBody<KeyValuePayload>,
) -> ApiResult<KeyValue> {
    let store = state.store.as_ref();
    let scope = KeyScope::resolve(store, &ids, auth.user.id).await?;
    authorize::<KeyValuePolicy>(&auth.user, Action::Create, &scope.chain())?;

    let (value, language) = payload.validate_create()?;
    uniqueness::key_value_language(store, scope.key.id, &language, None).await?;

    let value = store.create_key_value(NewKeyValue { value, language, key_id: scope.key.id }).await?;
    Ok(ApiResponse::created(value))
}

pub async fn key_value_update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ids: RouteIds,
    JsonBody(payload): JsonBody<KeyValuePayload>,
) -> ApiResult<KeyValue> {
    let id = ids.id("id")?;
    let store = state.store.as_ref();
    let scope = KeyScope::resolve(store, &ids, auth.user.id).await?;
    let value = lookup::key_value(store, id).await?;
    authorize::<KeyValuePolicy>(&auth.user, Action::Update, &scope.chain().value(&value))?;

    let changes = payload.validate_update()?;
    if let Some([language]) = uniqueness::composite([changes.language.as_deref()], [value.language.as_str()]) {
        uniqueness::key_value_language(store, scope.key.id, language, Some(value.id)).await?;
    }

    Ok(ApiResponse::success(store.update_key_value(value.id, changes).await?))
}

pub async fn key_value_delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ids: RouteIds,
) -> ApiResult<()> {
    let id = ids.id("id")?;
    let store = state.store.as_ref();
    let scope = KeyScope::resolve(store, &ids, auth.user.id).await?;
    let value = lookup::key_value(store, id).await?;
    authorize::<KeyValuePolicy>(&auth.user, Action::Delete, &scope.chain().value(&value))?;

    store.delete_key_value(value.id).await?;
    Ok(ApiResponse::no_content())
}
