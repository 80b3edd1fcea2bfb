// handlers/protected/keys.rs - .../collections/:collection_id/keys[/:key_id]

use axum::extract::{Extension, Query, State};

use crate::api::payloads::KeyPayload;
use crate::api::{JsonBody, ListParams, RouteIds};
use crate::database::models::{Key, NewKey};
use crate::filter::{FilterField, Page};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::policy::{authorize, Action, Chain, CollectionPolicy, KeyPolicy};
use crate::services::{lookup, uniqueness};
use crate::AppState;

pub async fn keys_find(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ids: RouteIds,
    Query(params): Query<ListParams>,
) -> ApiResult<Page<Key>> {
    let project_id = ids.id("project_id")?;
    let collection_id = ids.id("collection_id")?;
    let store = state.store.as_ref();

    let (project, membership) = lookup::project_scope(store, project_id, auth.user.id).await?;
    let collection = lookup::collection(store, collection_id).await?;
    let chain = Chain::new(&project, membership.as_ref()).collection(&collection);
    authorize::<CollectionPolicy>(&auth.user, Action::View, &chain)?;

    let query = params.query([FilterField::contains("key", params.key.as_deref())]);
    Ok(ApiResponse::success(store.list_keys(collection.id, &query).await?))
}

pub async fn key_find_by_id(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ids: RouteIds,
) -> ApiResult<Key> {
    let project_id = ids.id("project_id")?;
    let collection_id = ids.id("collection_id")?;
    let key_id = ids.id("key_id")?;
    let store = state.store.as_ref();

    let (project, membership) = lookup::project_scope(store, project_id, auth.user.id).await?;
    let collection = lookup::collection(store, collection_id).await?;
    let key = lookup::key(store, key_id).await?;
    let chain = Chain::new(&project, membership.as_ref()).collection(&collection).key(&key);
    authorize::<KeyPolicy>(&auth.user, Action::View, &chain)?;

    Ok(ApiResponse::success(key))
}

pub async fn key_create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ids: RouteIds,
    JsonBody(payload): JsonBody<KeyPayload>,
) -> ApiResult<Key> {
    let project_id = ids.id("project_id")?;
    let collection_id = ids.id("collection_id")?;
    let store = state.store.as_ref();

    let (project, membership) = lookup::project_scope(store, project_id, auth.user.id).await?;
    let collection = lookup::collection(store, collection_id).await?;
    let chain = Chain::new(&project, membership.as_ref()).collection(&collection);
    authorize::<KeyPolicy>(&auth.user, Action::Create, &chain)?;

    let key = payload.validate_create()?;
    uniqueness::key_name(store, collection.id, &key, None).await?;

    let key = store.create_key(NewKey { key, collection_id: collection.id }).await?;
    Ok(ApiResponse::created(key))
}

pub async fn key_update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ids: RouteIds,
    JsonBody(payload): JsonBody<KeyPayload>,
) -> ApiResult<Key> {
    let project_id = ids.id("project_id")?;
    let collection_id = ids.id("collection_id")?;
    let key_id = ids.id("key_id")?;
    let store = state.store.as_ref();

    let (project, membership) = lookup::project_scope(store, project_id, auth.user.id).await?;
    let collection = lookup::collection(store, collection_id).await?;
    let key = lookup::key(store, key_id).await?;
    let chain = Chain::new(&project, membership.as_ref()).collection(&collection).key(&key);
    authorize::<KeyPolicy>(&auth.user, Action::Update, &chain)?;

    let changes = payload.validate_update()?;
    if let Some([name]) = uniqueness::composite([changes.key.as_deref()], [key.key.as_str()]) {
        uniqueness::key_name(store, collection.id, name, Some(key.id)).await?;
    }

    Ok(ApiResponse::success(store.update_key(key.id, changes).await?))
}

pub async fn key_delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ids: RouteIds,
) -> ApiResult<()> {
    let project_id = ids.id("project_id")?;
    let collection_id = ids.id("collection_id")?;
    let key_id = ids.id("key_id")?;
    let store = state.store.as_ref();

    let (project, membership) = lookup::project_scope(store, project_id, auth.user.id).await?;
    let collection = lookup::collection(store, collection_id).await?;
    let key = lookup::key(store, key_id).await?;
    let chain = Chain::new(&project, membership.as_ref()).collection(&collection).key(&key);
    authorize::<KeyPolicy>(&auth.user, Action::Delete, &chain)?;

    store.delete_key(key.id).await?;
    Ok(ApiResponse::no_content())
}
