// handlers/protected/collections.rs - /projects/:project_id/collections[/:collection_id]

use axum::extract::{Extension, Query, State};

use crate::api::payloads::CollectionPayload;
use crate::api::{JsonBody, ListParams, RouteIds};
use crate::database::models::{Collection, NewCollection};
use crate::filter::{FilterField, Page};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::policy::{authorize, Action, Chain, CollectionPolicy, ProjectPolicy};
use crate::services::{lookup, uniqueness};
use crate::AppState;

pub async fn collections_find(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ids: RouteIds,
    Query(params): Query<ListParams>,
) -> ApiResult<Page<Collection>> {
    let project_id = ids.id("project_id")?;
    let (project, membership) = lookup::project_scope(state.store.as_ref(), project_id, auth.user.id).await?;
    authorize::<ProjectPolicy>(&auth.user, Action::View, &Chain::new(&project, membership.as_ref()))?;

    let query = params.query([
        FilterField::contains("name", params.name.as_deref()),
        FilterField::exact("code", params.code.as_deref()),
    ]);
    Ok(ApiResponse::success(state.store.list_collections(project.id, &query).await?))
}

pub async fn collection_find_by_id(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ids: RouteIds,
) -> ApiResult<Collection> {
    let project_id = ids.id("project_id")?;
    let collection_id = ids.id("collection_id")?;
    let store = state.store.as_ref();

    let (project, membership) = lookup::project_scope(store, project_id, auth.user.id).await?;
    let collection = lookup::collection(store, collection_id).await?;
    let chain = Chain::new(&project, membership.as_ref()).collection(&collection);
    authorize::<CollectionPolicy>(&auth.user, Action::View, &chain)?;

    Ok(ApiResponse::success(collection))
}

/**
 * POST /projects/:project_id/collections
 *
 * Expected Input:
 * ```json
 * { "code": "string", "name": "string", "description": "string | null" }
 * ```
 *
 * `code` must be unique within the project.
 */
pub async fn collection_create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ids: RouteIds,
    JsonBody(payload): JsonBody<CollectionPayload>,
) -> ApiResult<Collection> {
    let project_id = ids.id("project_id")?;
    let store = state.store.as_ref();

    let (project, membership) = lookup::project_scope(store, project_id, auth.user.id).await?;
    authorize::<CollectionPolicy>(&auth.user, Action::Create, &Chain::new(&project, membership.as_ref()))?;

    let (code, name, description) = payload.validate_create()?;
    uniqueness::collection_code(store, project.id, &code, None).await?;

    let collection = store
        .create_collection(NewCollection {
            code,
            name,
            description,
            project_id: project.id,
            created_by_user_id: auth.user.id,
        })
        .await?;
    Ok(ApiResponse::created(collection))
}

pub async fn collection_update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ids: RouteIds,
    JsonBody(payload): JsonBody<CollectionPayload>,
) -> ApiResult<Collection> {
    let project_id = ids.id("project_id")?;
    let collection_id = ids.id("collection_id")?;
    let store = state.store.as_ref();

    let (project, membership) = lookup::project_scope(store, project_id, auth.user.id).await?;
    let collection = lookup::collection(store, collection_id).await?;
    let chain = Chain::new(&project, membership.as_ref()).collection(&collection);
    authorize::<CollectionPolicy>(&auth.user, Action::Update, &chain)?;

    let changes = payload.validate_update()?;
    if let Some([code]) = uniqueness::composite([changes.code.as_deref()], [collection.code.as_str()]) {
        uniqueness::collection_code(store, project.id, code, Some(collection.id)).await?;
    }

    Ok(ApiResponse::success(store.update_collection(collection.id, changes).await?))
}

pub async fn collection_delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ids: RouteIds,
) -> ApiResult<()> {
    let project_id = ids.id("project_id")?;
    let collection_id = ids.id("collection_id")?;
    let store = state.store.as_ref();

    let (project, membership) = lookup::project_scope(store, project_id, auth.user.id).await?;
    let collection = lookup::collection(store, collection_id).await?;
    let chain = Chain::new(&project, membership.as_ref()).collection(&collection);
    authorize::<CollectionPolicy>(&auth.user, Action::Delete, &chain)?;

    store.delete_collection(collection.id).await?;
    Ok(ApiResponse::no_content())
}
