// handlers/protected/projects.rs - /projects[/:project_id]

use axum::extract::{Extension, Query, State};

use crate::api::payloads::ProjectPayload;
use crate::api::{JsonBody, ListParams, RouteIds};
use crate::database::models::{NewProject, Project};
use crate::filter::{FilterField, Page};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::policy::{authorize, Action, Chain, ProjectPolicy};
use crate::services::lookup;
use crate::AppState;

/// GET /projects - projects the user is a member of
pub async fn projects_find(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(params): Query<ListParams>,
) -> ApiResult<Page<Project>> {
    let query = params.query([FilterField::contains("name", params.name.as_deref())]);
    Ok(ApiResponse::success(state.store.list_projects_for_user(auth.user.id, &query).await?))
}

pub async fn project_find_by_id(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ids: RouteIds,
) -> ApiResult<Project> {
    let project_id = ids.id("project_id")?;
    let (project, membership) = lookup::project_scope(state.store.as_ref(), project_id, auth.user.id).await?;
    authorize::<ProjectPolicy>(&auth.user, Action::View, &Chain::new(&project, membership.as_ref()))?;

    Ok(ApiResponse::success(project))
}

/// POST /projects - the creator is recorded and attached as a member
pub async fn project_create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    JsonBody(payload): JsonBody<ProjectPayload>,
) -> ApiResult<Project> {
    let (name, description) = payload.validate_create()?;
    let project = state
        .store
        .create_project(NewProject { name, description, created_by_user_id: auth.user.id })
        .await?;

    Ok(ApiResponse::created(project))
}

pub async fn project_update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ids: RouteIds,
    JsonBody(payload): JsonBody<ProjectPayload>,
) -> ApiResult<Project> {
    let project_id = ids.id("project_id")?;
    let (project, membership) = lookup::project_scope(state.store.as_ref(), project_id, auth.user.id).await?;
    authorize::<ProjectPolicy>(&auth.user, Action::Update, &Chain::new(&project, membership.as_ref()))?;

    let changes = payload.validate_update()?;
    Ok(ApiResponse::success(state.store.update_project(project.id, changes).await?))
}

/// DELETE /projects/:project_id - creator only
pub async fn project_delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ids: RouteIds,
) -> ApiResult<()> {
    let project_id = ids.id("project_id")?;
    let (project, membership) = lookup::project_scope(state.store.as_ref(), project_id, auth.user.id).await?;
    authorize::<ProjectPolicy>(&auth.user, Action::Delete, &Chain::new(&project, membership.as_ref()))?;

    state.store.delete_project(project.id).await?;
    Ok(ApiResponse::no_content())
}
