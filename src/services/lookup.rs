//! Find-or-404 lookups. Every handler resolves entities through these so a
//! missing row always surfaces as the same `E_NOT_FOUND` response.

use crate::database::models::{Collection, Key, KeyValue, Language, Project, ProjectMember, User};
use crate::database::Store;
use crate::error::ApiError;

fn found<T>(row: Option<T>) -> Result<T, ApiError> {
    row.ok_or_else(ApiError::not_found)
}

pub async fn project(store: &dyn Store, id: i64) -> Result<Project, ApiError> {
    found(store.find_project(id).await?)
}

pub async fn collection(store: &dyn Store, id: i64) -> Result<Collection, ApiError> {
    found(store.find_collection(id).await?)
}

pub async fn key(store: &dyn Store, id: i64) -> Result<Key, ApiError> {
    found(store.find_key(id).await?)
}

pub async fn key_value(store: &dyn Store, id: i64) -> Result<KeyValue, ApiError> {
    found(store.find_key_value(id).await?)
}

pub async fn user_by_email(store: &dyn Store, email: &str) -> Result<User, ApiError> {
    found(store.find_user_by_email(email).await?)
}

pub async fn language_by_code(store: &dyn Store, code: &str) -> Result<Language, ApiError> {
    found(store.find_language_by_code(code).await?)
}

/// Not a lookup-or-fail: a missing membership is a policy decision, not a 404.
pub async fn membership(store: &dyn Store, project_id: i64, user_id: i64) -> Result<Option<ProjectMember>, ApiError> {
    Ok(store.find_membership(project_id, user_id).await?)
}

/// Root of every ownership chain: the project and the acting user's membership.
pub async fn project_scope(
    store: &dyn Store,
    project_id: i64,
    user_id: i64,
) -> Result<(Project, Option<ProjectMember>), ApiError> {
    let project = project(store, project_id).await?;
    let membership = membership(store, project.id, user_id).await?;
    Ok((project, membership))
}
