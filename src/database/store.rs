use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    ApiToken, Collection, CollectionChanges, Key, KeyChanges, KeyValue, KeyValueChanges, Language, NewCollection,
    NewKey, NewKeyValue, NewPasswordReset, NewProject, NewUser, PasswordReset, Project, ProjectChanges,
    ProjectMember, User,
};
use crate::filter::{ListQuery, Page};

pub type StoreResult<T> = Result<T, DatabaseError>;

/// Users, issued tokens and password-reset audit rows.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;
    async fn find_user(&self, id: i64) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn update_user_password(&self, id: i64, password_hash: &str) -> StoreResult<User>;

    async fn create_api_token(&self, user_id: i64, jti: Uuid, expires_at: DateTime<Utc>) -> StoreResult<ApiToken>;
    async fn find_api_token(&self, jti: Uuid) -> StoreResult<Option<ApiToken>>;
    async fn delete_api_token(&self, jti: Uuid) -> StoreResult<bool>;
    async fn delete_api_tokens_for_user(&self, user_id: i64) -> StoreResult<u64>;

    async fn create_password_reset(&self, reset: NewPasswordReset) -> StoreResult<PasswordReset>;
}

#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Projects the user is attached to as a member.
    async fn list_projects_for_user(&self, user_id: i64, query: &ListQuery) -> StoreResult<Page<Project>>;
    async fn find_project(&self, id: i64) -> StoreResult<Option<Project>>;
    /// Inserts the project and attaches its creator as a member.
    async fn create_project(&self, project: NewProject) -> StoreResult<Project>;
    async fn update_project(&self, id: i64, changes: ProjectChanges) -> StoreResult<Project>;
    async fn delete_project(&self, id: i64) -> StoreResult<bool>;
    async fn find_membership(&self, project_id: i64, user_id: i64) -> StoreResult<Option<ProjectMember>>;
}

#[async_trait]
pub trait CollectionStore: Send + Sync {
    async fn list_collections(&self, project_id: i64, query: &ListQuery) -> StoreResult<Page<Collection>>;
    async fn find_collection(&self, id: i64) -> StoreResult<Option<Collection>>;
    async fn find_collection_by_code(&self, project_id: i64, code: &str) -> StoreResult<Option<Collection>>;
    async fn create_collection(&self, collection: NewCollection) -> StoreResult<Collection>;
    async fn update_collection(&self, id: i64, changes: CollectionChanges) -> StoreResult<Collection>;
    async fn delete_collection(&self, id: i64) -> StoreResult<bool>;
}

#[async_trait]
pub trait KeyStore: Send + Sync {
    async fn list_keys(&self, collection_id: i64, query: &ListQuery) -> StoreResult<Page<Key>>;
    async fn find_key(&self, id: i64) -> StoreResult<Option<Key>>;
    async fn find_key_by_name(&self, collection_id: i64, key: &str) -> StoreResult<Option<Key>>;
    async fn create_key(&self, key: NewKey) -> StoreResult<Key>;
    async fn update_key(&self, id: i64, changes: KeyChanges) -> StoreResult<Key>;
    async fn delete_key(&self, id: i64) -> StoreResult<bool>;
}

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn list_key_values(&self, key_id: i64, query: &ListQuery) -> StoreResult<Page<KeyValue>>;
    async fn find_key_value(&self, id: i64) -> StoreResult<Option<KeyValue>>;
    async fn find_key_value_by_language(&self, key_id: i64, language: &str) -> StoreResult<Option<KeyValue>>;
    async fn create_key_value(&self, value: NewKeyValue) -> StoreResult<KeyValue>;
    async fn update_key_value(&self, id: i64, changes: KeyValueChanges) -> StoreResult<KeyValue>;
    async fn delete_key_value(&self, id: i64) -> StoreResult<bool>;
}

#[async_trait]
pub trait LanguageStore: Send + Sync {
    async fn list_languages(&self, query: &ListQuery) -> StoreResult<Page<Language>>;
    async fn find_language_by_code(&self, code: &str) -> StoreResult<Option<Language>>;
}

/// Full persistence surface used by the HTTP layer.
#[async_trait]
pub trait Store: UserStore + ProjectStore + CollectionStore + KeyStore + KeyValueStore + LanguageStore {
    async fn health_check(&self) -> StoreResult<()>;
}
