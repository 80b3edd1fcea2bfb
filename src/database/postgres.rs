use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    ApiToken, Collection, CollectionChanges, Key, KeyChanges, KeyValue, KeyValueChanges, Language, NewCollection,
    NewKey, NewKeyValue, NewPasswordReset, NewProject, NewUser, PasswordReset, Project, ProjectChanges,
    ProjectMember, User,
};
use crate::database::query_builder::QueryBuilder;
use crate::database::store::{
    CollectionStore, KeyStore, KeyValueStore, LanguageStore, ProjectStore, Store, StoreResult, UserStore,
};
use crate::filter::{ListQuery, Page};

/// Postgres-backed store. Unique constraints and cascades live in the schema.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn not_found(what: &str, id: i64) -> DatabaseError {
    DatabaseError::NotFound(format!("{} {}", what, id))
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let row = sqlx::query_as::<_, User>(
            "INSERT INTO users (name, email, password) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_user(&self, id: i64) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update_user_password(&self, id: i64, password_hash: &str) -> StoreResult<User> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET password = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found("user", id))
    }

    async fn create_api_token(&self, user_id: i64, jti: Uuid, expires_at: DateTime<Utc>) -> StoreResult<ApiToken> {
        let row = sqlx::query_as::<_, ApiToken>(
            "INSERT INTO api_tokens (user_id, jti, expires_at) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(user_id)
        .bind(jti)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_api_token(&self, jti: Uuid) -> StoreResult<Option<ApiToken>> {
        let row = sqlx::query_as::<_, ApiToken>("SELECT * FROM api_tokens WHERE jti = $1")
            .bind(jti)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn delete_api_token(&self, jti: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM api_tokens WHERE jti = $1")
            .bind(jti)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_api_tokens_for_user(&self, user_id: i64) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM api_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn create_password_reset(&self, reset: NewPasswordReset) -> StoreResult<PasswordReset> {
        let row = sqlx::query_as::<_, PasswordReset>(
            "INSERT INTO password_resets (user_id, email, signature) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(reset.user_id)
        .bind(&reset.email)
        .bind(&reset.signature)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }
}

#[async_trait]
impl ProjectStore for PgStore {
    async fn list_projects_for_user(&self, user_id: i64, query: &ListQuery) -> StoreResult<Page<Project>> {
        QueryBuilder::<Project>::new("projects")?
            .join("project_users", "project_id")?
            .scoped("project_users", "user_id", user_id)?
            .list(&self.pool, query)
            .await
    }

    async fn find_project(&self, id: i64) -> StoreResult<Option<Project>> {
        let row = sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn create_project(&self, project: NewProject) -> StoreResult<Project> {
        // Project row and creator membership commit together
        let row = sqlx::query_as::<_, Project>(
            "WITH inserted AS ( \
                INSERT INTO projects (name, description, created_by_user_id) VALUES ($1, $2, $3) RETURNING * \
             ), attached AS ( \
                INSERT INTO project_users (project_id, user_id) SELECT id, created_by_user_id FROM inserted \
             ) \
             SELECT * FROM inserted",
        )
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.created_by_user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_project(&self, id: i64, changes: ProjectChanges) -> StoreResult<Project> {
        let mut project = self.find_project(id).await?.ok_or_else(|| not_found("project", id))?;
        project.merge(changes);

        sqlx::query_as::<_, Project>(
            "UPDATE projects SET name = $2, description = $3, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&project.name)
        .bind(&project.description)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found("project", id))
    }

    async fn delete_project(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_membership(&self, project_id: i64, user_id: i64) -> StoreResult<Option<ProjectMember>> {
        let row = sqlx::query_as::<_, ProjectMember>(
            "SELECT * FROM project_users WHERE project_id = $1 AND user_id = $2",
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}

#[async_trait]
impl CollectionStore for PgStore {
    async fn list_collections(&self, project_id: i64, query: &ListQuery) -> StoreResult<Page<Collection>> {
        QueryBuilder::<Collection>::new("collections")?
            .scoped("collections", "project_id", project_id)?
            .list(&self.pool, query)
            .await
    }

    async fn find_collection(&self, id: i64) -> StoreResult<Option<Collection>> {
        let row = sqlx::query_as::<_, Collection>("SELECT * FROM collections WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_collection_by_code(&self, project_id: i64, code: &str) -> StoreResult<Option<Collection>> {
        let row = sqlx::query_as::<_, Collection>(
            "SELECT * FROM collections WHERE project_id = $1 AND code = $2",
        )
        .bind(project_id)
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn create_collection(&self, collection: NewCollection) -> StoreResult<Collection> {
        let row = sqlx::query_as::<_, Collection>(
            "INSERT INTO collections (code, name, description, project_id, created_by_user_id) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(&collection.code)
        .bind(&collection.name)
        .bind(&collection.description)
        .bind(collection.project_id)
        .bind(collection.created_by_user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_collection(&self, id: i64, changes: CollectionChanges) -> StoreResult<Collection> {
        let mut collection = self.find_collection(id).await?.ok_or_else(|| not_found("collection", id))?;
        collection.merge(changes);

        sqlx::query_as::<_, Collection>(
            "UPDATE collections SET code = $2, name = $3, description = $4, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&collection.code)
        .bind(&collection.name)
        .bind(&collection.description)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found("collection", id))
    }

    async fn delete_collection(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM collections WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl KeyStore for PgStore {
    async fn list_keys(&self, collection_id: i64, query: &ListQuery) -> StoreResult<Page<Key>> {
        QueryBuilder::<Key>::new("keys")?
            .scoped("keys", "collection_id", collection_id)?
            .list(&self.pool, query)
            .await
    }

    async fn find_key(&self, id: i64) -> StoreResult<Option<Key>> {
        let row = sqlx::query_as::<_, Key>("SELECT * FROM keys WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_key_by_name(&self, collection_id: i64, key: &str) -> StoreResult<Option<Key>> {
        let row = sqlx::query_as::<_, Key>("SELECT * FROM keys WHERE collection_id = $1 AND key = $2")
            .bind(collection_id)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn create_key(&self, key: NewKey) -> StoreResult<Key> {
        let row = sqlx::query_as::<_, Key>("INSERT INTO keys (key, collection_id) VALUES ($1, $2) RETURNING *")
            .bind(&key.key)
            .bind(key.collection_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update_key(&self, id: i64, changes: KeyChanges) -> StoreResult<Key> {
        let mut key = self.find_key(id).await?.ok_or_else(|| not_found("key", id))?;
        key.merge(changes);

        sqlx::query_as::<_, Key>("UPDATE keys SET key = $2, updated_at = NOW() WHERE id = $1 RETURNING *")
            .bind(id)
            .bind(&key.key)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found("key", id))
    }

    async fn delete_key(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM keys WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl KeyValueStore for PgStore {
    async fn list_key_values(&self, key_id: i64, query: &ListQuery) -> StoreResult<Page<KeyValue>> {
        QueryBuilder::<KeyValue>::new("key_values")?
            .scoped("key_values", "key_id", key_id)?
            .list(&self.pool, query)
            .await
    }

    async fn find_key_value(&self, id: i64) -> StoreResult<Option<KeyValue>> {
        let row = sqlx::query_as::<_, KeyValue>("SELECT * FROM key_values WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_key_value_by_language(&self, key_id: i64, language: &str) -> StoreResult<Option<KeyValue>> {
        let row = sqlx::query_as::<_, KeyValue>(
            "SELECT * FROM key_values WHERE key_id = $1 AND language = $2",
        )
        .bind(key_id)
        .bind(language)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn create_key_value(&self, value: NewKeyValue) -> StoreResult<KeyValue> {
        let row = sqlx::query_as::<_, KeyValue>(
            "INSERT INTO key_values (value, language, key_id) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&value.value)
        .bind(&value.language)
        .bind(value.key_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_key_value(&self, id: i64, changes: KeyValueChanges) -> StoreResult<KeyValue> {
        let mut value = self.find_key_value(id).await?.ok_or_else(|| not_found("key value", id))?;
        value.merge(changes);

        sqlx::query_as::<_, KeyValue>(
            "UPDATE key_values SET value = $2, language = $3, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&value.value)
        .bind(&value.language)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found("key value", id))
    }

    async fn delete_key_value(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM key_values WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl LanguageStore for PgStore {
    async fn list_languages(&self, query: &ListQuery) -> StoreResult<Page<Language>> {
        QueryBuilder::<Language>::new("languages")?.list(&self.pool, query).await
    }

    async fn find_language_by_code(&self, code: &str) -> StoreResult<Option<Language>> {
        let row = sqlx::query_as::<_, Language>("SELECT * FROM languages WHERE code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
