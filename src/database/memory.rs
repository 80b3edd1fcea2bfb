use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    ApiToken, Collection, CollectionChanges, Key, KeyChanges, KeyValue, KeyValueChanges, Language, NewCollection,
    NewKey, NewKeyValue, NewPasswordReset, NewProject, NewUser, PasswordReset, Project, ProjectChanges,
    ProjectMember, User,
};
use crate::database::store::{
    CollectionStore, KeyStore, KeyValueStore, LanguageStore, ProjectStore, Store, StoreResult, UserStore,
};
use crate::filter::{Filterable, ListQuery, Page};

/// Languages available in a fresh store; mirrors the seed migration.
const SEED_LANGUAGES: &[(&str, &str)] = &[
    ("ar", "Arabic"),
    ("cs", "Czech"),
    ("da", "Danish"),
    ("de", "German"),
    ("el", "Greek"),
    ("en", "English"),
    ("es", "Spanish"),
    ("fi", "Finnish"),
    ("fr", "French"),
    ("he", "Hebrew"),
    ("hi", "Hindi"),
    ("hu", "Hungarian"),
    ("id", "Indonesian"),
    ("it", "Italian"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("nl", "Dutch"),
    ("no", "Norwegian"),
    ("pl", "Polish"),
    ("pt", "Portuguese"),
    ("ro", "Romanian"),
    ("ru", "Russian"),
    ("sv", "Swedish"),
    ("th", "Thai"),
    ("tr", "Turkish"),
    ("uk", "Ukrainian"),
    ("vi", "Vietnamese"),
    ("zh", "Chinese"),
];

#[derive(Default)]
struct Tables {
    sequences: HashMap<&'static str, i64>,
    users: BTreeMap<i64, User>,
    api_tokens: BTreeMap<i64, ApiToken>,
    password_resets: BTreeMap<i64, PasswordReset>,
    projects: BTreeMap<i64, Project>,
    project_users: Vec<ProjectMember>,
    collections: BTreeMap<i64, Collection>,
    keys: BTreeMap<i64, Key>,
    key_values: BTreeMap<i64, KeyValue>,
    languages: BTreeMap<i64, Language>,
}

impl Tables {
    fn next_id(&mut self, table: &'static str) -> i64 {
        let id = self.sequences.entry(table).or_insert(0);
        *id += 1;
        *id
    }

    fn delete_project_cascade(&mut self, id: i64) -> bool {
        if self.projects.remove(&id).is_none() {
            return false;
        }
        self.project_users.retain(|m| m.project_id != id);
        let collection_ids: Vec<i64> =
            self.collections.values().filter(|c| c.project_id == id).map(|c| c.id).collect();
        for collection_id in collection_ids {
            self.delete_collection_cascade(collection_id);
        }
        true
    }

    fn delete_collection_cascade(&mut self, id: i64) -> bool {
        if self.collections.remove(&id).is_none() {
            return false;
        }
        let key_ids: Vec<i64> = self.keys.values().filter(|k| k.collection_id == id).map(|k| k.id).collect();
        for key_id in key_ids {
            self.delete_key_cascade(key_id);
        }
        true
    }

    fn delete_key_cascade(&mut self, id: i64) -> bool {
        if self.keys.remove(&id).is_none() {
            return false;
        }
        self.key_values.retain(|_, v| v.key_id != id);
        true
    }

    fn ensure_user(&self, id: i64) -> StoreResult<()> {
        if self.users.contains_key(&id) {
            Ok(())
        } else {
            Err(DatabaseError::NotFound(format!("user {}", id)))
        }
    }
}

fn unique_violation(constraint: &str) -> DatabaseError {
    DatabaseError::UniqueViolation(constraint.to_string())
}

fn not_found(what: &str, id: i64) -> DatabaseError {
    DatabaseError::NotFound(format!("{} {}", what, id))
}

fn page_of<'a, T, I>(rows: I, query: &ListQuery) -> Page<T>
where
    T: Filterable + Clone + 'a,
    I: Iterator<Item = &'a T>,
{
    let matched: Vec<T> = rows.filter(|row| query.filter.matches(*row)).cloned().collect();
    Page::from_rows(matched, query.pagination)
}

/// Process-local store with the same constraints and cascades as the
/// Postgres schema. Rows are kept in id order.
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let mut tables = Tables::default();
        for (code, name) in SEED_LANGUAGES {
            let id = tables.next_id("languages");
            tables.languages.insert(id, Language { id, code: code.to_string(), name: name.to_string() });
        }
        Self { tables: RwLock::new(tables) }
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut t = self.tables.write().await;
        if t.users.values().any(|u| u.email == user.email) {
            return Err(unique_violation("users_email_unique"));
        }
        let id = t.next_id("users");
        let now = Utc::now();
        let row = User {
            id,
            name: user.name,
            email: user.email,
            password: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        t.users.insert(id, row.clone());
        Ok(row)
    }

    async fn find_user(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.values().find(|u| u.email == email).cloned())
    }

    async fn update_user_password(&self, id: i64, password_hash: &str) -> StoreResult<User> {
        let mut t = self.tables.write().await;
        let user = t.users.get_mut(&id).ok_or_else(|| not_found("user", id))?;
        user.password = password_hash.to_string();
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn create_api_token(&self, user_id: i64, jti: Uuid, expires_at: DateTime<Utc>) -> StoreResult<ApiToken> {
        let mut t = self.tables.write().await;
        t.ensure_user(user_id)?;
        if t.api_tokens.values().any(|tok| tok.jti == jti) {
            return Err(unique_violation("api_tokens_jti_unique"));
        }
        let id = t.next_id("api_tokens");
        let row = ApiToken { id, user_id, jti, expires_at, created_at: Utc::now() };
        t.api_tokens.insert(id, row.clone());
        Ok(row)
    }

    async fn find_api_token(&self, jti: Uuid) -> StoreResult<Option<ApiToken>> {
        Ok(self.tables.read().await.api_tokens.values().find(|tok| tok.jti == jti).cloned())
    }

    async fn delete_api_token(&self, jti: Uuid) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        let before = t.api_tokens.len();
        t.api_tokens.retain(|_, tok| tok.jti != jti);
        Ok(t.api_tokens.len() < before)
    }

    async fn delete_api_tokens_for_user(&self, user_id: i64) -> StoreResult<u64> {
        let mut t = self.tables.write().await;
        let before = t.api_tokens.len();
        t.api_tokens.retain(|_, tok| tok.user_id != user_id);
        Ok((before - t.api_tokens.len()) as u64)
    }

    async fn create_password_reset(&self, reset: NewPasswordReset) -> StoreResult<PasswordReset> {
        let mut t = self.tables.write().await;
        t.ensure_user(reset.user_id)?;
        let id = t.next_id("password_resets");
        let now = Utc::now();
        let row = PasswordReset {
            id,
            user_id: reset.user_id,
            email: reset.email,
            signature: reset.signature,
            created_at: now,
            updated_at: now,
        };
        t.password_resets.insert(id, row.clone());
        Ok(row)
    }
}

#[async_trait]
impl ProjectStore for MemoryStore {
    async fn list_projects_for_user(&self, user_id: i64, query: &ListQuery) -> StoreResult<Page<Project>> {
        let t = self.tables.read().await;
        let rows = t
            .projects
            .values()
            .filter(|p| t.project_users.iter().any(|m| m.project_id == p.id && m.user_id == user_id));
        Ok(page_of(rows, query))
    }

    async fn find_project(&self, id: i64) -> StoreResult<Option<Project>> {
        Ok(self.tables.read().await.projects.get(&id).cloned())
    }

    async fn create_project(&self, project: NewProject) -> StoreResult<Project> {
        let mut t = self.tables.write().await;
        t.ensure_user(project.created_by_user_id)?;
        let id = t.next_id("projects");
        let now = Utc::now();
        let row = Project {
            id,
            name: project.name,
            description: project.description,
            created_by_user_id: project.created_by_user_id,
            created_at: now,
            updated_at: now,
        };
        t.projects.insert(id, row.clone());
        t.project_users.push(ProjectMember { project_id: id, user_id: row.created_by_user_id, created_at: now });
        Ok(row)
    }

    async fn update_project(&self, id: i64, changes: ProjectChanges) -> StoreResult<Project> {
        let mut t = self.tables.write().await;
        let project = t.projects.get_mut(&id).ok_or_else(|| not_found("project", id))?;
        project.merge(changes);
        project.updated_at = Utc::now();
        Ok(project.clone())
    }

    async fn delete_project(&self, id: i64) -> StoreResult<bool> {
        Ok(self.tables.write().await.delete_project_cascade(id))
    }

    async fn find_membership(&self, project_id: i64, user_id: i64) -> StoreResult<Option<ProjectMember>> {
        let t = self.tables.read().await;
        Ok(t.project_users.iter().find(|m| m.project_id == project_id && m.user_id == user_id).cloned())
    }
}

#[async_trait]
impl CollectionStore for MemoryStore {
    async fn list_collections(&self, project_id: i64, query: &ListQuery) -> StoreResult<Page<Collection>> {
        let t = self.tables.read().await;
        Ok(page_of(t.collections.values().filter(|c| c.project_id == project_id), query))
    }

    async fn find_collection(&self, id: i64) -> StoreResult<Option<Collection>> {
        Ok(self.tables.read().await.collections.get(&id).cloned())
    }

    async fn find_collection_by_code(&self, project_id: i64, code: &str) -> StoreResult<Option<Collection>> {
        let t = self.tables.read().await;
        Ok(t.collections.values().find(|c| c.project_id == project_id && c.code == code).cloned())
    }

    async fn create_collection(&self, collection: NewCollection) -> StoreResult<Collection> {
        let mut t = self.tables.write().await;
        if !t.projects.contains_key(&collection.project_id) {
            return Err(not_found("project", collection.project_id));
        }
        t.ensure_user(collection.created_by_user_id)?;
        if t.collections.values().any(|c| c.project_id == collection.project_id && c.code == collection.code) {
            return Err(unique_violation("collections_project_code_unique"));
        }
        let id = t.next_id("collections");
        let now = Utc::now();
        let row = Collection {
            id,
            code: collection.code,
            name: collection.name,
            description: collection.description,
            project_id: collection.project_id,
            created_by_user_id: collection.created_by_user_id,
            created_at: now,
            updated_at: now,
        };
        t.collections.insert(id, row.clone());
        Ok(row)
    }

    async fn update_collection(&self, id: i64, changes: CollectionChanges) -> StoreResult<Collection> {
        let mut t = self.tables.write().await;
        let mut updated = t.collections.get(&id).cloned().ok_or_else(|| not_found("collection", id))?;
        updated.merge(changes);
        if t.collections.values().any(|c| c.id != id && c.project_id == updated.project_id && c.code == updated.code) {
            return Err(unique_violation("collections_project_code_unique"));
        }
        updated.updated_at = Utc::now();
        t.collections.insert(id, updated.clone());
        Ok(updated)
    }

    async fn delete_collection(&self, id: i64) -> StoreResult<bool> {
        Ok(self.tables.write().await.delete_collection_cascade(id))
    }
}

#[async_trait]
impl KeyStore for MemoryStore {
    async fn list_keys(&self, collection_id: i64, query: &ListQuery) -> StoreResult<Page<Key>> {
        let t = self.tables.read().await;
        Ok(page_of(t.keys.values().filter(|k| k.collection_id == collection_id), query))
    }

    async fn find_key(&self, id: i64) -> StoreResult<Option<Key>> {
        Ok(self.tables.read().await.keys.get(&id).cloned())
    }

    async fn find_key_by_name(&self, collection_id: i64, key: &str) -> StoreResult<Option<Key>> {
        let t = self.tables.read().await;
        Ok(t.keys.values().find(|k| k.collection_id == collection_id && k.key == key).cloned())
    }

    async fn create_key(&self, key: NewKey) -> StoreResult<Key> {
        let mut t = self.tables.write().await;
        if !t.collections.contains_key(&key.collection_id) {
            return Err(not_found("collection", key.collection_id));
        }
        if t.keys.values().any(|k| k.collection_id == key.collection_id && k.key == key.key) {
            return Err(unique_violation("keys_collection_key_unique"));
        }
        let id = t.next_id("keys");
        let now = Utc::now();
        let row = Key { id, key: key.key, collection_id: key.collection_id, created_at: now, updated_at: now };
        t.keys.insert(id, row.clone());
        Ok(row)
    }

    async fn update_key(&self, id: i64, changes: KeyChanges) -> StoreResult<Key> {
        let mut t = self.tables.write().await;
        let mut updated = t.keys.get(&id).cloned().ok_or_else(|| not_found("key", id))?;
        updated.merge(changes);
        if t.keys.values().any(|k| k.id != id && k.collection_id == updated.collection_id && k.key == updated.key) {
            return Err(unique_violation("keys_collection_key_unique"));
        }
        updated.updated_at = Utc::now();
        t.keys.insert(id, updated.clone());
        Ok(updated)
    }

    async fn delete_key(&self, id: i64) -> StoreResult<bool> {
        Ok(self.tables.write().await.delete_key_cascade(id))
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn list_key_values(&self, key_id: i64, query: &ListQuery) -> StoreResult<Page<KeyValue>> {
        let t = self.tables.read().await;
        Ok(page_of(t.key_values.values().filter(|v| v.key_id == key_id), query))
    }

    async fn find_key_value(&self, id: i64) -> StoreResult<Option<KeyValue>> {
        Ok(self.tables.read().await.key_values.get(&id).cloned())
    }

    async fn find_key_value_by_language(&self, key_id: i64, language: &str) -> StoreResult<Option<KeyValue>> {
        let t = self.tables.read().await;
        Ok(t.key_values.values().find(|v| v.key_id == key_id && v.language == language).cloned())
    }

    async fn create_key_value(&self, value: NewKeyValue) -> StoreResult<KeyValue> {
        let mut t = self.tables.write().await;
        if !t.keys.contains_key(&value.key_id) {
            return Err(not_found("key", value.key_id));
        }
        if t.key_values.values().any(|v| v.key_id == value.key_id && v.language == value.language) {
            return Err(unique_violation("key_values_key_language_unique"));
        }
        let id = t.next_id("key_values");
        let now = Utc::now();
        let row = KeyValue {
            id,
            value: value.value,
            language: value.language,
            key_id: value.key_id,
            created_at: now,
            updated_at: now,
        };
        t.key_values.insert(id, row.clone());
        Ok(row)
    }

    async fn update_key_value(&self, id: i64, changes: KeyValueChanges) -> StoreResult<KeyValue> {
        let mut t = self.tables.write().await;
        let mut updated = t.key_values.get(&id).cloned().ok_or_else(|| not_found("key value", id))?;
        updated.merge(changes);
        if t.key_values.values().any(|v| v.id != id && v.key_id == updated.key_id && v.language == updated.language) {
            return Err(unique_violation("key_values_key_language_unique"));
        }
        updated.updated_at = Utc::now();
        t.key_values.insert(id, updated.clone());
        Ok(updated)
    }

    async fn delete_key_value(&self, id: i64) -> StoreResult<bool> {
        Ok(self.tables.write().await.key_values.remove(&id).is_some())
    }
}

#[async_trait]
impl LanguageStore for MemoryStore {
    async fn list_languages(&self, query: &ListQuery) -> StoreResult<Page<Language>> {
        let t = self.tables.read().await;
        Ok(page_of(t.languages.values(), query))
    }

    async fn find_language_by_code(&self, code: &str) -> StoreResult<Option<Language>> {
        Ok(self.tables.read().await.languages.values().find(|l| l.code == code).cloned())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> StoreResult<()> {
        let _ = self.tables.read().await;
        Ok(())
    }
}

impl Filterable for Project {
    fn field(&self, column: &str) -> Option<&str> {
        match column {
            "name" => Some(&self.name),
            "description" => self.description.as_deref(),
            _ => None,
        }
    }
}

impl Filterable for Collection {
    fn field(&self, column: &str) -> Option<&str> {
        match column {
            "name" => Some(&self.name),
            "code" => Some(&self.code),
            "description" => self.description.as_deref(),
            _ => None,
        }
    }
}

impl Filterable for Key {
    fn field(&self, column: &str) -> Option<&str> {
        match column {
            "key" => Some(&self.key),
            _ => None,
        }
    }
}

impl Filterable for KeyValue {
    fn field(&self, column: &str) -> Option<&str> {
        match column {
            "value" => Some(&self.value),
            "language" => Some(&self.language),
            _ => None,
        }
    }
}

impl Filterable for Language {
    fn field(&self, column: &str) -> Option<&str> {
        match column {
            "name" => Some(&self.name),
            "code" => Some(&self.code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{Filter, FilterField, Pagination};

    async fn seeded() -> (MemoryStore, User, Project) {
        let store = MemoryStore::new();
        let user = store
            .create_user(NewUser { name: "Ada".into(), email: "ada@example.com".into(), password_hash: "x".into() })
            .await
            .unwrap();
        let project = store
            .create_project(NewProject { name: "Site".into(), description: None, created_by_user_id: user.id })
            .await
            .unwrap();
        (store, user, project)
    }

    fn new_collection(project_id: i64, user_id: i64, code: &str) -> NewCollection {
        NewCollection {
            code: code.into(),
            name: format!("{} strings", code),
            description: None,
            project_id,
            created_by_user_id: user_id,
        }
    }

    #[tokio::test]
    async fn creator_is_attached_as_member() {
        let (store, user, project) = seeded().await;
        assert!(store.find_membership(project.id, user.id).await.unwrap().is_some());

        let listed = store.list_projects_for_user(user.id, &ListQuery::default()).await.unwrap();
        assert_eq!(listed.meta.total, 1);
        assert_eq!(listed.data[0].id, project.id);
    }

    #[tokio::test]
    async fn duplicate_email_is_a_unique_violation() {
        let (store, _, _) = seeded().await;
        let err = store
            .create_user(NewUser { name: "Other".into(), email: "ada@example.com".into(), password_hash: "y".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::UniqueViolation(_)));
    }

    #[tokio::test]
    async fn collection_code_is_unique_per_project_only() {
        let (store, user, project) = seeded().await;
        let other = store
            .create_project(NewProject { name: "App".into(), description: None, created_by_user_id: user.id })
            .await
            .unwrap();

        store.create_collection(new_collection(project.id, user.id, "X")).await.unwrap();
        let err = store.create_collection(new_collection(project.id, user.id, "X")).await.unwrap_err();
        assert!(matches!(err, DatabaseError::UniqueViolation(_)));
        store.create_collection(new_collection(other.id, user.id, "X")).await.unwrap();
    }

    #[tokio::test]
    async fn update_to_own_code_is_not_a_violation() {
        let (store, user, project) = seeded().await;
        let c = store.create_collection(new_collection(project.id, user.id, "X")).await.unwrap();
        let changes = CollectionChanges { code: Some("X".into()), name: Some("Renamed".into()), description: None };
        let updated = store.update_collection(c.id, changes).await.unwrap();
        assert_eq!(updated.name, "Renamed");
    }

    #[tokio::test]
    async fn deleting_a_project_cascades() {
        let (store, user, project) = seeded().await;
        let c = store.create_collection(new_collection(project.id, user.id, "X")).await.unwrap();
        let k = store.create_key(NewKey { key: "greeting".into(), collection_id: c.id }).await.unwrap();
        let v = store
            .create_key_value(NewKeyValue { value: "Hello".into(), language: "en".into(), key_id: k.id })
            .await
            .unwrap();

        assert!(store.delete_project(project.id).await.unwrap());
        assert!(store.find_membership(project.id, user.id).await.unwrap().is_none());
        assert!(store.find_collection(c.id).await.unwrap().is_none());
        assert!(store.find_key(k.id).await.unwrap().is_none());
        assert!(store.find_key_value(v.id).await.unwrap().is_none());
        assert!(!store.delete_project(project.id).await.unwrap());
    }

    #[tokio::test]
    async fn list_applies_filter_then_window() {
        let (store, user, project) = seeded().await;
        for code in ["alpha", "beta", "alphabet"] {
            store.create_collection(new_collection(project.id, user.id, code)).await.unwrap();
        }
        let filter = Filter::from_fields([FilterField::contains("name", Some("alpha"))]);
        let query = ListQuery::new(filter, Pagination { page: 1, limit: 1 });

        let page = store.list_collections(project.id, &query).await.unwrap();
        assert_eq!(page.meta.total, 2);
        assert_eq!(page.meta.last_page, 2);
        assert_eq!(page.data[0].code, "alpha");
    }

    #[tokio::test]
    async fn languages_are_seeded() {
        let store = MemoryStore::new();
        let en = store.find_language_by_code("en").await.unwrap().unwrap();
        assert_eq!(en.name, "English");
    }

    #[tokio::test]
    async fn revoking_user_tokens_leaves_others() {
        let (store, user, _) = seeded().await;
        let other = store
            .create_user(NewUser { name: "Bob".into(), email: "bob@example.com".into(), password_hash: "z".into() })
            .await
            .unwrap();
        let expires = Utc::now() + chrono::Duration::hours(1);
        store.create_api_token(user.id, Uuid::new_v4(), expires).await.unwrap();
        store.create_api_token(user.id, Uuid::new_v4(), expires).await.unwrap();
        let kept = store.create_api_token(other.id, Uuid::new_v4(), expires).await.unwrap();

        assert_eq!(store.delete_api_tokens_for_user(user.id).await.unwrap(), 2);
        assert!(store.find_api_token(kept.jti).await.unwrap().is_some());
    }
}
