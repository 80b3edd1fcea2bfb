//! Runs the store contract against a real database.
//!
//! `DATABASE_URL=postgres://... cargo test --test 60_postgres_store -- --ignored`

use anyhow::Result;
use polyglot_api::api::payloads::KeyValuePayload;
use polyglot_api::api::validation::MAX_STRING_LENGTH;
use polyglot_api::config::AppConfig;
use polyglot_api::database::models::{NewCollection, NewKey, NewKeyValue, NewProject, NewUser};
use polyglot_api::database::{
    CollectionStore, DatabaseError, DatabaseManager, KeyStore, KeyValueStore, PgStore, ProjectStore, UserStore,
};
use polyglot_api::error::ApiError;
use polyglot_api::filter::{Filter, FilterField, ListQuery, Pagination};
use polyglot_api::services::uniqueness;
use serde_json::json;

struct Seed {
    store: PgStore,
    user_id: i64,
    project_id: i64,
}

/// `None` when no database is configured.
async fn seed() -> Result<Option<Seed>> {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL not set, skipping");
        return Ok(None);
    }

    let config = AppConfig::from_env();
    let pool = DatabaseManager::connect(&config).await?;
    DatabaseManager::migrate(&pool).await?;
    let store = PgStore::new(pool);

    let user = store
        .create_user(NewUser {
            name: "Ada".to_string(),
            email: format!("ada-{}@example.com", uuid::Uuid::new_v4()),
            password_hash: "not-a-real-hash".to_string(),
        })
        .await?;
    let project = store
        .create_project(NewProject {
            name: "Site".to_string(),
            description: None,
            created_by_user_id: user.id,
        })
        .await?;

    Ok(Some(Seed { store, user_id: user.id, project_id: project.id }))
}

fn new_collection(seed: &Seed, code: &str, name: &str) -> NewCollection {
    NewCollection {
        code: code.to_string(),
        name: name.to_string(),
        description: None,
        project_id: seed.project_id,
        created_by_user_id: seed.user_id,
    }
}

fn name_query(input: &str) -> ListQuery {
    ListQuery::new(
        Filter::from_fields([FilterField::contains("name", Some(input))]),
        Pagination { page: 1, limit: 100 },
    )
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn collection_code_is_unique_per_project() -> Result<()> {
    let Some(seed) = seed().await? else {
        return Ok(());
    };

    let web = seed.store.create_collection(new_collection(&seed, "web", "Web")).await?;
    assert!(uniqueness::collection_code(&seed.store, seed.project_id, "web", Some(web.id)).await.is_ok());
    assert!(matches!(
        uniqueness::collection_code(&seed.store, seed.project_id, "web", None).await,
        Err(ApiError::AlreadyExists(_))
    ));

    // The constraint still holds when the guard is bypassed
    let err = seed.store.create_collection(new_collection(&seed, "web", "Again")).await.unwrap_err();
    assert!(matches!(err, DatabaseError::UniqueViolation(_)), "{:?}", err);
    Ok(())
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn name_filter_matches_wildcards_literally() -> Result<()> {
    let Some(seed) = seed().await? else {
        return Ok(());
    };

    seed.store.create_collection(new_collection(&seed, "abc", "abc")).await?;
    seed.store.create_collection(new_collection(&seed, "promo", "50% off")).await?;
    seed.store.create_collection(new_collection(&seed, "bulk", "500 items")).await?;

    let page = seed.store.list_collections(seed.project_id, &name_query("a_c")).await?;
    assert_eq!(page.meta.total, 0);

    let page = seed.store.list_collections(seed.project_id, &name_query("50%")).await?;
    let names: Vec<_> = page.data.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["50% off"]);

    let page = seed.store.list_collections(seed.project_id, &name_query("0")).await?;
    assert_eq!(page.meta.total, 2);
    Ok(())
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn language_column_holds_the_validated_maximum() -> Result<()> {
    let Some(seed) = seed().await? else {
        return Ok(());
    };

    let collection = seed.store.create_collection(new_collection(&seed, "web", "Web")).await?;
    let key = seed
        .store
        .create_key(NewKey { key: "greeting".to_string(), collection_id: collection.id })
        .await?;

    let longest = "x".repeat(MAX_STRING_LENGTH);
    let value = seed
        .store
        .create_key_value(NewKeyValue { value: "Hello".to_string(), language: longest.clone(), key_id: key.id })
        .await?;
    assert_eq!(value.language, longest);

    let payload: KeyValuePayload = serde_json::from_value(json!({
        "value": "Hello",
        "language": "x".repeat(MAX_STRING_LENGTH + 1)
    }))?;
    assert!(matches!(payload.validate_create(), Err(ApiError::ValidationFailure { .. })));
    Ok(())
}
