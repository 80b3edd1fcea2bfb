mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

struct Fixture {
    server: common::TestServer,
    ada: common::TestUser,
    project: i64,
    collection: i64,
}

impl Fixture {
    async fn new() -> Result<Self> {
        let server = common::ensure_server().await?;
        let ada = common::register(&server, "Ada").await?;
        let project = common::id(&common::create_project(&server, &ada, "Site").await?);
        let collection = common::id(&common::create_collection(&server, &ada, project, "web", "Web").await?);
        Ok(Self { server, ada, project, collection })
    }

    fn keys(&self) -> String {
        format!("/projects/{}/collections/{}/keys", self.project, self.collection)
    }

    fn values(&self, key: i64) -> String {
        format!("{}/{}/values", self.keys(), key)
    }
}

#[tokio::test]
async fn key_is_unique_per_collection() -> Result<()> {
    let f = Fixture::new().await?;
    let key = common::create_key(&f.server, &f.ada, f.project, f.collection, "greeting").await?;
    assert_eq!(key["collection_id"], f.collection);

    let res = f.server.post(&f.keys(), &f.ada.token).json(&json!({ "key": "greeting" })).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(common::error_code(res).await?, "E_ALREADY_EXISTS");

    let other = common::id(&common::create_collection(&f.server, &f.ada, f.project, "app", "App").await?);
    common::create_key(&f.server, &f.ada, f.project, other, "greeting").await?;
    Ok(())
}

#[tokio::test]
async fn key_update_and_delete() -> Result<()> {
    let f = Fixture::new().await?;
    let key = common::id(&common::create_key(&f.server, &f.ada, f.project, f.collection, "greeting").await?);
    let path = format!("{}/{}", f.keys(), key);

    let updated = common::data(f.server.patch(&path, &f.ada.token).json(&json!({ "key": "hello" })).send().await?).await?;
    assert_eq!(updated["key"], "hello");

    let listed = common::data(f.server.get(&format!("{}?key=ell", f.keys()), &f.ada.token).send().await?).await?;
    assert_eq!(listed["meta"]["total"], 1);

    let res = f.server.delete(&path, &f.ada.token).send().await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    let res = f.server.get(&path, &f.ada.token).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn one_value_per_language() -> Result<()> {
    let f = Fixture::new().await?;
    let key = common::id(&common::create_key(&f.server, &f.ada, f.project, f.collection, "greeting").await?);

    let res = f
        .server
        .post(&f.values(key), &f.ada.token)
        .json(&json!({ "value": "Hello", "language": "en" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let en = common::data(res).await?;
    assert_eq!(en["key_id"], key);

    let res = f
        .server
        .post(&f.values(key), &f.ada.token)
        .json(&json!({ "value": "Hi", "language": "en" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(common::error_code(res).await?, "E_ALREADY_EXISTS");

    let fr = common::data(
        f.server
            .post(&f.values(key), &f.ada.token)
            .json(&json!({ "value": "Bonjour", "language": "fr" }))
            .send()
            .await?,
    )
    .await?;

    // Moving French onto English collides; changing only the text does not
    let fr_path = format!("{}/{}", f.values(key), common::id(&fr));
    let res = f.server.patch(&fr_path, &f.ada.token).json(&json!({ "language": "en" })).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let res = f.server.patch(&fr_path, &f.ada.token).json(&json!({ "value": "Salut" })).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(common::data(res).await?["value"], "Salut");

    let listed = common::data(f.server.get(&format!("{}?language=fr", f.values(key)), &f.ada.token).send().await?).await?;
    assert_eq!(listed["meta"]["total"], 1);
    assert_eq!(listed["data"][0]["value"], "Salut");
    Ok(())
}

#[tokio::test]
async fn value_requires_text_and_language() -> Result<()> {
    let f = Fixture::new().await?;
    let key = common::id(&common::create_key(&f.server, &f.ada, f.project, f.collection, "greeting").await?);

    let res = f.server.post(&f.values(key), &f.ada.token).json(&json!({ "value": "Hello" })).send().await?;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = res.json::<serde_json::Value>().await?;
    assert!(body["field_errors"].get("language").is_some());
    Ok(())
}

#[tokio::test]
async fn overlong_language_is_a_validation_failure() -> Result<()> {
    let f = Fixture::new().await?;
    let key = common::id(&common::create_key(&f.server, &f.ada, f.project, f.collection, "greeting").await?);

    let res = f
        .server
        .post(&f.values(key), &f.ada.token)
        .json(&json!({ "value": "Hello", "language": "x".repeat(256) }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["field_errors"]["language"], "max_length validation failed");

    let res = f
        .server
        .post(&f.values(key), &f.ada.token)
        .json(&json!({ "value": "Hello", "language": "en-Latn-GB-oxendict" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    Ok(())
}

#[tokio::test]
async fn value_under_wrong_key_is_denied() -> Result<()> {
    let f = Fixture::new().await?;
    let greeting = common::id(&common::create_key(&f.server, &f.ada, f.project, f.collection, "greeting").await?);
    let farewell = common::id(&common::create_key(&f.server, &f.ada, f.project, f.collection, "farewell").await?);
    let value = common::data(
        f.server
            .post(&f.values(greeting), &f.ada.token)
            .json(&json!({ "value": "Hello", "language": "en" }))
            .send()
            .await?,
    )
    .await?;

    let res = f
        .server
        .get(&format!("{}/{}", f.values(farewell), common::id(&value)), &f.ada.token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn outsider_cannot_touch_values() -> Result<()> {
    let f = Fixture::new().await?;
    let bob = common::register(&f.server, "Bob").await?;
    let key = common::id(&common::create_key(&f.server, &f.ada, f.project, f.collection, "greeting").await?);

    let res = f.server.get(&f.values(key), &bob.token).send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = f
        .server
        .post(&f.values(key), &bob.token)
        .json(&json!({ "value": "Hello", "language": "en" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn deleting_a_key_removes_its_values() -> Result<()> {
    let f = Fixture::new().await?;
    let key = common::id(&common::create_key(&f.server, &f.ada, f.project, f.collection, "greeting").await?);
    let value = common::data(
        f.server
            .post(&f.values(key), &f.ada.token)
            .json(&json!({ "value": "Hello", "language": "en" }))
            .send()
            .await?,
    )
    .await?;
    let value_path = format!("{}/{}", f.values(key), common::id(&value));

    let res = f.server.delete(&value_path, &f.ada.token).send().await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    let res = f.server.get(&value_path, &f.ada.token).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    f.server
        .post(&f.values(key), &f.ada.token)
        .json(&json!({ "value": "Hello", "language": "en" }))
        .send()
        .await?;
    let res = f.server.delete(&format!("{}/{}", f.keys(), key), &f.ada.token).send().await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    let res = f.server.get(&f.values(key), &f.ada.token).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}
