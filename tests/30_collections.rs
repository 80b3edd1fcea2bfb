mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn code_is_unique_within_a_project_only() -> Result<()> {
    let server = common::ensure_server().await?;
    let ada = common::register(&server, "Ada").await?;
    let first = common::id(&common::create_project(&server, &ada, "First").await?);
    let second = common::id(&common::create_project(&server, &ada, "Second").await?);

    let created = common::create_collection(&server, &ada, first, "web", "Web").await?;
    assert_eq!(created["project_id"], first);

    let res = server
        .post(&format!("/projects/{}/collections", first), &ada.token)
        .json(&json!({ "code": "web", "name": "Again" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(common::error_code(res).await?, "E_ALREADY_EXISTS");

    common::create_collection(&server, &ada, second, "web", "Web").await?;
    Ok(())
}

#[tokio::test]
async fn update_checks_code_against_siblings_but_not_self() -> Result<()> {
    let server = common::ensure_server().await?;
    let ada = common::register(&server, "Ada").await?;
    let project = common::id(&common::create_project(&server, &ada, "Site").await?);
    common::create_collection(&server, &ada, project, "web", "Web").await?;
    let mobile = common::create_collection(&server, &ada, project, "mobile", "Mobile").await?;
    let path = format!("/projects/{}/collections/{}", project, common::id(&mobile));

    let res = server.patch(&path, &ada.token).json(&json!({ "code": "web" })).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(common::error_code(res).await?, "E_ALREADY_EXISTS");

    let res = server
        .patch(&path, &ada.token)
        .json(&json!({ "code": "mobile", "name": "Phones" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let updated = common::data(res).await?;
    assert_eq!(updated["name"], "Phones");
    assert_eq!(updated["code"], "mobile");
    Ok(())
}

#[tokio::test]
async fn collection_under_wrong_project_is_denied() -> Result<()> {
    let server = common::ensure_server().await?;
    let ada = common::register(&server, "Ada").await?;
    let bob = common::register(&server, "Bob").await?;
    let ada_project = common::id(&common::create_project(&server, &ada, "Ada's").await?);
    let bob_project = common::id(&common::create_project(&server, &bob, "Bob's").await?);
    let bob_collection = common::id(&common::create_collection(&server, &bob, bob_project, "web", "Web").await?);

    // Member of the path's project, but the collection lives elsewhere
    let res = server
        .get(&format!("/projects/{}/collections/{}", ada_project, bob_collection), &ada.token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server.get(&format!("/projects/{}/collections", bob_project), &ada.token).send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server
        .post(&format!("/projects/{}/collections", bob_project), &ada.token)
        .json(&json!({ "code": "x", "name": "X" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn missing_collection_is_not_found() -> Result<()> {
    let server = common::ensure_server().await?;
    let ada = common::register(&server, "Ada").await?;
    let project = common::id(&common::create_project(&server, &ada, "Site").await?);

    let res = server.get(&format!("/projects/{}/collections/999", project), &ada.token).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn deleting_a_project_removes_its_collections() -> Result<()> {
    let server = common::ensure_server().await?;
    let ada = common::register(&server, "Ada").await?;
    let project = common::id(&common::create_project(&server, &ada, "Site").await?);
    let collection = common::id(&common::create_collection(&server, &ada, project, "web", "Web").await?);
    common::create_key(&server, &ada, project, collection, "greeting").await?;

    let res = server.delete(&format!("/projects/{}", project), &ada.token).send().await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = server
        .get(&format!("/projects/{}/collections/{}", project, collection), &ada.token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}
