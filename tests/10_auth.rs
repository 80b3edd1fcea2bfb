mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = server.client.get(server.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let data = common::data(res).await?;
    assert_eq!(data["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn sign_up_hides_password_and_rejects_taken_email() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = common::sign_up(&server, "Ada", "ada@example.com", "secret-pw").await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let user = common::data(res).await?;
    assert_eq!(user["email"], "ada@example.com");
    assert!(user.get("password").is_none(), "password leaked: {}", user);

    let res = common::sign_up(&server, "Imposter", "ada@example.com", "other-pw").await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(common::error_code(res).await?, "E_ALREADY_EXISTS");
    Ok(())
}

#[tokio::test]
async fn sign_up_validation_failure_lists_fields() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = server
        .client
        .post(server.url("/auth/sign-up"))
        .json(&json!({ "email": "nope", "password": "a", "password_confirmation": "b" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "E_VALIDATION_FAILURE");
    for field in ["name", "email", "password_confirmation"] {
        assert!(body["field_errors"].get(field).is_some(), "missing {} in {}", field, body);
    }
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_invalid_json() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = server
        .client
        .post(server.url("/auth/sign-up"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(common::error_code(res).await?, "E_INVALID_JSON");
    Ok(())
}

#[tokio::test]
async fn sign_in_issues_bearer_token() -> Result<()> {
    let server = common::ensure_server().await?;
    common::sign_up(&server, "Ada", "ada@example.com", "secret-pw").await?;

    let res = common::sign_in(&server, "ada@example.com", "secret-pw").await?;
    assert_eq!(res.status(), StatusCode::OK);
    let token = common::data(res).await?;
    assert_eq!(token["type"], "bearer");
    assert!(token["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert!(token["expires_at"].is_string());
    Ok(())
}

#[tokio::test]
async fn bad_credentials_are_indistinguishable() -> Result<()> {
    let server = common::ensure_server().await?;
    common::sign_up(&server, "Ada", "ada@example.com", "secret-pw").await?;

    for (email, password) in [("ada@example.com", "wrong"), ("nobody@example.com", "secret-pw")] {
        let res = common::sign_in(&server, email, password).await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = res.json::<serde_json::Value>().await?;
        assert_eq!(body["message"], "Invalid credentials");
    }
    Ok(())
}

#[tokio::test]
async fn me_returns_current_user() -> Result<()> {
    let server = common::ensure_server().await?;
    let ada = common::register(&server, "Ada").await?;

    let res = server.post("/users/me", &ada.token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let me = common::data(res).await?;
    assert_eq!(me["id"], ada.id);
    assert_eq!(me["email"], ada.email.as_str());
    Ok(())
}

#[tokio::test]
async fn missing_and_garbage_tokens_are_unauthorized() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = server.client.post(server.url("/users/me")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(common::error_code(res).await?, "E_UNAUTHORIZED");

    let res = server.post("/users/me", "not.a.jwt").send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn logout_revokes_only_the_presenting_token() -> Result<()> {
    let server = common::ensure_server().await?;
    let ada = common::register(&server, "Ada").await?;
    let second = common::data(common::sign_in(&server, &ada.email, &ada.password).await?).await?;
    let second = second["token"].as_str().unwrap_or_default().to_string();

    let res = server.post("/auth/logout", &ada.token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(common::data(res).await?, json!({ "revoked": true }));

    let res = server.post("/users/me", &ada.token).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = server.post("/users/me", &second).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}
