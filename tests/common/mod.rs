#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::{json, Value};

use polyglot_api::database::MemoryStore;
use polyglot_api::{app, AppState};

/// Router served in-process on a free port, backed by a fresh in-memory store
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: Client,
}

impl TestServer {
    async fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test port")?;
        let router = app(AppState::new(Arc::new(MemoryStore::new())));
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Ok(Self { port, base_url, client: Client::new() })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn get(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.get(self.url(path)).bearer_auth(token)
    }

    pub fn post(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.post(self.url(path)).bearer_auth(token)
    }

    pub fn patch(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.patch(self.url(path)).bearer_auth(token)
    }

    pub fn delete(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.delete(self.url(path)).bearer_auth(token)
    }
}

pub async fn ensure_server() -> Result<TestServer> {
    let server = TestServer::spawn().await?;
    server.wait_ready(Duration::from_secs(5)).await?;
    Ok(server)
}

/// Signed-up and signed-in account
pub struct TestUser {
    pub id: i64,
    pub email: String,
    pub password: String,
    pub token: String,
}

pub async fn sign_up(server: &TestServer, name: &str, email: &str, password: &str) -> Result<Response> {
    Ok(server
        .client
        .post(server.url("/auth/sign-up"))
        .json(&json!({
            "name": name,
            "email": email,
            "password": password,
            "password_confirmation": password
        }))
        .send()
        .await?)
}

pub async fn sign_in(server: &TestServer, email: &str, password: &str) -> Result<Response> {
    Ok(server
        .client
        .post(server.url("/auth/sign-in"))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await?)
}

pub async fn register(server: &TestServer, name: &str) -> Result<TestUser> {
    let email = format!("{}@example.com", name.to_lowercase());
    let password = format!("{}-password", name);

    let res = sign_up(server, name, &email, &password).await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "sign-up failed: {}", res.status());
    let id = data(res).await?["id"].as_i64().context("user id")?;

    let res = sign_in(server, &email, &password).await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "sign-in failed: {}", res.status());
    let token = data(res).await?["token"].as_str().context("token")?.to_string();

    Ok(TestUser { id, email, password, token })
}

/// `data` of a success envelope
pub async fn data(res: Response) -> Result<Value> {
    let body = res.json::<Value>().await?;
    anyhow::ensure!(body["success"] == json!(true), "not a success envelope: {}", body);
    Ok(body["data"].clone())
}

/// `code` of an error body
pub async fn error_code(res: Response) -> Result<String> {
    let body = res.json::<Value>().await?;
    Ok(body["code"].as_str().unwrap_or_default().to_string())
}

pub async fn create_project(server: &TestServer, user: &TestUser, name: &str) -> Result<Value> {
    let res = server.post("/projects", &user.token).json(&json!({ "name": name })).send().await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "project create failed: {}", res.status());
    data(res).await
}

pub async fn create_collection(server: &TestServer, user: &TestUser, project_id: i64, code: &str, name: &str) -> Result<Value> {
    let res = server
        .post(&format!("/projects/{}/collections", project_id), &user.token)
        .json(&json!({ "code": code, "name": name }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "collection create failed: {}", res.status());
    data(res).await
}

pub async fn create_key(server: &TestServer, user: &TestUser, project_id: i64, collection_id: i64, key: &str) -> Result<Value> {
    let res = server
        .post(&format!("/projects/{}/collections/{}/keys", project_id, collection_id), &user.token)
        .json(&json!({ "key": key }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "key create failed: {}", res.status());
    data(res).await
}

pub fn id(value: &Value) -> i64 {
    value["id"].as_i64().unwrap_or_default()
}
