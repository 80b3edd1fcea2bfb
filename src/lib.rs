pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod policy;
pub mod services;

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, Method, StatusCode},
    middleware::from_fn_with_state,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::database::Store;
use crate::middleware::jwt_auth_middleware;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

/// Full application router
pub fn app(state: AppState) -> Router {
    let settings = config::config();

    let router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(public_routes())
        // Protected
        .merge(protected_routes(state.clone()))
        // Global middleware
        .layer(
            ServiceBuilder::new()
                .layer(cors_layer())
                .layer(DefaultBodyLimit::max(settings.api.max_request_size_bytes)),
        )
        .with_state(state);

    with_request_logging(router, settings.api.enable_request_logging)
}

fn with_request_logging(router: Router, enabled: bool) -> Router {
    if enabled {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

fn cors_layer() -> CorsLayer {
    let security = &config::config().security;

    if !security.enable_cors {
        return CorsLayer::new();
    }
    if crate::is_development!() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers(Any)
}

fn public_routes() -> Router<AppState> {
    use handlers::public::{auth, languages, password_reset};

    Router::new()
        .route("/auth/sign-up", post(auth::sign_up_post))
        .route("/auth/sign-in", post(auth::sign_in_post))
        .route("/forgot", post(password_reset::forgot_post))
        .route("/reset/:email", post(password_reset::verify_post))
        .route("/reset", post(password_reset::reset_post))
        .route("/common/languages", get(languages::languages_find))
        .route("/common/languages/:code", get(languages::language_show))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use handlers::protected::{auth, collections, key_values, keys, projects};

    // Sibling segments share one parameter name; the router rejects mixed names
    const PROJECT: &str = "/projects/:project_id";
    const COLLECTION: &str = "/projects/:project_id/collections/:collection_id";
    const KEY: &str = "/projects/:project_id/collections/:collection_id/keys/:key_id";

    Router::new()
        .route("/auth/logout", post(auth::logout_post))
        .route("/users/me", post(auth::me_post))
        .route("/projects", get(projects::projects_find).post(projects::project_create))
        .route(
            PROJECT,
            get(projects::project_find_by_id)
                .put(projects::project_update)
                .patch(projects::project_update)
                .delete(projects::project_delete),
        )
        .route(
            &format!("{}/collections", PROJECT),
            get(collections::collections_find).post(collections::collection_create),
        )
        .route(
            COLLECTION,
            get(collections::collection_find_by_id)
                .put(collections::collection_update)
                .patch(collections::collection_update)
                .delete(collections::collection_delete),
        )
        .route(&format!("{}/keys", COLLECTION), get(keys::keys_find).post(keys::key_create))
        .route(
            KEY,
            get(keys::key_find_by_id)
                .put(keys::key_update)
                .patch(keys::key_update)
                .delete(keys::key_delete),
        )
        .route(
            &format!("{}/values", KEY),
            get(key_values::key_values_find).post(key_values::key_value_create),
        )
        .route(
            &format!("{}/values/:id", KEY),
            get(key_values::key_value_find_by_id)
                .put(key_values::key_value_update)
                .patch(key_values::key_value_update)
                .delete(key_values::key_value_delete),
        )
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Polyglot API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Localization strings organized as projects, collections, keys and values",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "auth": "/auth/sign-up, /auth/sign-in (public), /auth/logout (protected)",
                "password_reset": "/forgot, /reset/:email, /reset (public)",
                "languages": "/common/languages[/:code] (public)",
                "users": "/users/me (protected)",
                "projects": "/projects[/:project_id] (protected)",
                "collections": "/projects/:project_id/collections[/:collection_id] (protected)",
                "keys": "/projects/:project_id/collections/:collection_id/keys[/:key_id] (protected)",
                "values": "/projects/:project_id/collections/:collection_id/keys/:key_id/values[/:id] (protected)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_app() -> Router {
        app(AppState::new(Arc::new(MemoryStore::new())))
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let response = test_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn request_logging_toggle_keeps_routes_intact() {
        for enabled in [true, false] {
            let router = with_request_logging(test_app(), enabled);
            let response = router
                .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "logging enabled: {}", enabled);
        }
    }

    #[tokio::test]
    async fn protected_routes_require_a_token() {
        let response = test_app()
            .oneshot(Request::builder().uri("/projects").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let response = test_app()
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
