use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::config::AppConfig;
use crate::database::TransactionStore;
use crate::handlers::transactions;

/// Shared request state. The store is chosen once at startup and injected here.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TransactionStore>,
    pub route_prefix: Arc<str>,
}

impl AppState {
    pub fn new(store: Arc<dyn TransactionStore>, route_prefix: &str) -> Self {
        Self {
            store,
            route_prefix: Arc::from(route_prefix),
        }
    }
}

pub fn app(store: Arc<dyn TransactionStore>, config: &AppConfig) -> Router {
    let prefix = config.server.route_prefix.as_str();
    let state = AppState::new(store, prefix);

    let router = Router::new().route("/health", get(health));

    // Mounted at the root, the resource list answers `GET /` in place of the descriptor
    let router = if prefix == "/" {
        router.merge(transaction_routes())
    } else {
        router.route("/", get(root)).nest(prefix, transaction_routes())
    };

    let router = router
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .with_state(state);

    let router = match cors_layer(config) {
        Some(cors) => router.layer(cors),
        None => router,
    };

    if config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

fn transaction_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(transactions::transaction_list).post(transactions::transaction_create),
        )
        .route(
            "/:id",
            get(transactions::transaction_get)
                .put(transactions::transaction_update)
                .delete(transactions::transaction_delete),
        )
}

fn cors_layer(config: &AppConfig) -> Option<CorsLayer> {
    if !config.security.enable_cors {
        return None;
    }
    if config.security.cors_origins.is_empty() {
        return Some(CorsLayer::permissive());
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any),
    )
}

async fn root(State(state): State<AppState>) -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Finance Tracker API",
        "version": version,
        "store": state.store.backend(),
        "endpoints": {
            "health": "/health",
            "transactions": format!("{}[/:id]", state.route_prefix),
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "store": state.store.backend()
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "degraded",
                "timestamp": now,
                "store": state.store.backend(),
                "error": e.to_string()
            })),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request};
    use tower::ServiceExt;

    fn test_app(prefix: &str) -> Router {
        let mut config = AppConfig::development();
        config.server.route_prefix = prefix.to_string();
        config.api.enable_request_logging = false;
        app(Arc::new(MemoryStore::new()), &config)
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn create_then_fetch() {
        let app = test_app("/transactions");
        let (status, created) = send(
            &app,
            Method::POST,
            "/transactions",
            Some(json!({ "title": "Salary", "amount": 3500, "type": "income" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["notes"], "");

        let id = created["id"].as_str().unwrap();
        let (status, fetched) = send(&app, Method::GET, &format!("/transactions/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn missing_fields_are_rejected_and_not_persisted() {
        let app = test_app("/transactions");
        let (status, body) = send(&app, Method::POST, "/transactions", Some(json!({ "title": "x" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Required fields: title, amount, type" }));

        let (_, list) = send(&app, Method::GET, "/transactions", None).await;
        assert_eq!(list, json!([]));
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        let app = test_app("/transactions");
        let request = Request::builder()
            .method(Method::POST)
            .uri("/transactions")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_ids_are_404_for_every_verb() {
        let app = test_app("/transactions");
        let (status, _) = send(&app, Method::GET, "/transactions/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, Method::PUT, "/transactions/nope", Some(json!({ "notes": "x" }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, body) = send(&app, Method::DELETE, "/transactions/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Transaction not found" }));
    }

    #[tokio::test]
    async fn mounts_under_alternate_prefix() {
        let app = test_app("/api/transactions");
        let (status, _) = send(&app, Method::GET, "/api/transactions", None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, Method::GET, "/transactions", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn mounts_at_root_without_descriptor() {
        let app = test_app(&crate::config::normalize_prefix("/"));
        let (status, created) = send(
            &app,
            Method::POST,
            "/",
            Some(json!({ "title": "Rent", "amount": 900, "type": "expense" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, list) = send(&app, Method::GET, "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list, json!([created.clone()]));

        let id = created["id"].as_str().unwrap();
        let (status, _) = send(&app, Method::GET, &format!("/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn list_filters_by_owner() {
        let app = test_app("/transactions");
        for (title, owner) in [("a", "u1"), ("b", "u2"), ("c", "u1")] {
            send(
                &app,
                Method::POST,
                "/transactions",
                Some(json!({ "title": title, "amount": 1, "type": "expense", "user_id": owner })),
            )
            .await;
        }
        let (_, body) = send(&app, Method::GET, "/transactions?user_id=u1", None).await;
        assert_eq!(body.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn health_reports_backend() {
        let app = test_app("/transactions");
        let (status, body) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["store"], "memory");
    }
}
