//! Axum router configuration with middleware.
//!
//! All tale routes are under `/api/v1/`; `/health` sits outside it.
//! Middleware: CORS, request tracing.

use axum::Router;
use axum::routing::{get, patch, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/tales", post(handlers::tale::create))
        .route("/tales/public", get(handlers::tale::list_public))
        .route("/tales/user", get(handlers::tale::list_mine))
        .route("/tales/generate", post(handlers::tale::generate))
        .route(
            "/tales/{id}",
            patch(handlers::tale::update).delete(handlers::tale::delete),
        )
        .route("/tales/{id}/like", post(handlers::tale::toggle_like))
        .route("/generation/test", get(handlers::generation::test_backend));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Liveness check (no identity required).
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use taleweaver_types::config::GlobalConfig;

    struct TestServer {
        base: String,
        client: reqwest::Client,
        _dir: tempfile::TempDir,
    }

    impl TestServer {
        async fn start(config: GlobalConfig) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let state = AppState::build(dir.path(), config).await.unwrap();
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                axum::serve(listener, build_router(state)).await.unwrap();
            });
            Self {
                base: format!("http://{addr}"),
                client: reqwest::Client::new(),
                _dir: dir,
            }
        }

        fn request(&self, method: reqwest::Method, path: &str, user: Option<&str>) -> reqwest::RequestBuilder {
            let mut req = self.client.request(method, format!("{}{path}", self.base));
            if let Some(user) = user {
                req = req.header("X-User-Id", user);
            }
            req
        }

        async fn call(
            &self,
            method: reqwest::Method,
            path: &str,
            user: Option<&str>,
            body: Option<Value>,
        ) -> (u16, Value) {
            let mut req = self.request(method, path, user);
            if let Some(body) = body {
                req = req.json(&body);
            }
            let resp = req.send().await.unwrap();
            let status = resp.status().as_u16();
            (status, resp.json().await.unwrap_or(Value::Null))
        }
    }

    fn new_tale() -> Value {
        json!({
            "title": "The Brave Snail",
            "content": "Once upon a time...",
            "childAge": "5-8",
            "topic": "courage"
        })
    }

    #[tokio::test]
    async fn test_health() {
        let server = TestServer::start(GlobalConfig::default()).await;
        let (status, body) = server.call(reqwest::Method::GET, "/health", None, None).await;
        assert_eq!(status, 200);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_tale_lifecycle_over_http() {
        use reqwest::Method;
        let server = TestServer::start(GlobalConfig::default()).await;

        let (status, body) = server
            .call(Method::POST, "/api/v1/tales", Some("u1"), Some(new_tale()))
            .await;
        assert_eq!(status, 201);
        assert_eq!(body["data"]["isPublic"], false);
        assert_eq!(body["data"]["likes"], 0);
        assert_eq!(body["data"]["author"], "u1");
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let (_, body) = server.call(Method::GET, "/api/v1/tales/public", None, None).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 0);

        let (status, _) = server
            .call(Method::PATCH, &format!("/api/v1/tales/{id}"), Some("u2"), Some(json!({"isPublic": true})))
            .await;
        assert_eq!(status, 403);

        let (status, body) = server
            .call(Method::PATCH, &format!("/api/v1/tales/{id}"), Some("u1"), Some(json!({"isPublic": true, "title": "ignored"})))
            .await;
        assert_eq!(status, 200);
        assert_eq!(body["data"]["isPublic"], true);
        assert_eq!(body["data"]["title"], "The Brave Snail");

        let (status, body) = server
            .call(Method::POST, &format!("/api/v1/tales/{id}/like"), Some("u2"), None)
            .await;
        assert_eq!(status, 200);
        assert_eq!(body["data"], json!({"likes": 1, "isLiked": true}));

        let (_, body) = server.call(Method::GET, "/api/v1/tales/public", Some("u2"), None).await;
        assert_eq!(body["data"][0]["likes"], 1);
        assert_eq!(body["data"][0]["isLiked"], true);
        assert_eq!(body["data"][0]["likedBy"], json!(["u2"]));

        let (status, _) = server
            .call(Method::DELETE, &format!("/api/v1/tales/{id}"), Some("u2"), None)
            .await;
        assert_eq!(status, 403);

        let (status, body) = server
            .call(Method::DELETE, &format!("/api/v1/tales/{id}"), Some("u1"), None)
            .await;
        assert_eq!(status, 200);
        assert_eq!(body["data"]["deleted"], true);

        let (status, body) = server
            .call(Method::POST, &format!("/api/v1/tales/{id}/like"), Some("u2"), None)
            .await;
        assert_eq!(status, 404);
        assert_eq!(body["errors"][0]["code"], "TALE_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_identity_required() {
        let server = TestServer::start(GlobalConfig::default()).await;
        let (status, body) = server
            .call(reqwest::Method::POST, "/api/v1/tales", None, Some(new_tale()))
            .await;
        assert_eq!(status, 401);
        assert_eq!(body["errors"][0]["code"], "UNAUTHORIZED");

        let (status, _) = server.call(reqwest::Method::GET, "/api/v1/tales/user", None, None).await;
        assert_eq!(status, 401);
    }

    #[tokio::test]
    async fn test_validation_and_bad_ids() {
        use reqwest::Method;
        let server = TestServer::start(GlobalConfig::default()).await;

        let mut tale = new_tale();
        tale["childAge"] = json!("10-12");
        let (status, body) = server.call(Method::POST, "/api/v1/tales", Some("u1"), Some(tale)).await;
        assert_eq!(status, 400);
        assert_eq!(body["errors"][0]["code"], "VALIDATION_ERROR");

        let (status, _) = server
            .call(Method::DELETE, "/api/v1/tales/not-a-uuid", Some("u1"), None)
            .await;
        assert_eq!(status, 404);
    }

    #[tokio::test]
    async fn test_generate_with_template_fallback() {
        let mut config = GlobalConfig::default();
        config.generation.title_seed = Some(3);
        let server = TestServer::start(config).await;

        let (status, body) = server
            .call(
                reqwest::Method::POST,
                "/api/v1/tales/generate",
                Some("u1"),
                Some(json!({"childAge": "3-4", "topic": "moon cats", "mood": "calming"})),
            )
            .await;
        assert_eq!(status, 200);
        assert_eq!(body["data"]["author"], "u1");
        assert_eq!(body["data"]["childAge"], "3-4");
        assert_eq!(body["data"]["mood"], "calming");
        assert!(body["data"]["title"].as_str().unwrap().ends_with(" Moon"));
        assert!(body["data"]["content"].as_str().unwrap().contains("moon cats"));
    }

    #[tokio::test]
    async fn test_generate_unavailable_without_fallback() {
        let mut config = GlobalConfig::default();
        config.generation.fallback_enabled = false;
        let server = TestServer::start(config).await;

        let (status, body) = server
            .call(
                reqwest::Method::POST,
                "/api/v1/tales/generate",
                Some("u1"),
                Some(json!({"childAge": "9-12", "topic": "volcanoes"})),
            )
            .await;
        assert_eq!(status, 503);
        assert_eq!(body["errors"][0]["code"], "GENERATION_UNAVAILABLE");

        let (status, body) = server
            .call(reqwest::Method::GET, "/api/v1/generation/test", Some("u1"), None)
            .await;
        assert_eq!(status, 200);
        assert_eq!(body["data"]["reachable"], false);
        assert_eq!(body["data"]["fallbackEnabled"], false);
    }
}
