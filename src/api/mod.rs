//! REST API module.
//!
//! Contains all API routes and handlers consumed by the dashboard.

mod diagnostics;
mod goleiros;
mod partidas;

pub use diagnostics::*;
pub use goleiros::*;
pub use partidas::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Body returned by successful mutations: `{"ok": true}`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ack {
    pub ok: bool,
}

impl Ack {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

impl IntoResponse for Ack {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type for handlers returning a JSON body.
pub type ApiResult<T> = Result<Json<T>, AppError>;

/// Fallback for every route: any method the route does not serve.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

/// Parse an identifier taken from the request path.
///
/// Anything that is not a non-zero integer is rejected.
pub fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id != 0)
        .ok_or_else(|| AppError::Validation("Invalid id".to_string()))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request};
    use tower::ServiceExt;

    use super::*;
    use crate::config::{Config, DatabaseConfig};
    use crate::db::{Database, Repository};
    use crate::{create_router, AppState};

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("7").unwrap(), 7);
        assert_eq!(parse_id(" 42 ").unwrap(), 42);
        assert!(parse_id("0").is_err());
        assert!(parse_id("abc").is_err());
        assert!(parse_id("").is_err());
        assert!(parse_id("7.5").is_err());
    }

    /// Router over a pool that never connects; fine for requests that are
    /// rejected before reaching the database.
    fn lazy_router() -> axum::Router {
        sqlx::any::install_default_drivers();
        let pool = sqlx::any::AnyPoolOptions::new()
            .connect_lazy("sqlite::memory:")
            .unwrap();
        let config = Config {
            database: DatabaseConfig {
                url: Some("sqlite::memory:".to_string()),
                ..Default::default()
            },
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "warn".to_string(),
            log_json: false,
        };

        create_router(AppState {
            repo: Arc::new(Repository::new(Database::new(pool))),
            config: Arc::new(config),
        })
    }

    async fn send(method: Method, uri: &str, body: &'static str) -> (StatusCode, serde_json::Value) {
        let response = lazy_router()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_unsupported_methods_return_json_405() {
        let cases = [
            (Method::POST, "/api/goleiros"),
            (Method::DELETE, "/api/goleiros"),
            (Method::GET, "/api/goleiros/7/toggle"),
            (Method::PUT, "/api/partidas"),
            (Method::GET, "/api/partidas/101/assign"),
            (Method::POST, "/api/test-db"),
        ];

        for (method, uri) in cases {
            let (status, body) = send(method.clone(), uri, "").await;
            assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{} {}", method, uri);
            assert_eq!(body["ok"], false);
            assert_eq!(body["error"]["code"], "METHOD_NOT_ALLOWED");
        }
    }

    #[tokio::test]
    async fn test_invalid_path_id_is_rejected_before_database() {
        let (status, body) = send(Method::POST, "/api/goleiros/abc/toggle", "").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Invalid id");

        let (status, _) = send(Method::POST, "/api/partidas/0/assign", r#"{"goleiroId":2}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_invalid_assign_body_is_rejected_before_database() {
        let (status, body) = send(Method::POST, "/api/partidas/101/assign", "{").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Invalid goleiroId");
    }
}
