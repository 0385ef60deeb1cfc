//! Keep-alive HTTP endpoint for hosting platforms that probe the process.

use anyhow::{Context, Result};
use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use tracing::info;

pub const LIVENESS_BODY: &str = "Class roster bot is running";

/// `GET /` and `GET /health`
pub fn router() -> Router {
    Router::new()
        .route("/", get(liveness))
        .route("/health", get(health))
}

async fn liveness() -> &'static str {
    LIVENESS_BODY
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Serve the router on `0.0.0.0:port` until the process exits
pub async fn serve(port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind health server to {addr}"))?;
    info!(%addr, "Health server listening");
    axum::serve(listener, router())
        .await
        .context("Health server failed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum_test::TestServer;

    #[tokio::test]
    async fn test_health_endpoint() {
        let server = TestServer::new(router()).unwrap();

        let response = server.get("/health").await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_liveness_endpoint() {
        let server = TestServer::new(router()).unwrap();

        let response = server.get("/").await;
        response.assert_status_ok();
        assert_eq!(response.text(), LIVENESS_BODY);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let server = TestServer::new(router()).unwrap();

        let response = server.get("/metrics").expect_failure().await;
        response.assert_status(StatusCode::NOT_FOUND);
    }
}
