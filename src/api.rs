use anyhow::{Context, Result};
use axum::{extract::State, http::StatusCode, response::Html, routing::get, Json, Router};
use serde::Serialize;
use std::net::SocketAddr;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::dashboard;
use crate::store::StatusStore;

#[derive(Debug, Serialize)]
pub struct TargetStatus {
    pub url: String,
    pub status: String,
    pub timestamp: String,
}

pub async fn status_page(State(store): State<StatusStore>) -> Result<Html<String>, StatusCode> {
    let statuses = store.snapshot().await;
    dashboard::render(&statuses).map(Html).map_err(|e| {
        error!("Failed to render dashboard: {:#}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

pub async fn get_status(State(store): State<StatusStore>) -> Json<Vec<TargetStatus>> {
    let statuses = store
        .snapshot()
        .await
        .into_iter()
        .map(|(url, record)| TargetStatus {
            url,
            status: record.status,
            timestamp: record.timestamp,
        })
        .collect();
    Json(statuses)
}

pub fn create_router(store: StatusStore) -> Router {
    Router::new()
        .route("/", get(status_page))
        .route("/api/status", get(get_status))
        .layer(TraceLayer::new_for_http())
        .with_state(store)
}

/// Serves the dashboard on all interfaces until `token` is cancelled.
pub async fn start_server(port: u16, store: StatusStore, token: CancellationToken) -> Result<()> {
    let app = create_router(store);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind dashboard port {}", port))?;
    info!("Dashboard: http://localhost:{}", addr.port());

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { token.cancelled().await })
        .await
        .context("Dashboard server error")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StatusRecord;
    use axum::body::Body;
    use axum::http::{header, Request};
    use tower::ServiceExt;

    async fn seeded_store() -> StatusStore {
        let store = StatusStore::new(["http://a", "http://b"]);
        store
            .set(
                "http://a",
                StatusRecord {
                    status: "Status: 200".into(),
                    timestamp: "T".into(),
                },
            )
            .await;
        store
    }

    #[tokio::test]
    async fn root_serves_html_dashboard() {
        let app = create_router(seeded_store().await);

        let res = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        let content_type = res.headers().get(header::CONTENT_TYPE).unwrap();
        assert!(content_type.to_str().unwrap().starts_with("text/html"));
        let body = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        let body_str = std::str::from_utf8(&body).unwrap();
        assert!(body_str.replace("&#x2f;", "/").contains("http://a"));
        assert!(body_str.contains("status-ok"));
        assert!(body_str.contains("status-pending"));
    }

    #[tokio::test]
    async fn api_status_returns_snapshot_json() {
        let app = create_router(seeded_store().await);

        let res = app
            .oneshot(
                Request::builder()
                    .uri("/api/status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        let body = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                { "url": "http://a", "status": "Status: 200", "timestamp": "T" },
                { "url": "http://b", "status": "Pending...", "timestamp": "-" }
            ])
        );
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let app = create_router(seeded_store().await);
        let res = app
            .oneshot(Request::builder().uri("/missing").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn start_server_fails_on_occupied_port() {
        let holder = std::net::TcpListener::bind("0.0.0.0:0").unwrap();
        let port = holder.local_addr().unwrap().port();

        let result = start_server(port, StatusStore::new(["http://a"]), CancellationToken::new()).await;
        let err = result.unwrap_err();
        assert!(format!("{:#}", err).contains(&format!("Failed to bind dashboard port {}", port)));
        drop(holder);
    }
}
