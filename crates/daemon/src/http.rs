use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use monitor_core::registry::ArtifactRegistry;
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::store::StatusStore;

/// Read-only publisher state. The store is only ever read here; the
/// scheduler is the single writer.
#[derive(Clone)]
pub struct AppState {
    pub store: StatusStore,
    pub registry: Arc<ArtifactRegistry>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/v1/status", get(current_status))
        .route("/v1/producers", get(producers))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

/// Latest persisted snapshot, or 404 before the first evaluation lands.
async fn current_status(State(st): State<AppState>) -> Result<Response, AppError> {
    let snap = st.store.load()?;
    Ok(match snap {
        Some(s) => Json(s).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "no status recorded yet" })),
        )
            .into_response(),
    })
}

#[derive(Debug, Serialize)]
struct ProducerSummary {
    name: String,
    artifacts: usize,
}

/// Registered producers in dispatch order.
async fn producers(State(st): State<AppState>) -> Json<Vec<ProducerSummary>> {
    let list = st
        .registry
        .list()
        .iter()
        .map(|p| ProducerSummary {
            name: p.name.clone(),
            artifacts: p.artifacts.len(),
        })
        .collect();
    Json(list)
}

#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl<E: Into<anyhow::Error>> From<E> for AppError {
    fn from(value: E) -> Self {
        Self(value.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "request failed");
        let body = Json(serde_json::json!({
            "error": self.0.to_string()
        }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use monitor_core::snapshot::{Phase, ProducerProgress, Snapshot};

    fn state_in(dir: &tempfile::TempDir) -> AppState {
        let mut registry = ArtifactRegistry::new();
        registry.register("X", vec!["a".into(), "b".into()]).unwrap();
        AppState {
            store: StatusStore::new(dir.path().join("status.json")),
            registry: Arc::new(registry),
        }
    }

    async fn serve(state: AppState) -> std::net::SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });
        addr
    }

    #[tokio::test]
    async fn status_is_404_before_first_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let addr = serve(state_in(&dir)).await;

        let resp = reqwest::get(format!("http://{addr}/v1/status")).await.unwrap();
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn status_serves_latest_persisted_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_in(&dir);
        state
            .store
            .save(&Snapshot {
                timestamp_ms: 123,
                per_producer: vec![ProducerProgress::new("X", 1, 2)],
                overall_percentage: 50,
                cycles_elapsed: 4,
                phase: Phase::Running,
            })
            .unwrap();
        let addr = serve(state).await;

        let resp = reqwest::get(format!("http://{addr}/v1/status")).await.unwrap();
        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["overall_percentage"], 50);
        assert_eq!(body["cycles_elapsed"], 4);
        assert_eq!(body["phase"], "running");
        assert_eq!(body["per_producer"][0]["producer"], "X");
    }

    #[tokio::test]
    async fn unknown_paths_are_404_and_producers_lists_registry() {
        let dir = tempfile::tempdir().unwrap();
        let addr = serve(state_in(&dir)).await;

        let resp = reqwest::get(format!("http://{addr}/v1/nope")).await.unwrap();
        assert_eq!(resp.status(), 404);

        let resp = reqwest::get(format!("http://{addr}/v1/producers")).await.unwrap();
        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body[0]["name"], "X");
        assert_eq!(body[0]["artifacts"], 2);
    }
}
