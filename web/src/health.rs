//! Health check endpoints.

use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use fanclub_core::EventQuery;
use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
}

/// Liveness check. Does not touch any dependency.
///
/// ```bash
/// curl http://localhost:8080/health
/// # {"status":"ok","version":"0.1.0"}
/// ```
pub async fn health_check() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// Readiness check response.
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    /// Overall readiness status
    pub ready: bool,
    /// Catalog store reachable
    pub database: bool,
}

/// Readiness check: 200 when the catalog store answers a query, 503 otherwise.
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let probe = EventQuery {
        limit: Some(1),
        ..EventQuery::default()
    };
    let database = match state.ledger.environment().store.list_events(probe).await {
        Ok(_) => true,
        Err(error) => {
            tracing::warn!(%error, "Readiness probe failed");
            false
        },
    };

    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ReadinessResponse {
            ready: database,
            database,
        }),
    )
}
