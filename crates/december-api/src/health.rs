use axum::{Json, extract::State};
use tracing::warn;

use december_types::api::{DatabaseStatus, HealthResponse};

use crate::state::AppState;

/// GET /api/health. Always 200; store reachability is reported, not fatal.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match state.store.ping().await {
        Ok(()) => DatabaseStatus::Connected,
        Err(e) => {
            warn!("Health probe failed: {}", e);
            DatabaseStatus::Disconnected
        }
    };

    Json(HealthResponse {
        status: "healthy".into(),
        timestamp: chrono::Utc::now(),
        database: Some(database),
    })
}
