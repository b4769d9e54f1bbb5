use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::database::DatabaseManager;
use crate::AppState;

/// GET / - service name, version and route summary
pub async fn root() -> Json<Value> {
    Json(json!({
        "name": "Filmoteka API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "auth": "POST /v1/auth (public)",
            "actors": "/v1/actor-add, /v1/actor-edit/:id, /v1/actor-delete/:id (admin); /v1/actor-list (admin, user)",
            "movies": "/v1/movie-add, /v1/movie-edit/:id, /v1/movie-delete/:id (admin); /v1/movie-list, /v1/movie-find (admin, user)",
        }
    }))
}

/// GET /health - 200 when the database answers, 503 otherwise
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "timestamp": now, "database": "ok" })),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded", "timestamp": now, "database": "unavailable" })),
            )
        }
    }
}
