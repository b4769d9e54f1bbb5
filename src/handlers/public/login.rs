// POST /v1/auth (and /v1/login) - exchange fixed credentials for a bearer token

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::authenticate;
use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

pub async fn login_post(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::warn!(error = %rejection.body_text(), "Login request body could not be decoded");
        ApiError::bad_request("Invalid request body")
    })?;

    let credential = authenticate(&request.username, &request.password).ok_or_else(|| {
        tracing::warn!(username = %request.username, "Login failed: invalid credentials");
        ApiError::unauthorized("Invalid credentials")
    })?;

    let token = state.keys.issue(credential.user_id, credential.role)?;

    tracing::info!(username = credential.username, role = %credential.role, "Login succeeded");
    Ok(Json(LoginResponse { token }))
}
