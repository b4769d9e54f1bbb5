use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::{Claims, JwtKeys, Role};
use crate::error::ApiError;

/// Caller identity taken from a verified token, available to handlers as an extension
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: i32,
    pub role: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            role: claims.role,
        }
    }
}

/// Middleware state: the verification keys and the roles a route group admits
#[derive(Clone, Debug)]
pub struct RoleGate {
    keys: JwtKeys,
    allowed: &'static [Role],
}

impl RoleGate {
    pub fn new(keys: JwtKeys, allowed: &'static [Role]) -> Self {
        Self { keys, allowed }
    }
}

/// Admit the request only if it carries a valid bearer token whose role is in `allowed`.
///
/// Missing, malformed, badly signed or expired tokens are 401; a valid token
/// with a role outside the allow-list is 403.
pub fn authorize(keys: &JwtKeys, headers: &HeaderMap, allowed: &[Role]) -> Result<Claims, ApiError> {
    let token = bearer_token(headers).map_err(|reason| {
        tracing::warn!(reason, "Rejected request without usable Authorization header");
        ApiError::unauthorized(reason)
    })?;

    let claims = keys.verify(token).map_err(|e| {
        tracing::warn!(error = %e, "Invalid or expired token");
        ApiError::unauthorized("Invalid or expired token")
    })?;

    if !allowed.iter().any(|role| role.as_str() == claims.role) {
        tracing::warn!(user_id = claims.user_id, role = %claims.role, "Access denied for role");
        return Err(ApiError::forbidden("Forbidden"));
    }

    tracing::debug!(user_id = claims.user_id, role = %claims.role, "Access granted");
    Ok(claims)
}

/// Token must be the second of exactly two space-separated parts, the first being `Bearer`.
fn bearer_token(headers: &HeaderMap) -> Result<&str, &'static str> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or("Missing Authorization header")?
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    match value.split(' ').collect::<Vec<_>>().as_slice() {
        ["Bearer", token] if !token.is_empty() => Ok(*token),
        _ => Err("Authorization header must use Bearer token format"),
    }
}

pub async fn role_gate_middleware(
    State(gate): State<RoleGate>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = authorize(&gate.keys, request.headers(), gate.allowed)?;
    request.extensions_mut().insert(AuthUser::from(claims));
    Ok(next.run(request).await)
}
