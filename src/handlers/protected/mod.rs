// handlers/protected - endpoints behind the role gate
//
// Admin-only: add, edit, delete. Admin and user: list, find.

use axum::{extract::rejection::JsonRejection, Json};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::services::ServiceError;

pub mod actor;
pub mod movie;

pub use actor::{actor_add, actor_delete, actor_edit, actor_list};
pub use movie::{movie_add, movie_delete, movie_edit, movie_find, movie_list};

/// Body of a successful delete
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub id: i32,
    pub deleted: bool,
}

impl Deleted {
    pub fn new(id: i32) -> Json<Self> {
        Json(Self { id, deleted: true })
    }
}

/// Parse an `:id` path segment
pub(crate) fn parse_id(raw: &str, operation: &'static str) -> Result<i32, ApiError> {
    raw.parse::<i32>().map_err(|_| {
        tracing::warn!(operation, id = raw, "Invalid ID");
        ApiError::validation_error(format!("invalid id: {:?}", raw), None)
    })
}

/// Unwrap a JSON body, turning axum's rejection into a 400
pub(crate) fn json_body<T>(
    payload: Result<Json<T>, JsonRejection>,
    operation: &'static str,
) -> Result<T, ApiError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(JsonRejection::JsonDataError(e)) => {
            tracing::warn!(operation, error = %e.body_text(), "Request body does not match the expected shape");
            Err(ApiError::validation_error(e.body_text(), None))
        }
        Err(rejection) => {
            tracing::warn!(operation, error = %rejection.body_text(), "Request body is not valid JSON");
            Err(ApiError::invalid_json(rejection.body_text()))
        }
    }
}

/// Partial-update bodies must be JSON objects
pub(crate) fn update_map(
    payload: Result<Json<Value>, JsonRejection>,
    operation: &'static str,
) -> Result<Map<String, Value>, ApiError> {
    match json_body(payload, operation)? {
        Value::Object(map) => Ok(map),
        other => {
            tracing::warn!(operation, kind = json_kind(&other), "Update body is not a JSON object");
            Err(ApiError::validation_error("request body must be a JSON object", None))
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Log a service failure with its operation and entity ID, then convert it
pub(crate) fn failed(operation: &'static str, id: Option<i32>) -> impl FnOnce(ServiceError) -> ApiError {
    move |err| {
        match &err {
            ServiceError::Validation { field, message } => {
                tracing::warn!(operation, id, field, reason = %message, "Validation failed")
            }
            ServiceError::NotFound { entity, .. } => tracing::warn!(operation, id, entity, "Not found"),
            ServiceError::Database(e) => tracing::error!(operation, id, error = %e, "Database operation failed"),
        }
        err.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[test]
    fn ids_must_be_integers() {
        assert_eq!(parse_id("42", "actor_edit").unwrap(), 42);
        assert_eq!(parse_id("-1", "actor_edit").unwrap(), -1);
        for raw in ["abc", "", "1.5", "99999999999"] {
            let err = parse_id(raw, "actor_edit").unwrap_err();
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST, "{raw}");
        }
    }

    #[test]
    fn update_body_must_be_an_object() {
        let map = update_map(Ok(Json(json!({"name": "X"}))), "actor_edit").unwrap();
        assert_eq!(map["name"], "X");

        let err = update_map(Ok(Json(json!([1, 2]))), "actor_edit").unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn failures_keep_their_status() {
        let err = failed("movie_delete", Some(3))(ServiceError::NotFound { entity: "Movie", id: 3 });
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err = failed("movie_add", None)(ServiceError::validation("title", "title must not be empty"));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn deleted_body_shape() {
        let Json(body) = Deleted::new(8);
        assert_eq!(serde_json::to_value(body).unwrap(), json!({"id": 8, "deleted": true}));
    }
}
